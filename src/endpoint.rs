//! Provider endpoint: relation lifecycle and scrape job publication.
//!
//! The host's event loop calls [`Endpoint::handle`] (or the per-event
//! methods) as lifecycle events arrive, and calls
//! [`Endpoint::update_relation_data`] / [`Endpoint::clear_relation_data`]
//! whenever the application's metrics endpoints change.
//!
//! | Event | Effect |
//! |---|---|
//! | joined | set `{endpoint}.connected` |
//! | changed | set `{endpoint}.available` |
//! | broken, departed | clear published data, clear both flags |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::{Error, Result, TransportError};
use crate::flags::{available_flag, connected_flag, FlagStore};
use crate::protocol::UnitData;
use crate::relation::{RelationData, RelationId};
use crate::scrape::{MetricsEndpointSpec, ScrapeJobBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationEvent {
    Joined,
    Changed,
    Broken,
    Departed,
}

impl RelationEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationEvent::Joined => "joined",
            RelationEvent::Changed => "changed",
            RelationEvent::Broken => "broken",
            RelationEvent::Departed => "departed",
        }
    }
}

impl fmt::Display for RelationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationEvent {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "joined" => Ok(RelationEvent::Joined),
            "changed" => Ok(RelationEvent::Changed),
            "broken" => Ok(RelationEvent::Broken),
            "departed" => Ok(RelationEvent::Departed),
            other => Err(format!("unknown relation event: {other}")),
        }
    }
}

/// Per-relation outcome of a publish or clear.
///
/// Relations are written independently: a failure on one does not stop the
/// others, so after a partial failure some relations carry the new record
/// and the ones listed in `failed` keep whatever they had before.
///
/// On broken/departed, readiness flags that could not be cleared land in
/// `flag_errors`.
#[derive(Debug, Default)]
pub struct PublishReport {
    pub updated: Vec<RelationId>,
    pub failed: Vec<(RelationId, TransportError)>,
    pub flag_errors: Vec<(String, std::io::Error)>,
}

impl PublishReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.flag_errors.is_empty()
    }

    /// The updated relations, or the first failure: relation failures as
    /// `Error::Transport`, then flag failures as `Error::Flag`.
    pub fn into_result(self) -> Result<Vec<RelationId>> {
        if let Some((relation, source)) = self.failed.into_iter().next() {
            return Err(Error::Transport { relation, source });
        }
        match self.flag_errors.into_iter().next() {
            Some((flag, source)) => Err(Error::Flag { flag, source }),
            None => Ok(self.updated),
        }
    }

    fn record(&mut self, relation: &RelationId, outcome: std::result::Result<(), TransportError>) {
        match outcome {
            Ok(()) => self.updated.push(relation.clone()),
            Err(err) => {
                warn!("relation {relation}: {err}");
                self.failed.push((relation.clone(), err));
            }
        }
    }
}

pub struct Endpoint<R, F> {
    name: String,
    builder: ScrapeJobBuilder,
    relations: BTreeMap<RelationId, R>,
    flags: F,
}

impl<R: RelationData, F: FlagStore> Endpoint<R, F> {
    pub fn new(config: &ProviderConfig, flags: F) -> Self {
        Self {
            name: config.endpoint_name.clone(),
            builder: ScrapeJobBuilder::new(config.charm_name.clone()),
            relations: BTreeMap::new(),
            flags,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn builder(&self) -> &ScrapeJobBuilder {
        &self.builder
    }

    pub fn flags(&self) -> &F {
        &self.flags
    }

    /// Start tracking `relation`, returning the handle it replaces.
    pub fn attach(&mut self, relation: R) -> Option<R> {
        self.relations.insert(relation.id().clone(), relation)
    }

    pub fn detach(&mut self, id: &RelationId) -> Option<R> {
        self.relations.remove(id)
    }

    pub fn relation(&self, id: &RelationId) -> Option<&R> {
        self.relations.get(id)
    }

    /// Tracked relations in id order.
    pub fn relations(&self) -> impl Iterator<Item = &R> {
        self.relations.values()
    }

    pub fn handle(&mut self, event: RelationEvent) -> Result<PublishReport> {
        match event {
            RelationEvent::Joined => self.joined().map(|()| PublishReport::default()),
            RelationEvent::Changed => self.changed().map(|()| PublishReport::default()),
            RelationEvent::Broken | RelationEvent::Departed => self.broken_or_departed(),
        }
    }

    pub fn joined(&mut self) -> Result<()> {
        info!("{}: joined", self.name);
        self.set_flag(connected_flag(&self.name))
    }

    pub fn changed(&mut self) -> Result<()> {
        info!("{}: changed", self.name);
        self.set_flag(available_flag(&self.name))
    }

    /// Clear published data and both flags, whatever was set before.
    ///
    /// Every step is attempted; failures are collected in the report.
    pub fn broken_or_departed(&mut self) -> Result<PublishReport> {
        info!("{}: broken or departed", self.name);
        let mut report = self.clear_relation_data();
        for flag in [connected_flag(&self.name), available_flag(&self.name)] {
            if let Err(err) = self.flags.clear_flag(&flag) {
                warn!("flag {flag}: {err}");
                report.flag_errors.push((flag, err));
            }
        }
        Ok(report)
    }

    /// Publish a fresh record built from `metrics_endpoints` to every
    /// tracked relation, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// `Error::MissingField` if an endpoint lacks `path` or `port`; nothing
    /// is written then. Transport failures are reported per relation in the
    /// returned [`PublishReport`].
    pub fn update_relation_data(
        &mut self,
        metrics_endpoints: Option<&[MetricsEndpointSpec]>,
    ) -> Result<PublishReport> {
        let jobs = self.builder.build(metrics_endpoints)?;
        let data = UnitData::new(jobs);
        let value = data.to_value()?;

        let mut report = PublishReport::default();
        for (id, relation) in self.relations.iter_mut() {
            debug!(
                "{id}: publishing {} scrape jobs",
                data.metrics_scrape_jobs.len()
            );
            report.record(id, relation.set(UnitData::KEY, value.clone()));
        }
        info!(
            "{}: published to {}/{} relations",
            self.name,
            report.updated.len(),
            self.relations.len()
        );
        Ok(report)
    }

    /// Remove the record from every tracked relation.
    pub fn clear_relation_data(&mut self) -> PublishReport {
        let mut report = PublishReport::default();
        for (id, relation) in self.relations.iter_mut() {
            debug!("{id}: clearing {}", UnitData::KEY);
            report.record(id, relation.remove(UnitData::KEY));
        }
        info!(
            "{}: cleared {}/{} relations",
            self.name,
            report.updated.len(),
            self.relations.len()
        );
        report
    }

    fn set_flag(&mut self, flag: String) -> Result<()> {
        self.flags
            .set_flag(&flag)
            .map_err(|source| Error::Flag { flag, source })
    }
}
