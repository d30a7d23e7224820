//! Relation transport seam.
//!
//! A relation is one peer connection under an endpoint. The provider only
//! touches its outbound store, one JSON value per key.

use std::fmt;

use serde_json::Value;

use crate::error::TransportError;

pub mod databag;
pub mod memory;

pub use databag::{
    discover_databags, relation_dir, relations_root, validate_component, DatabagRelation,
};
pub use memory::MemoryRelation;

/// Host-assigned relation identifier, e.g. `cos-agent:01`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationId(pub String);

impl RelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outbound key-value store of a single relation.
pub trait RelationData {
    fn id(&self) -> &RelationId;

    fn get(&self, key: &str) -> Result<Option<Value>, TransportError>;

    /// Overwrite `key` with `value`.
    fn set(&mut self, key: &str, value: Value) -> Result<(), TransportError>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), TransportError>;
}

impl<R: RelationData + ?Sized> RelationData for Box<R> {
    fn id(&self) -> &RelationId {
        (**self).id()
    }

    fn get(&self, key: &str) -> Result<Option<Value>, TransportError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), TransportError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), TransportError> {
        (**self).remove(key)
    }
}
