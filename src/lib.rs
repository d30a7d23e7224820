//! Provider side of the `cos-agent` relation.
//!
//! The provider tracks readiness flags for its relations and publishes one
//! record per relation describing where the agent should scrape this
//! unit's metrics.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod flags;
pub mod protocol;
pub mod relation;
pub mod scrape;

pub use config::ProviderConfig;
pub use endpoint::{Endpoint, PublishReport, RelationEvent};
pub use error::{Error, Result, TransportError};
pub use flags::{FlagStore, MarkerFlags, MemoryFlags};
pub use protocol::{UnitData, UNIT_DATA_KEY};
pub use relation::{DatabagRelation, MemoryRelation, RelationData, RelationId};
pub use scrape::{MetricsEndpointSpec, ScrapeJob, ScrapeJobBuilder, StaticConfig};
