//! Wire record shared with the agent side of the relation.
//!
//! ```text
//! "config": {
//!   "dashboards": [],
//!   "log_alert_rules": {},
//!   "log_slots": [],
//!   "metrics_alert_rules": {},
//!   "metrics_scrape_jobs": [ ScrapeJob, ... ]
//! }
//! ```
//!
//! Only `metrics_scrape_jobs` carries data. The other fields are reserved
//! and always published empty so that the shape stays stable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::scrape::ScrapeJob;

/// Key of the record in each relation's outbound store.
pub const UNIT_DATA_KEY: &str = "config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitData {
    /// Reserved.
    pub dashboards: Vec<String>,
    /// Reserved.
    pub log_alert_rules: Map<String, Value>,
    /// Reserved.
    pub log_slots: Vec<String>,
    /// Reserved. Always an empty mapping, never an empty string.
    pub metrics_alert_rules: Map<String, Value>,
    pub metrics_scrape_jobs: Vec<ScrapeJob>,
}

impl UnitData {
    pub const KEY: &'static str = UNIT_DATA_KEY;

    pub fn new(metrics_scrape_jobs: Vec<ScrapeJob>) -> Self {
        Self {
            dashboards: Vec::new(),
            log_alert_rules: Map::new(),
            log_slots: Vec::new(),
            metrics_alert_rules: Map::new(),
            metrics_scrape_jobs,
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reserved_fields_are_present_and_empty() {
        let data = UnitData::new(vec![ScrapeJob::default_job()]);
        let value = data.to_value().unwrap();

        assert_eq!(
            value,
            json!({
                "dashboards": [],
                "log_alert_rules": {},
                "log_slots": [],
                "metrics_alert_rules": {},
                "metrics_scrape_jobs": [
                    {"metrics_path": "/metrics", "static_configs": [{"targets": ["localhost:80"]}]}
                ]
            })
        );
    }

    #[test]
    fn test_field_order_on_the_wire() {
        let data = UnitData::new(Vec::new());
        let text = serde_json::to_string(&data).unwrap();
        let positions: Vec<_> = [
            "dashboards",
            "log_alert_rules",
            "log_slots",
            "metrics_alert_rules",
            "metrics_scrape_jobs",
        ]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_parse_published_record() {
        let value = json!({
            "dashboards": [],
            "log_alert_rules": {},
            "log_slots": [],
            "metrics_alert_rules": {},
            "metrics_scrape_jobs": [{
                "metrics_path": "/metrics",
                "static_configs": [{"targets": ["localhost:9000"]}],
                "job_name": "myapp_0_default"
            }]
        });
        let data = UnitData::from_value(value).unwrap();
        assert_eq!(data.metrics_scrape_jobs.len(), 1);
        assert_eq!(
            data.metrics_scrape_jobs[0].job_name.as_deref(),
            Some("myapp_0_default")
        );
    }
}
