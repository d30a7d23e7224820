use std::collections::BTreeMap;

use serde_json::Value;

use super::{RelationData, RelationId};
use crate::error::TransportError;

/// In-process outbound store.
#[derive(Debug, Clone)]
pub struct MemoryRelation {
    id: RelationId,
    data: BTreeMap<String, Value>,
}

impl MemoryRelation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: RelationId::new(id),
            data: BTreeMap::new(),
        }
    }

    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }
}

impl RelationData for MemoryRelation {
    fn id(&self) -> &RelationId {
        &self.id
    }

    fn get(&self, key: &str) -> Result<Option<Value>, TransportError> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), TransportError> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), TransportError> {
        self.data.remove(key);
        Ok(())
    }
}
