//! Directory-backed relation stores.
//!
//! ```text
//! {root}/
//! └── relations/
//!     └── {endpoint}/
//!         └── {relation_id}/
//!             └── {key}.json
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{RelationData, RelationId};
use crate::error::TransportError;

const RELATIONS_DIR: &str = "relations";

/// Validates that a path component is safe (no path traversal).
///
/// Rejects empty values, `.`/`..`, path separators and NUL bytes.
pub fn validate_component(field: &'static str, value: &str) -> io::Result<()> {
    if value.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("empty path component: {field}"),
        ));
    }
    if value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
        || value.contains('\0')
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid path component for {field}: {value}"),
        ));
    }
    Ok(())
}

/// Path: `{root}/relations/{endpoint}`
pub fn relations_root(root: &Path, endpoint: &str) -> io::Result<PathBuf> {
    validate_component("endpoint", endpoint)?;
    Ok(root.join(RELATIONS_DIR).join(endpoint))
}

/// Path: `{root}/relations/{endpoint}/{relation_id}`
pub fn relation_dir(root: &Path, endpoint: &str, relation_id: &str) -> io::Result<PathBuf> {
    validate_component("relation_id", relation_id)?;
    Ok(relations_root(root, endpoint)?.join(relation_id))
}

/// Outbound store kept as one JSON file per key.
#[derive(Debug, Clone)]
pub struct DatabagRelation {
    id: RelationId,
    dir: PathBuf,
}

impl DatabagRelation {
    /// Open (creating if needed) the databag of `relation_id`.
    pub fn open(root: &Path, endpoint: &str, relation_id: &str) -> io::Result<Self> {
        let dir = relation_dir(root, endpoint, relation_id)?;
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            id: RelationId::new(relation_id),
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> io::Result<PathBuf> {
        validate_component("key", key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl RelationData for DatabagRelation {
    fn id(&self) -> &RelationId {
        &self.id
    }

    fn get(&self, key: &str) -> Result<Option<Value>, TransportError> {
        let path = self.key_path(key)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), TransportError> {
        let path = self.key_path(key)?;
        if !self.dir.is_dir() {
            return Err(TransportError::Unavailable(format!(
                "databag {} is gone",
                self.dir.display()
            )));
        }
        let data = serde_json::to_vec_pretty(&value)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        if let Err(err) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), TransportError> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// List every relation databag under `endpoint`, sorted by relation id.
pub fn discover_databags(root: &Path, endpoint: &str) -> io::Result<Vec<DatabagRelation>> {
    let base = relations_root(root, endpoint)?;

    // If the directory doesn't exist yet, there are no relations
    if !base.exists() {
        return Ok(Vec::new());
    }

    let mut relations = Vec::new();
    for entry in std::fs::read_dir(&base)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let relation_id = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        relations.push(DatabagRelation {
            id: RelationId(relation_id),
            dir: path,
        });
    }

    relations.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(relations)
}
