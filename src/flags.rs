//! Readiness flags.
//!
//! Flags are level-triggered: setting a set flag or clearing an unset one
//! is a no-op. The provider only writes them; whoever orchestrates the
//! application reads them.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::relation::validate_component;

/// `{endpoint}.connected`: at least one peer has joined.
pub fn connected_flag(endpoint: &str) -> String {
    format!("{endpoint}.connected")
}

/// `{endpoint}.available`: a peer has sent data.
pub fn available_flag(endpoint: &str) -> String {
    format!("{endpoint}.available")
}

pub trait FlagStore {
    fn set_flag(&mut self, name: &str) -> io::Result<()>;

    fn clear_flag(&mut self, name: &str) -> io::Result<()>;

    fn is_set(&self, name: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFlags {
    set: BTreeSet<String>,
}

impl MemoryFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.set.iter().map(String::as_str)
    }
}

impl FlagStore for MemoryFlags {
    fn set_flag(&mut self, name: &str) -> io::Result<()> {
        self.set.insert(name.to_string());
        Ok(())
    }

    fn clear_flag(&mut self, name: &str) -> io::Result<()> {
        self.set.remove(name);
        Ok(())
    }

    fn is_set(&self, name: &str) -> bool {
        self.set.contains(name)
    }
}

/// Flags kept as marker files, one per set flag, so that processes polling
/// the directory see them.
#[derive(Debug, Clone)]
pub struct MarkerFlags {
    dir: PathBuf,
}

impl MarkerFlags {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn marker_path(&self, name: &str) -> io::Result<PathBuf> {
        validate_component("flag", name)?;
        Ok(self.dir.join(name))
    }
}

impl FlagStore for MarkerFlags {
    /// Atomic: write-then-rename, so pollers never see a partial marker.
    fn set_flag(&mut self, name: &str) -> io::Result<()> {
        let marker = self.marker_path(name)?;
        let tmp_path = self.dir.join(format!("{name}.tmp"));
        std::fs::write(&tmp_path, b"")?;
        std::fs::rename(tmp_path, marker)?;
        Ok(())
    }

    fn clear_flag(&mut self, name: &str) -> io::Result<()> {
        let marker = self.marker_path(name)?;
        match std::fs::remove_file(marker) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn is_set(&self, name: &str) -> bool {
        self.marker_path(name)
            .and_then(std::fs::metadata)
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}
