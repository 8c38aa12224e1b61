//! Where raw input comes from. The engine itself only sees decoded values.
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};

pub trait Source {
    /// Used as the root type name.
    fn name(&self) -> &str;
    fn read_bytes(&mut self) -> Result<Vec<u8>>;

    fn decode(&mut self) -> Result<Value> {
        let bytes = self.read_bytes()?;
        serde_json::from_slice(&bytes).map_err(|source| Error::Decode {
            name: self.name().to_string(),
            source,
        })
    }
}

/// Reads a file once and keeps the bytes.
#[derive(Debug, Clone)]
pub struct FileSource {
    name: String,
    path: PathBuf,
    cached: Option<Vec<u8>>,
}

impl FileSource {
    /// Named after the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path, cached: None }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        if let Some(bytes) = &self.cached {
            return Ok(bytes.clone());
        }
        let bytes = std::fs::read(&self.path).map_err(|source| Error::Io {
            name: self.path.display().to_string(),
            source,
        })?;
        self.cached = Some(bytes.clone());
        Ok(bytes)
    }
}

#[derive(Debug, Clone)]
pub struct BytesSource {
    name: String,
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }
}

impl Source for BytesSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
