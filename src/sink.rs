//! Artifact sinks.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ConvertError;

/// Destination for generated artifacts.
pub trait Sink {
    fn write(&mut self, name: &str, artifact: &Value) -> Result<(), ConvertError>;
}

/// Writes each artifact as pretty-printed JSON into a directory.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create the output directory (and parents) if needed.
    pub fn create(dir: &Path) -> Result<Self, ConvertError> {
        std::fs::create_dir_all(dir).map_err(|source| ConvertError::WriteError {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Sink for DirectorySink {
    fn write(&mut self, name: &str, artifact: &Value) -> Result<(), ConvertError> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(artifact).map_err(|source| {
            ConvertError::Serialize {
                name: name.to_string(),
                source,
            }
        })?;
        std::fs::write(&path, json).map_err(|source| ConvertError::WriteError { path, source })
    }
}

/// Keeps artifacts in memory, in first-write order. Writing a name again
/// replaces its artifact, like overwriting a file.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub artifacts: Vec<(String, Value)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.artifacts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, artifact)| artifact)
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl Sink for MemorySink {
    fn write(&mut self, name: &str, artifact: &Value) -> Result<(), ConvertError> {
        match self.artifacts.iter().position(|(n, _)| n == name) {
            Some(index) => self.artifacts[index].1 = artifact.clone(),
            None => self.artifacts.push((name.to_string(), artifact.clone())),
        }
        Ok(())
    }
}
