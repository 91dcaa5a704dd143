use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::BoxError;

/// Destination for extracted artifacts.
pub trait ArtifactSink {
    /// Store `bytes` under `name` and return where they ended up.
    fn persist(&mut self, name: &str, extension: &str, bytes: &[u8]) -> Result<String, BoxError>;
}

/// Name for the `order`-th box on a page, both one-based.
pub fn box_artifact_name(page_number: usize, order: usize) -> String {
    format!("p{page_number}_box_{order}")
}

/// Name for the `order`-th kept image on a page, both one-based.
pub fn image_artifact_name(page_number: usize, order: usize) -> String {
    format!("p{page_number}_img_{order}")
}

/// Name for the `order`-th detected table on a page, both one-based.
pub fn table_artifact_name(page_number: usize, order: usize) -> String {
    format!("p{page_number}_table_{order}")
}

/// Writes every artifact as `<dir>/<name>.<extension>`.
///
/// The directory is created on the first write, so a run that produces
/// nothing leaves nothing behind.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    created: bool,
}

impl DirectorySink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            created: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn persist(&mut self, name: &str, extension: &str, bytes: &[u8]) -> Result<String, BoxError> {
        if !self.created {
            fs::create_dir_all(&self.dir)?;
            self.created = true;
        }
        let path = self.dir.join(format!("{name}.{extension}"));
        fs::write(&path, bytes)?;
        debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path.display().to_string())
    }
}

/// An artifact held by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub name: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Keeps artifacts in memory, in the order they were persisted.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub artifacts: Vec<StoredArtifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.name.as_str()).collect()
    }
}

impl ArtifactSink for MemorySink {
    fn persist(&mut self, name: &str, extension: &str, bytes: &[u8]) -> Result<String, BoxError> {
        self.artifacts.push(StoredArtifact {
            name: name.to_owned(),
            extension: extension.to_owned(),
            bytes: bytes.to_vec(),
        });
        Ok(format!("{name}.{extension}"))
    }
}
