//! Local-directory adapters for the collaborator seams.
//!
//! [`DirectoryStore`] serves uploaded files straight from a source directory, using the
//! file name as the file id. [`DirectorySink`] writes each individual transfer into an
//! output directory.

use crate::contract::{FileStore, StoreError, Transfer, TransferSink};
use crate::model::{FileId, SessionFile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Keeps only the final path component, so ids and transfer names never escape `root`.
fn contained_name(name: &str) -> Option<&str> {
    let leaf = Path::new(name).file_name()?.to_str()?;
    (leaf == name).then_some(leaf)
}

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// One upload record per regular file directly under the root, sorted by name. The
    /// category is the file extension (or `"file"`).
    pub async fn scan(&self, created_at: DateTime<Utc>) -> io::Result<Vec<SessionFile>> {
        let mut files = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %entry.path().display(), "Skipping file with non UTF-8 name");
                continue;
            };
            let category = Path::new(&name)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_else(|| "file".to_string());
            files.push(SessionFile::uploaded(
                name.as_str(),
                name.as_str(),
                category,
                meta.len(),
                created_at,
            ));
        }
        files.sort_by(|a, b| a.original_name.cmp(&b.original_name));
        info!(
            root = %self.root.display(),
            files = files.len(),
            "Scanned source directory"
        );
        Ok(files)
    }
}

#[async_trait]
impl FileStore for DirectoryStore {
    async fn fetch(&self, id: &FileId) -> Result<Vec<u8>, StoreError> {
        let name = contained_name(id.as_str())
            .ok_or_else(|| format!("file id {id} is not a plain file name"))?;
        let path = self.root.join(name);
        debug!(path = %path.display(), "Reading stored file");
        let bytes = tokio::fs::read(&path).await?;
        Ok(bytes)
    }
}

#[derive(Debug, Clone)]
pub struct DirectorySink {
    out_dir: PathBuf,
}

impl DirectorySink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Writes a named file into the output directory and returns its path.
    pub async fn write(&self, file_name: &str, content: &[u8]) -> Result<PathBuf, StoreError> {
        let name = contained_name(file_name)
            .ok_or_else(|| format!("transfer name {file_name:?} is not a plain file name"))?;
        tokio::fs::create_dir_all(&self.out_dir).await?;
        let path = self.out_dir.join(name);
        tokio::fs::write(&path, content).await?;
        info!(path = %path.display(), size = content.len(), "Wrote file");
        Ok(path)
    }
}

#[async_trait]
impl TransferSink for DirectorySink {
    async fn send(&self, transfer: Transfer) -> Result<(), StoreError> {
        self.write(&transfer.file_name, &transfer.content).await?;
        Ok(())
    }
}
