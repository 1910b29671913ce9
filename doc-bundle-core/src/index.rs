//! Session file index: one addressable collection for uploaded and generated files.
//!
//! Generated files carry their [`GeneratedDocument`] next to the index record; uploaded
//! files only carry metadata and are resolved through the
//! [`FileStore`](crate::contract::FileStore). Whether a file counts as generated comes
//! from [`SessionFile::is_generated`] alone.

use crate::error::IndexError;
use crate::model::{FileId, GeneratedDocument, SessionFile, Template};
use crate::render::RenderInput;
use std::sync::Arc;
use tracing::{debug, info};

/// What the session keeps about a generated document so it can be re-exported later.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRecord {
    pub document: GeneratedDocument,
    pub type_id: String,
    pub template: Template,
    pub input: RenderInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub file: SessionFile,
    pub generated: Option<Arc<GeneratedRecord>>,
}

#[derive(Debug, Default)]
pub struct SessionFileIndex {
    entries: Vec<Arc<IndexEntry>>,
}

impl SessionFileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an uploaded file record. Ids must be unique within the session.
    pub fn add(&mut self, file: SessionFile) -> Result<(), IndexError> {
        self.insert(IndexEntry {
            file,
            generated: None,
        })
    }

    /// Adds a generated file record together with its document.
    pub fn add_generated(
        &mut self,
        file: SessionFile,
        record: GeneratedRecord,
    ) -> Result<(), IndexError> {
        self.insert(IndexEntry {
            file,
            generated: Some(Arc::new(record)),
        })
    }

    /// Adds several generated files at once. Either every file is added or, when any id
    /// is already taken or repeated in the batch, none is.
    pub fn add_generated_batch(
        &mut self,
        batch: Vec<(SessionFile, GeneratedRecord)>,
    ) -> Result<(), IndexError> {
        for (i, (file, _)) in batch.iter().enumerate() {
            let repeated = batch[..i].iter().any(|(earlier, _)| earlier.id == file.id);
            if repeated || self.contains(&file.id) {
                return Err(IndexError::DuplicateId(file.id.clone()));
            }
        }
        for (file, record) in batch {
            self.add_generated(file, record)?;
        }
        Ok(())
    }

    fn insert(&mut self, entry: IndexEntry) -> Result<(), IndexError> {
        if self.contains(&entry.file.id) {
            return Err(IndexError::DuplicateId(entry.file.id));
        }
        info!(
            file_id = %entry.file.id,
            name = %entry.file.original_name,
            generated = entry.file.is_generated,
            size = entry.file.file_size_bytes,
            "Added file to session index"
        );
        self.entries.push(Arc::new(entry));
        Ok(())
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.entries.iter().any(|e| &e.file.id == id)
    }

    /// All files in insertion order.
    pub fn list(&self) -> Vec<SessionFile> {
        self.entries.iter().map(|e| e.file.clone()).collect()
    }

    pub fn get(&self, id: &FileId) -> Result<SessionFile, IndexError> {
        self.entry(id).map(|e| e.file.clone())
    }

    pub fn entry(&self, id: &FileId) -> Result<Arc<IndexEntry>, IndexError> {
        self.entries
            .iter()
            .find(|e| &e.file.id == id)
            .cloned()
            .ok_or_else(|| IndexError::NotFound(id.clone()))
    }

    pub fn remove(&mut self, id: &FileId) -> Result<SessionFile, IndexError> {
        let pos = self
            .entries
            .iter()
            .position(|e| &e.file.id == id)
            .ok_or_else(|| IndexError::NotFound(id.clone()))?;
        let removed = self.entries.remove(pos);
        debug!(file_id = %id, "Removed file from session index");
        Ok(removed.file.clone())
    }

    pub fn generated(&self) -> Vec<SessionFile> {
        self.list().into_iter().filter(|f| f.is_generated).collect()
    }

    pub fn uploaded(&self) -> Vec<SessionFile> {
        self.list().into_iter().filter(|f| !f.is_generated).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Immutable view for one generation or bundle call. Later changes to the index do
    /// not show up in it.
    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            entries: self.entries.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    entries: Vec<Arc<IndexEntry>>,
}

impl IndexSnapshot {
    pub fn get(&self, id: &FileId) -> Option<&Arc<IndexEntry>> {
        self.entries.iter().find(|e| &e.file.id == id)
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.get(id).is_some()
    }

    pub fn files(&self) -> impl Iterator<Item = &SessionFile> {
        self.entries.iter().map(|e| &e.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentMetadata, OutputFormat, SourceData};
    use chrono::{TimeZone, Utc};

    fn upload(id: &str, name: &str) -> SessionFile {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        SessionFile::uploaded(id, name, "survey", 10, at)
    }

    fn generated(id: &str) -> (SessionFile, GeneratedRecord) {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut file = SessionFile::uploaded(id, "doc.md", "safety", 4, at);
        file.is_generated = true;
        let record = GeneratedRecord {
            document: GeneratedDocument {
                id: FileId::from(id),
                title: "Doc".to_string(),
                content: b"# Doc".to_vec(),
                format: OutputFormat::Md,
                metadata: DocumentMetadata {
                    word_count: 2,
                    sections: vec!["Doc".to_string()],
                    source_document_ids: Vec::new(),
                    generated_at: at,
                },
            },
            type_id: "jsa".to_string(),
            template: Template::Report,
            input: RenderInput::new("Doc", Arc::new(SourceData::default()), at),
        };
        (file, record)
    }

    #[test]
    fn batch_with_a_taken_id_adds_nothing() {
        let mut index = SessionFileIndex::new();
        index.add(upload("2", "b.pdf")).unwrap();

        let err = index
            .add_generated_batch(vec![generated("g1"), generated("2")])
            .unwrap_err();

        assert_eq!(err, IndexError::DuplicateId(FileId::from("2")));
        assert_eq!(index.len(), 1);
        assert!(!index.contains(&FileId::from("g1")));
    }

    #[test]
    fn batch_with_a_repeated_id_adds_nothing() {
        let mut index = SessionFileIndex::new();
        let err = index
            .add_generated_batch(vec![generated("g1"), generated("g1")])
            .unwrap_err();
        assert_eq!(err, IndexError::DuplicateId(FileId::from("g1")));
        assert!(index.is_empty());

        index
            .add_generated_batch(vec![generated("g1"), generated("g2")])
            .unwrap();
        assert_eq!(index.generated().len(), 2);
    }

    #[test]
    fn snapshot_is_isolated_from_later_removal() {
        let mut index = SessionFileIndex::new();
        index.add(upload("1", "a.pdf")).unwrap();
        index.add(upload("2", "b.pdf")).unwrap();
        let snapshot = index.snapshot();

        index.remove(&FileId::from("1")).unwrap();

        assert!(snapshot.contains(&FileId::from("1")));
        assert!(!index.contains(&FileId::from("1")));
        assert_eq!(snapshot.files().count(), 2);
    }
}
