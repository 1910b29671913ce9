use crate::model::{FileId, OutputFormat};
use thiserror::Error;

/// User-correctable input problems, rejected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no document types selected")]
    EmptySelection,
    #[error("no files selected for download")]
    EmptyFileSelection,
    #[error("unknown type: {0}")]
    UnknownType(String),
    #[error("source document {0} does not exist in this session")]
    UnresolvedSource(FileId),
    #[error("document {0} was not generated in this session")]
    UnknownDocument(FileId),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{format} rendering failed: {message}")]
    Format {
        format: OutputFormat,
        message: String,
    },
    #[error("container write failed: {0}")]
    Container(#[from] zip::result::ZipError),
    #[error("io error during rendering: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("file id {0} already exists in this session")]
    DuplicateId(FileId),
    #[error("file {0} not found")]
    NotFound(FileId),
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A referenced file could not be resolved; in zip mode this fails the whole bundle.
    #[error("could not resolve file {id}: {reason}")]
    Resolution { id: FileId, reason: String },
    #[error("archive assembly failed: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("io error during archive assembly: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of single-file session operations (download, preview, registration).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
