//! # contract: seams between the generation core and its collaborators
//!
//! The core never talks to storage, a network or a renderer implementation directly.
//! It goes through the traits below, which production code implements with real
//! adapters (see [`crate::local`]) and tests replace with `mockall` mocks.
//!
//! ## Traits
//! - [`Renderer`]: turns a template + format + analysis data into bytes. Must be pure.
//! - [`FileStore`]: returns the stored bytes of an uploaded source document.
//! - [`TransferSink`]: receives one named file per call during individual delivery.
//!
//! ## Errors
//! Collaborator failures are boxed ([`StoreError`]) and mapped by the caller into
//! resolution or transport failures. The core never retries them.

use crate::error::RenderError;
use crate::model::{FileId, OutputFormat, Template};
use crate::render::RenderInput;
use async_trait::async_trait;

#[allow(unused_imports)]
use mockall::{automock, predicate::*};

/// Error type returned by storage and transport collaborators.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// A single named file handed to a [`TransferSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub file_id: FileId,
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Format renderer used by the orchestrator.
///
/// Same `(template, format, input)` must always give byte-identical output.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Renderer: Send + Sync {
    fn render(
        &self,
        template: Template,
        format: OutputFormat,
        input: &RenderInput,
    ) -> Result<Vec<u8>, RenderError>;
}

/// Storage for uploaded source documents.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Fetch the stored bytes of an uploaded file.
    async fn fetch(&self, id: &FileId) -> Result<Vec<u8>, StoreError>;
}

/// Receiving side of individual (one file at a time) delivery.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TransferSink: Send + Sync {
    async fn send(&self, transfer: Transfer) -> Result<(), StoreError>;
}
