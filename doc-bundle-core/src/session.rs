//! # session: one user's document workspace
//!
//! [`Session`] ties the pieces together for a single working context:
//! it owns the [`SessionFileIndex`], an [`Orchestrator`] and a [`Bundler`], and exposes the
//! operations a front end calls (register uploads, generate, download, preview, bundle).
//!
//! Every generation or bundle call reads from a snapshot of the index taken when the call
//! starts, so concurrent removals only affect the references they remove.

use crate::bundle::{Bundler, DeliveryPlan};
use crate::config::WorkspaceConfig;
use crate::contract::{FileStore, Renderer, TransferSink};
use crate::error::{BundleError, IndexError, SessionError, ValidationError};
use crate::index::{GeneratedRecord, SessionFileIndex};
use crate::model::{BundleRequest, FileId, GenerationRequest, OutputFormat, SessionFile, SourceData};
use crate::naming;
use crate::orchestrator::state::GenerationStatus;
use crate::orchestrator::{GenerationContext, GenerationError, GenerationResult, Orchestrator};
use crate::registry::TypeRegistry;
use crate::render;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

/// A downloadable file: name, content type and bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedFile {
    pub file_name: String,
    pub mime_type: &'static str,
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// Per-download overrides for a generated document. Unset fields keep what the document
/// was generated with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    pub format: Option<OutputFormat>,
    pub include_recommendations: Option<bool>,
    pub include_analyses: Option<bool>,
}

pub struct Session {
    index: RwLock<SessionFileIndex>,
    orchestrator: Orchestrator,
    renderer: Arc<dyn Renderer>,
    bundler: Bundler,
    config: WorkspaceConfig,
}

impl Session {
    pub fn new(
        config: WorkspaceConfig,
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            index: RwLock::new(SessionFileIndex::new()),
            orchestrator: Orchestrator::new(Arc::clone(&renderer)),
            renderer,
            bundler: Bundler::new(store, config.bundle.clone()),
            config,
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.orchestrator.registry()
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationStatus> {
        self.orchestrator.subscribe()
    }

    pub fn status(&self) -> GenerationStatus {
        self.orchestrator.status()
    }

    /// Records a file that arrived through upload intake.
    pub async fn register_upload(&self, mut file: SessionFile) -> Result<(), IndexError> {
        file.is_generated = false;
        self.index.write().await.add(file)
    }

    pub async fn remove(&self, id: &FileId) -> Result<SessionFile, IndexError> {
        self.index.write().await.remove(id)
    }

    pub async fn get_file(&self, id: &FileId) -> Result<SessionFile, IndexError> {
        self.index.read().await.get(id)
    }

    pub async fn list_files(&self) -> Vec<SessionFile> {
        self.index.read().await.list()
    }

    pub async fn generated_files(&self) -> Vec<SessionFile> {
        self.index.read().await.generated()
    }

    pub async fn uploaded_files(&self) -> Vec<SessionFile> {
        self.index.read().await.uploaded()
    }

    /// Generates the selected types and adds every produced document to the index as a
    /// generated file. Documents are indexed all together or, on an id collision, not at
    /// all. A request without a template falls back to the configured default,
    /// then to each type's own default.
    pub async fn generate<S: AsRef<str>>(
        &self,
        selected_type_ids: &[S],
        mut request: GenerationRequest,
        source: Arc<SourceData>,
        generated_at: DateTime<Utc>,
    ) -> Result<GenerationResult, GenerationError> {
        if request.template.is_none() {
            request.template = self.config.generation.default_template;
        }
        let snapshot = self.index.read().await.snapshot();
        let context = GenerationContext {
            request,
            source,
            generated_at,
        };
        let result = self
            .orchestrator
            .generate(selected_type_ids, &context, &snapshot)
            .await?;

        let batch = result
            .documents
            .iter()
            .map(|entry| {
                let descriptor = self.orchestrator.registry().get(&entry.type_id);
                let document = &entry.document;
                let file = SessionFile {
                    id: document.id.clone(),
                    original_name: naming::file_name(&document.title, document.format.extension()),
                    description: descriptor.map(|d| d.description.to_string()),
                    category: descriptor
                        .map(|d| d.category.to_string())
                        .unwrap_or_else(|| "generated".to_string()),
                    file_size_bytes: document.content.len() as u64,
                    created_at: document.metadata.generated_at,
                    is_generated: true,
                };
                let record = GeneratedRecord {
                    document: document.clone(),
                    type_id: entry.type_id.clone(),
                    template: entry.template,
                    input: entry.input.clone(),
                };
                (file, record)
            })
            .collect();

        let mut index = self.index.write().await;
        index.add_generated_batch(batch)?;
        info!(
            added = result.documents.len(),
            total_files = index.len(),
            "Indexed generated documents"
        );
        Ok(result)
    }

    /// Bytes of a generated document, named `"{sanitized title}.{format}"`.
    ///
    /// When the options match what the document was generated with, the stored bytes are
    /// returned as-is; otherwise the document is rendered again from its recorded input.
    pub async fn download_document(
        &self,
        id: &FileId,
        options: DownloadOptions,
    ) -> Result<NamedFile, SessionError> {
        let record = self.generated_record(id).await?;
        let stored = &record.document;
        let format = options.format.unwrap_or(stored.format);

        let mut input = record.input.clone();
        if let Some(include) = options.include_recommendations {
            input.include_recommendations = include;
        }
        if let Some(include) = options.include_analyses {
            input.include_analyses = include;
        }

        let content = if format == stored.format && input == record.input {
            debug!(document_id = %id, "Serving stored document bytes");
            stored.content.clone()
        } else {
            debug!(document_id = %id, %format, "Re-rendering document for download");
            self.renderer.render(record.template, format, &input)?
        };

        Ok(NamedFile {
            file_name: naming::file_name(&stored.title, format.extension()),
            mime_type: format.mime_type(),
            content,
        })
    }

    /// Markdown preview of a generated document, cut at 1000 characters.
    pub async fn preview(&self, id: &FileId) -> Result<String, SessionError> {
        let record = self.generated_record(id).await?;
        Ok(render::preview(record.template, &record.input))
    }

    pub async fn bundle(
        &self,
        request: &BundleRequest,
        sink: &dyn TransferSink,
    ) -> Result<DeliveryPlan, BundleError> {
        self.bundle_at(request, sink, Utc::now()).await
    }

    /// Like [`Session::bundle`] with an explicit clock, which names and stamps the archive.
    pub async fn bundle_at(
        &self,
        request: &BundleRequest,
        sink: &dyn TransferSink,
        at: DateTime<Utc>,
    ) -> Result<DeliveryPlan, BundleError> {
        let snapshot = self.index.read().await.snapshot();
        self.bundler.bundle(request, &snapshot, sink, at).await
    }

    async fn generated_record(&self, id: &FileId) -> Result<Arc<GeneratedRecord>, SessionError> {
        let entry = self.index.read().await.entry(id)?;
        entry
            .generated
            .clone()
            .ok_or_else(|| ValidationError::UnknownDocument(id.clone()).into())
    }
}
