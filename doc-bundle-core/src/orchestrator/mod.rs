//! # orchestrator: selected document types → generated documents
//!
//! [`Orchestrator::generate`] validates a selection, renders every resolvable type on the
//! blocking pool and joins all of them before returning. Failures are per type:
//!   - an unknown type id is recorded as a failure with reason `"unknown type"`
//!   - a renderer error is recorded with the renderer's message
//!
//! and the remaining types still render. The call itself only fails when the selection
//! is empty, a source document is missing from the index snapshot, or every type failed.
//!
//! Lifecycle and progress are published through [`state::ProgressTracker`]. A call whose
//! future is dropped before it finishes leaves the tracker in `failed`, so the next call
//! can start.

pub mod state;

use crate::contract::Renderer;
use crate::error::{IndexError, RenderError, ValidationError};
use crate::index::IndexSnapshot;
use crate::model::{
    DocumentMetadata, FileId, GeneratedDocument, GenerationRequest, SourceData, Template,
};
use crate::registry::{DocumentTypeDescriptor, TypeRegistry};
use crate::render::metrics;
use crate::render::RenderInput;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use state::{GenerationEvent, GenerationStatus, ProgressTracker};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub const UNKNOWN_TYPE_REASON: &str = "unknown type";

/// Per-call inputs besides the selected type ids.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub request: GenerationRequest,
    pub source: Arc<SourceData>,
    /// Timestamp stamped into every document of this call.
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedEntry {
    #[serde(rename = "type")]
    pub type_id: String,
    pub document: GeneratedDocument,
    #[serde(skip)]
    pub template: Template,
    #[serde(skip)]
    pub input: RenderInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeFailure {
    #[serde(rename = "type")]
    pub type_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub documents: Vec<GeneratedEntry>,
    pub failures: Vec<TypeFailure>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("all {} selected document types failed", failures.len())]
    AllFailed { failures: Vec<TypeFailure> },
    #[error("a generation is already running ({0})")]
    Busy(#[from] state::InvalidTransition),
    #[error("generated document could not be indexed: {0}")]
    Index(#[from] IndexError),
}

pub struct Orchestrator {
    registry: TypeRegistry,
    renderer: Arc<dyn Renderer>,
    tracker: ProgressTracker,
}

impl Orchestrator {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            registry: TypeRegistry::new(),
            renderer,
            tracker: ProgressTracker::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationStatus> {
        self.tracker.subscribe()
    }

    pub fn status(&self) -> GenerationStatus {
        self.tracker.current()
    }

    pub async fn generate<S: AsRef<str>>(
        &self,
        selected_type_ids: &[S],
        context: &GenerationContext,
        snapshot: &IndexSnapshot,
    ) -> Result<GenerationResult, GenerationError> {
        self.tracker.apply(GenerationEvent::Start)?;
        let run = RunGuard::new(&self.tracker);

        if let Err(e) = validate(selected_type_ids, &context.request, snapshot) {
            warn!(error = %e, "[GEN] Rejected generation request");
            self.tracker.apply(GenerationEvent::Rejected)?;
            run.disarm();
            return Err(e.into());
        }

        let mut selected: Vec<&str> = Vec::new();
        for id in selected_type_ids.iter().map(AsRef::as_ref) {
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
        self.tracker.apply(GenerationEvent::Validated {
            total: selected.len(),
        })?;
        info!(
            types = selected.len(),
            format = %context.request.format,
            "[GEN] Starting generation"
        );

        let mut failures = Vec::new();
        let mut known: Vec<(&str, &'static DocumentTypeDescriptor)> = Vec::new();
        for id in selected {
            match self.registry.get(id) {
                Some(descriptor) => known.push((id, descriptor)),
                None => {
                    warn!(type_id = id, "[GEN] Unknown document type");
                    failures.push(TypeFailure {
                        type_id: id.to_string(),
                        reason: UNKNOWN_TYPE_REASON.to_string(),
                    });
                    self.tracker
                        .apply(GenerationEvent::TypeFinished { succeeded: false })?;
                }
            }
        }

        let tracker = &self.tracker;
        let tasks = known.into_iter().map(|(type_id, descriptor)| {
            let renderer = Arc::clone(&self.renderer);
            let template = context
                .request
                .template
                .unwrap_or(descriptor.default_template);
            let format = context.request.format;
            let input = render_input(descriptor, context);
            async move {
                let joined = tokio::task::spawn_blocking(move || {
                    let bytes = renderer.render(template, format, &input)?;
                    let measured = metrics::measure(template, format, &input, &bytes);
                    Ok::<_, RenderError>((bytes, measured, input))
                })
                .await;
                let outcome = match joined {
                    Ok(rendered) => rendered.map_err(|e| e.to_string()),
                    Err(e) => Err(format!("render task aborted: {e}")),
                };
                // Finished-count updates happen as each task completes, not at the join.
                if let Err(e) = tracker.apply(GenerationEvent::TypeFinished {
                    succeeded: outcome.is_ok(),
                }) {
                    warn!(type_id, error = %e, "[GEN] Progress update rejected");
                }
                (type_id, descriptor, template, outcome)
            }
        });
        let rendered = join_all(tasks).await;

        let mut documents = Vec::new();
        for (type_id, descriptor, template, outcome) in rendered {
            match outcome {
                Ok((content, measured, input)) => {
                    let document = GeneratedDocument {
                        id: FileId::generate(),
                        title: document_title(&context.request, descriptor),
                        content,
                        format: context.request.format,
                        metadata: DocumentMetadata {
                            word_count: measured.word_count,
                            sections: measured.sections,
                            source_document_ids: context.request.source_document_ids.clone(),
                            generated_at: context.generated_at,
                        },
                    };
                    info!(
                        type_id,
                        document_id = %document.id,
                        bytes = document.content.len(),
                        words = document.metadata.word_count,
                        sections = document.metadata.section_count(),
                        "[GEN] Generated document"
                    );
                    documents.push(GeneratedEntry {
                        type_id: type_id.to_string(),
                        document,
                        template,
                        input,
                    });
                }
                Err(reason) => {
                    error!(type_id, reason = %reason, "[GEN] Rendering failed");
                    failures.push(TypeFailure {
                        type_id: type_id.to_string(),
                        reason,
                    });
                }
            }
        }

        let status = self.tracker.apply(GenerationEvent::Finish)?;
        run.disarm();
        info!(
            state = %status.state,
            succeeded = documents.len(),
            failed = failures.len(),
            "[GEN] Generation finished"
        );

        if documents.is_empty() {
            return Err(GenerationError::AllFailed { failures });
        }
        Ok(GenerationResult {
            documents,
            failures,
        })
    }
}

/// Marks the run as cancelled if the `generate` future is dropped before it finishes.
struct RunGuard<'a> {
    tracker: &'a ProgressTracker,
    armed: bool,
}

impl<'a> RunGuard<'a> {
    fn new(tracker: &'a ProgressTracker) -> Self {
        Self {
            tracker,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.tracker.apply(GenerationEvent::Cancelled) {
            Ok(status) => warn!(
                succeeded = status.succeeded,
                failed = status.failed,
                total = status.total,
                "[GEN] Generation cancelled before it finished"
            ),
            Err(e) => error!(error = %e, "[GEN] Could not mark generation as cancelled"),
        }
    }
}

fn validate<S: AsRef<str>>(
    selected_type_ids: &[S],
    request: &GenerationRequest,
    snapshot: &IndexSnapshot,
) -> Result<(), ValidationError> {
    if selected_type_ids.is_empty() {
        return Err(ValidationError::EmptySelection);
    }
    match request
        .source_document_ids
        .iter()
        .find(|id| !snapshot.contains(id))
    {
        Some(missing) => Err(ValidationError::UnresolvedSource(missing.clone())),
        None => Ok(()),
    }
}

fn render_input(descriptor: &DocumentTypeDescriptor, context: &GenerationContext) -> RenderInput {
    let request = &context.request;
    RenderInput {
        title: request
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| descriptor.title.to_string()),
        type_title: Some(descriptor.title.to_string()),
        category: Some(descriptor.category.to_string()),
        query: request.query.clone(),
        source: Arc::clone(&context.source),
        source_document_ids: request.source_document_ids.clone(),
        include_recommendations: request.include_recommendations,
        include_analyses: request.include_analyses,
        generated_at: context.generated_at,
    }
}

/// "{title} - {type title}", or just the type title when no title was given.
fn document_title(request: &GenerationRequest, descriptor: &DocumentTypeDescriptor) -> String {
    match request.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => format!("{title} - {}", descriptor.title),
        _ => descriptor.title.to_string(),
    }
}
