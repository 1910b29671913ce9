//! # render: template + format → bytes
//!
//! Rendering happens in two steps. A [`Template`] builds an [`outline::Outline`] from the
//! analysis data, then the requested [`OutputFormat`] encodes that outline. Both steps are
//! pure: the only clock ever read is [`RenderInput::generated_at`], supplied by the caller.
//!
//! [`FormatRenderer`] is the production [`Renderer`](crate::contract::Renderer); the
//! orchestrator only sees the trait so tests can inject failures per type.

pub mod docx;
pub mod html;
pub mod metrics;
pub mod outline;
pub mod pdf;
pub mod text;

use crate::contract::Renderer;
use crate::error::RenderError;
use crate::model::{FileId, OutputFormat, SourceData, Template};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::debug;

const PREVIEW_LIMIT: usize = 1000;

/// Everything a renderer may read. Cheap to clone; the source data is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInput {
    pub title: String,
    /// Title of the document type being rendered, shown as a subtitle.
    pub type_title: Option<String>,
    /// Category of the document type; recommendations in it are listed first.
    pub category: Option<String>,
    pub query: Option<String>,
    pub source: Arc<SourceData>,
    pub source_document_ids: Vec<FileId>,
    pub include_recommendations: bool,
    pub include_analyses: bool,
    pub generated_at: DateTime<Utc>,
}

impl RenderInput {
    pub fn new(title: impl Into<String>, source: Arc<SourceData>, generated_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            type_title: None,
            category: None,
            query: None,
            source,
            source_document_ids: Vec::new(),
            include_recommendations: true,
            include_analyses: true,
            generated_at,
        }
    }
}

pub fn render(
    template: Template,
    format: OutputFormat,
    input: &RenderInput,
) -> Result<Vec<u8>, RenderError> {
    let outline = outline::build(template, input);
    debug!(
        %template,
        %format,
        sections = outline.sections.len(),
        "Rendering outline"
    );
    match format {
        OutputFormat::Txt => Ok(text::to_plain_text(&outline).into_bytes()),
        OutputFormat::Md => Ok(text::to_markdown(&outline).into_bytes()),
        OutputFormat::Html => Ok(html::to_html(&outline).into_bytes()),
        OutputFormat::Docx => docx::to_docx(&outline),
        OutputFormat::Pdf => pdf::to_pdf(&outline),
        OutputFormat::Json => serde_json::to_vec_pretty(&outline).map_err(|e| RenderError::Format {
            format,
            message: e.to_string(),
        }),
    }
}

/// Markdown rendition, the text layer used for previews and for counting words and
/// sections of non-textual formats.
pub fn render_markdown(template: Template, input: &RenderInput) -> String {
    text::to_markdown(&outline::build(template, input))
}

/// First 1000 characters of the Markdown rendition, with `...` appended when cut.
pub fn preview(template: Template, input: &RenderInput) -> String {
    let md = render_markdown(template, input);
    if md.chars().count() > PREVIEW_LIMIT {
        let mut cut: String = md.chars().take(PREVIEW_LIMIT).collect();
        cut.push_str("...");
        cut
    } else {
        md
    }
}

pub fn list_templates() -> Vec<Template> {
    Template::iter().collect()
}

/// Stateless renderer backed by the functions in this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatRenderer;

impl Renderer for FormatRenderer {
    fn render(
        &self,
        template: Template,
        format: OutputFormat,
        input: &RenderInput,
    ) -> Result<Vec<u8>, RenderError> {
        render(template, format, input)
    }
}
