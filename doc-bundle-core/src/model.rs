//! Plain data carried between the registry, renderer, orchestrator, index and bundler.
//!
//! Nothing here performs I/O. Timestamps are always supplied by the caller so that
//! rendering and metadata stay reproducible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Identifier of a file in a session (uploaded or generated).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id, used for generated documents.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for FileId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Byte-level encoding of a generated document.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    Txt,
    Md,
    Html,
    Docx,
    Pdf,
    Json,
}

impl OutputFormat {
    /// File extension, identical to the lowercase format name.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Md => "md",
            OutputFormat::Html => "html",
            OutputFormat::Docx => "docx",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "text/plain; charset=utf-8",
            OutputFormat::Md => "text/markdown; charset=utf-8",
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Json => "application/json",
        }
    }
}

/// Content-structuring strategy, independent of the output format.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Template {
    Report,
    Summary,
    Analysis,
    Recommendations,
}

/// Parameters of one user-triggered generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub source_document_ids: Vec<FileId>,
    #[serde(default)]
    pub include_recommendations: bool,
    #[serde(default)]
    pub include_analyses: bool,
    pub format: OutputFormat,
    /// Falls back to the document type's default template when absent.
    #[serde(default)]
    pub template: Option<Template>,
}

impl GenerationRequest {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            title: None,
            query: None,
            source_document_ids: Vec::new(),
            include_recommendations: false,
            include_analyses: false,
            format,
            template: None,
        }
    }
}

/// Analysis and recommendation data produced upstream and consumed by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceData {
    #[serde(default)]
    pub project_description: Option<String>,
    #[serde(default)]
    pub site_data: Option<String>,
    #[serde(default)]
    pub analysis: Option<AnalysisSummary>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub summary: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub records: Vec<AnalysisRecord>,
}

/// Findings extracted from one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub document_id: FileId,
    pub title: String,
    #[serde(default)]
    pub findings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub citation: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub word_count: usize,
    pub sections: Vec<String>,
    pub source_document_ids: Vec<FileId>,
    pub generated_at: DateTime<Utc>,
}

impl DocumentMetadata {
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

/// A rendered document. Never mutated after creation; regenerating produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedDocument {
    pub id: FileId,
    pub title: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub format: OutputFormat,
    pub metadata: DocumentMetadata,
}

/// Unified index record for uploaded and generated files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub id: FileId,
    pub original_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub file_size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub is_generated: bool,
}

impl SessionFile {
    /// Record for a file that arrived through upload intake.
    pub fn uploaded(
        id: impl Into<FileId>,
        original_name: impl Into<String>,
        category: impl Into<String>,
        file_size_bytes: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            original_name: original_name.into(),
            description: None,
            category: category.into(),
            file_size_bytes,
            created_at,
            is_generated: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeliveryMode {
    Individual,
    Zip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleRequest {
    pub file_ids: Vec<FileId>,
    pub mode: DeliveryMode,
}

impl BundleRequest {
    pub fn new<I, T>(file_ids: I, mode: DeliveryMode) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FileId>,
    {
        Self {
            file_ids: file_ids.into_iter().map(Into::into).collect(),
            mode,
        }
    }
}
