use crate::model::{OutputFormat, Template};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_TRANSFER_DELAY_MS: u64 = 500;
/// Floor for the spacing between individual transfers; smaller values are raised to it.
pub const MIN_TRANSFER_DELAY_MS: u64 = 100;
pub const TRANSFER_DELAY_ENV: &str = "DOC_BUNDLE_TRANSFER_DELAY_MS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub bundle: BundleConfig,
}

impl WorkspaceConfig {
    pub fn trace_loaded(&self) {
        info!(
            default_format = %self.generation.default_format,
            default_template = ?self.generation.default_template,
            transfer_delay_ms = self.bundle.transfer_delay().as_millis() as u64,
            "Loaded WorkspaceConfig"
        );
        debug!(?self, "WorkspaceConfig loaded (full debug)");
    }

    /// Applies `DOC_BUNDLE_TRANSFER_DELAY_MS` when set to a valid integer.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(raw) = std::env::var(TRANSFER_DELAY_ENV) {
            match raw.parse::<u64>() {
                Ok(ms) => {
                    info!(transfer_delay_ms = ms, "Transfer delay overridden from env");
                    self.bundle.transfer_delay_ms = ms;
                }
                Err(e) => {
                    warn!(error = ?e, raw = %raw, "Ignoring invalid {TRANSFER_DELAY_ENV}");
                }
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_format")]
    pub default_format: OutputFormat,
    /// When unset each document type uses its own default template.
    #[serde(default)]
    pub default_template: Option<Template>,
}

fn default_format() -> OutputFormat {
    OutputFormat::Md
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            default_template: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleConfig {
    #[serde(default = "default_transfer_delay_ms")]
    pub transfer_delay_ms: u64,
}

fn default_transfer_delay_ms() -> u64 {
    DEFAULT_TRANSFER_DELAY_MS
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            transfer_delay_ms: DEFAULT_TRANSFER_DELAY_MS,
        }
    }
}

impl BundleConfig {
    /// Spacing inserted between consecutive individual transfers.
    pub fn transfer_delay(&self) -> Duration {
        Duration::from_millis(self.transfer_delay_ms.max(MIN_TRANSFER_DELAY_MS))
    }
}
