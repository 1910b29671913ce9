/// `load_config` module: reads the CLI's YAML file into [`CliConfig`].
///
/// This is the only place where user-supplied YAML is parsed. The `generation` and
/// `bundle` sections map straight onto the core's [`WorkspaceConfig`]; both are optional
/// and fall back to the core defaults. Environment overrides (see
/// [`doc_bundle_core::config::TRANSFER_DELAY_ENV`]) are applied by [`CliConfig::workspace`].
///
/// # Errors
/// Read and parse failures are returned as `anyhow::Error` with the config path attached.
use anyhow::{Context, Result};
use doc_bundle_core::config::{BundleConfig, GenerationConfig, WorkspaceConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Directory holding the uploaded source documents; file names double as file ids.
    pub source_dir: PathBuf,
    /// Directory generated documents and bundles are written into.
    pub output_dir: PathBuf,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub bundle: BundleConfig,
}

impl CliConfig {
    /// Core configuration with environment overrides applied.
    pub fn workspace(&self) -> WorkspaceConfig {
        let workspace = WorkspaceConfig {
            generation: self.generation.clone(),
            bundle: self.bundle.clone(),
        }
        .with_env_overrides();
        workspace.trace_loaded();
        workspace
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref)
        .inspect_err(|e| error!(error = ?e, config_path = ?path_ref, "Failed to read config file"))
        .with_context(|| format!("Failed to read config file {path_ref:?}"))?;

    let config: CliConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML"))
        .with_context(|| format!("Failed to parse config YAML {path_ref:?}"))?;

    info!(
        config_path = ?path_ref,
        source_dir = ?config.source_dir,
        output_dir = ?config.output_dir,
        "Parsed config YAML successfully"
    );
    Ok(config)
}
