/// # doc-bundle CLI interface
///
/// Argument parsing and command routing for the `doc-bundle` binary. All document logic
/// lives in `doc-bundle-core`; this module only wires a [`Session`] to the local
/// directories named in the YAML config and prints results.
///
/// ## Commands
/// - `types`: list the document type catalog, optionally filtered by priority.
/// - `templates`: list the available templates.
/// - `generate`: generate documents from an analysis JSON file and write them to
///   `output_dir`, either one file per document or as a single zip.
/// - `bundle`: deliver uploaded files from `source_dir` into `output_dir`.
///
/// For programmatic or integration use, call [`run`] with a constructed [`Cli`].
use crate::load_config::{load_config, CliConfig};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use doc_bundle_core::bundle::DeliveryPlan;
use doc_bundle_core::local::{DirectorySink, DirectoryStore};
use doc_bundle_core::model::{
    BundleRequest, DeliveryMode, FileId, GenerationRequest, OutputFormat, SourceData, Template,
};
use doc_bundle_core::registry::{PriorityClass, TypeRegistry};
use doc_bundle_core::render::{list_templates, FormatRenderer};
use doc_bundle_core::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// CLI for doc-bundle: generate site documents and bundle session files.
#[derive(Parser)]
#[clap(
    name = "doc-bundle",
    version,
    about = "Generate site documents from analysis data and bundle them for download"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the document types that can be generated
    Types {
        /// Only list types of this priority (high, medium, low)
        #[clap(long)]
        priority: Option<PriorityClass>,
    },
    /// List the available templates
    Templates,
    /// Generate documents for the selected types
    Generate {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// JSON file with the analysis and recommendation data
        #[clap(long)]
        analysis: PathBuf,
        /// Comma separated document type ids
        #[clap(long, value_delimiter = ',', required = true)]
        types: Vec<String>,
        #[clap(long)]
        title: Option<String>,
        /// Free text focus for the documents
        #[clap(long)]
        query: Option<String>,
        /// Source document (file name in source_dir); repeatable
        #[clap(long)]
        source: Vec<String>,
        #[clap(long)]
        include_recommendations: bool,
        #[clap(long)]
        include_analyses: bool,
        /// Output format; defaults to the configured format
        #[clap(long)]
        format: Option<OutputFormat>,
        #[clap(long)]
        template: Option<Template>,
        /// Write one zip archive instead of individual files
        #[clap(long)]
        zip: bool,
    },
    /// Deliver uploaded files from source_dir into output_dir
    Bundle {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// File names in source_dir, in delivery order
        #[clap(long, value_delimiter = ',', required = true)]
        files: Vec<String>,
        #[clap(long, default_value = "zip")]
        mode: DeliveryMode,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Types { priority } => {
            print_types(priority);
            Ok(())
        }
        Commands::Templates => {
            for template in list_templates() {
                println!("{template}");
            }
            Ok(())
        }
        Commands::Generate {
            config,
            analysis,
            types,
            title,
            query,
            source,
            include_recommendations,
            include_analyses,
            format,
            template,
            zip,
        } => {
            let config = load_config(config)?;
            let session = open_session(&config).await?;
            let data = read_analysis(&analysis)?;

            let mut request =
                GenerationRequest::new(format.unwrap_or(config.generation.default_format));
            request.title = title;
            request.query = query;
            request.source_document_ids = source.into_iter().map(FileId::from).collect();
            request.include_recommendations = include_recommendations;
            request.include_analyses = include_analyses;
            request.template = template;

            info!(command = "generate", types = ?types, format = %request.format, "Starting generation");
            let result = session
                .generate(types.as_slice(), request, Arc::new(data), Utc::now())
                .await
                .inspect_err(|e| error!(command = "generate", error = %e, "Generation failed"))?;
            for failure in &result.failures {
                error!(type_id = %failure.type_id, reason = %failure.reason, "Document type failed");
            }

            let ids: Vec<FileId> = result.documents.iter().map(|d| d.document.id.clone()).collect();
            let mode = if zip {
                DeliveryMode::Zip
            } else {
                DeliveryMode::Individual
            };
            deliver(&session, &config, BundleRequest::new(ids, mode)).await?;

            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Bundle {
            config,
            files,
            mode,
        } => {
            let config = load_config(config)?;
            let session = open_session(&config).await?;
            let plan = deliver(&session, &config, BundleRequest::new(files, mode)).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
    }
}

fn print_types(priority: Option<PriorityClass>) {
    let registry = TypeRegistry::new();
    let types = match priority {
        Some(p) => registry.filter_by_priority(p),
        None => registry.list_types().iter().collect(),
    };
    for t in types {
        println!("{}\t{}\t{}\t{}", t.id, t.priority, t.category, t.title);
    }
}

/// Session over `source_dir` with every file in it registered as an upload.
async fn open_session(config: &CliConfig) -> Result<Session> {
    let store = DirectoryStore::new(&config.source_dir);
    let uploads = store
        .scan(Utc::now())
        .await
        .with_context(|| format!("Failed to scan source_dir {:?}", config.source_dir))?;
    let session = Session::new(config.workspace(), Arc::new(FormatRenderer), Arc::new(store));
    for file in uploads {
        session.register_upload(file).await?;
    }
    Ok(session)
}

fn read_analysis(path: &Path) -> Result<SourceData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read analysis file {path:?}"))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse analysis JSON {path:?}"))
}

async fn deliver(
    session: &Session,
    config: &CliConfig,
    request: BundleRequest,
) -> Result<DeliveryPlan> {
    let sink = DirectorySink::new(&config.output_dir);
    let plan = session.bundle(&request, &sink).await?;
    match &plan {
        DeliveryPlan::Zip(archive) => {
            let path = sink
                .write(&archive.file_name, &archive.content)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to write archive: {e}"))?;
            info!(path = %path.display(), entries = archive.entries.len(), "Archive written");
        }
        DeliveryPlan::Individual(delivery) => {
            for failure in &delivery.failures {
                error!(file_id = %failure.file_id, kind = %failure.kind, reason = %failure.reason, "File not delivered");
            }
            if delivery.delivered.is_empty() {
                bail!("None of the {} requested files were delivered", request.file_ids.len());
            }
        }
    }
    Ok(plan)
}
