//! # bundle: deliver selected session files
//!
//! Two delivery modes with deliberately different failure policies:
//!
//! - **individual**: files go out one at a time through a [`TransferSink`], in request
//!   order, with a fixed pause between consecutive transfers. A file that cannot be
//!   resolved or sent is logged and skipped; the rest still go out.
//! - **zip**: every file is resolved first (concurrently), then written into one archive
//!   in request order. A single unresolved file fails the whole bundle and no archive
//!   bytes are produced.
//!
//! Both modes read from an [`IndexSnapshot`] taken when the call starts.

use crate::archive::ArchiveBuilder;
use crate::config::BundleConfig;
use crate::contract::{FileStore, Transfer, TransferSink};
use crate::error::{BundleError, ValidationError};
use crate::index::IndexSnapshot;
use crate::model::{BundleRequest, DeliveryMode, FileId, SessionFile};
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use strum::Display;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredFile {
    pub file_id: FileId,
    pub file_name: String,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// The file vanished from the session or its bytes could not be fetched.
    Resolution,
    /// The bytes were resolved but the receiving side rejected them.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferFailure {
    pub file_id: FileId,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndividualDelivery {
    pub delivered: Vec<DeliveredFile>,
    pub failures: Vec<TransferFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveBundle {
    pub file_name: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    /// Entry names in archive order.
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DeliveryPlan {
    Individual(IndividualDelivery),
    Zip(ArchiveBundle),
}

/// `session_{YYYY-MM-DD}.zip`
pub fn archive_name(date: NaiveDate) -> String {
    format!("session_{}.zip", date.format("%Y-%m-%d"))
}

pub struct Bundler {
    store: Arc<dyn FileStore>,
    config: BundleConfig,
}

impl Bundler {
    pub fn new(store: Arc<dyn FileStore>, config: BundleConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Delivers the requested files. `at` names the archive and stamps its entries.
    pub async fn bundle(
        &self,
        request: &BundleRequest,
        snapshot: &IndexSnapshot,
        sink: &dyn TransferSink,
        at: DateTime<Utc>,
    ) -> Result<DeliveryPlan, BundleError> {
        if request.file_ids.is_empty() {
            warn!("[BUNDLE] Rejected empty file selection");
            return Err(ValidationError::EmptyFileSelection.into());
        }
        info!(
            files = request.file_ids.len(),
            mode = %request.mode,
            "[BUNDLE] Starting delivery"
        );
        match request.mode {
            DeliveryMode::Individual => Ok(DeliveryPlan::Individual(
                self.deliver_individually(&request.file_ids, snapshot, sink)
                    .await,
            )),
            DeliveryMode::Zip => Ok(DeliveryPlan::Zip(
                self.assemble_archive(&request.file_ids, snapshot, at)
                    .await?,
            )),
        }
    }

    async fn deliver_individually(
        &self,
        file_ids: &[FileId],
        snapshot: &IndexSnapshot,
        sink: &dyn TransferSink,
    ) -> IndividualDelivery {
        let delay = self.config.transfer_delay();
        let mut delivered = Vec::new();
        let mut failures = Vec::new();
        let mut attempted_send = false;

        for id in file_ids {
            let (file, content) = match self.resolve(id, snapshot).await {
                Ok(resolved) => resolved,
                Err(reason) => {
                    warn!(file_id = %id, reason = %reason, "[BUNDLE] Skipping unresolved file");
                    failures.push(TransferFailure {
                        file_id: id.clone(),
                        kind: FailureKind::Resolution,
                        reason,
                    });
                    continue;
                }
            };

            if attempted_send {
                debug!(delay_ms = delay.as_millis() as u64, "[BUNDLE] Pausing between transfers");
                tokio::time::sleep(delay).await;
            }
            attempted_send = true;

            let size_bytes = content.len();
            let transfer = Transfer {
                file_id: id.clone(),
                file_name: file.original_name.clone(),
                content,
            };
            match sink.send(transfer).await {
                Ok(()) => {
                    info!(file_id = %id, name = %file.original_name, size = size_bytes, "[BUNDLE] Transfer sent");
                    delivered.push(DeliveredFile {
                        file_id: id.clone(),
                        file_name: file.original_name,
                        size_bytes,
                    });
                }
                Err(e) => {
                    error!(file_id = %id, error = ?e, "[BUNDLE] Transfer failed");
                    failures.push(TransferFailure {
                        file_id: id.clone(),
                        kind: FailureKind::Transport,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            delivered = delivered.len(),
            failed = failures.len(),
            "[BUNDLE] Individual delivery finished"
        );
        IndividualDelivery {
            delivered,
            failures,
        }
    }

    async fn assemble_archive(
        &self,
        file_ids: &[FileId],
        snapshot: &IndexSnapshot,
        at: DateTime<Utc>,
    ) -> Result<ArchiveBundle, BundleError> {
        let resolved = join_all(file_ids.iter().map(|id| self.resolve(id, snapshot))).await;

        let mut files = Vec::with_capacity(resolved.len());
        for (id, outcome) in file_ids.iter().zip(resolved) {
            match outcome {
                Ok(file) => files.push(file),
                Err(reason) => {
                    error!(file_id = %id, reason = %reason, "[BUNDLE] Aborting archive, file unresolved");
                    return Err(BundleError::Resolution {
                        id: id.clone(),
                        reason,
                    });
                }
            }
        }

        let mut archive = ArchiveBuilder::new(at);
        let mut entries = Vec::with_capacity(files.len());
        for (file, content) in &files {
            let entry = archive.add(&file.original_name, content)?;
            debug!(file_id = %file.id, entry = %entry, "[BUNDLE] Added archive entry");
            entries.push(entry);
        }
        let content = archive.finish()?;
        let file_name = archive_name(at.date_naive());
        info!(
            name = %file_name,
            entries = entries.len(),
            size = content.len(),
            "[BUNDLE] Archive assembled"
        );
        Ok(ArchiveBundle {
            file_name,
            content,
            entries,
        })
    }

    /// Generated files come from the snapshot; uploaded files from the store.
    async fn resolve(
        &self,
        id: &FileId,
        snapshot: &IndexSnapshot,
    ) -> Result<(SessionFile, Vec<u8>), String> {
        let entry = snapshot
            .get(id)
            .ok_or_else(|| format!("file {id} is not in this session"))?;
        match &entry.generated {
            Some(record) => Ok((entry.file.clone(), record.document.content.clone())),
            None => self
                .store
                .fetch(id)
                .await
                .map(|bytes| (entry.file.clone(), bytes))
                .map_err(|e| e.to_string()),
        }
    }
}
