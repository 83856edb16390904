//! The incremental scan pipeline.
//!
//! Workers run the per-path steps (stat, signature, extraction, date
//! resolution) in parallel on a bounded rayon pool and hand completed
//! outcomes over a channel to one writer thread, which owns the store
//! handle and is the only code that mutates it. A per-path failure becomes
//! record state or a run counter; only a store write failure aborts the
//! run, via an abort flag the workers check before dispatching.

pub mod change_detection;
pub mod discovery;
pub mod signature;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::Metadata;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::dates::{self, DatePolicy, ValidationMode};
use crate::db::{MediaKind, MediaRecord, PriorFileState, Store};
use crate::metadata::{self, ExtractError};
use crate::stats::RunStats;

use change_detection::Decision;
use discovery::Discovery;

/// Behavioral flags for one scan run, mapped straight from the CLI.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Reprocess every file regardless of signature.
    pub force: bool,
    /// Recompute capture times even for unchanged files. Implies `force`.
    pub force_all_dates: bool,
    pub strict_dates: bool,
    pub media_only: bool,
    pub extra_extensions: Vec<String>,
    /// Worker threads; 0 means available parallelism.
    pub threads: usize,
}

/// What one worker produced for one path.
enum Outcome {
    Record(MediaRecord),
    Skipped,
    Vanished,
}

pub struct Scanner {
    config: Config,
    options: ScanOptions,
}

impl Scanner {
    pub fn new(config: Config, mut options: ScanOptions) -> Self {
        if options.force_all_dates {
            options.force = true;
        }
        Self { config, options }
    }

    fn worker_threads(&self) -> usize {
        if self.options.threads > 0 {
            self.options.threads
        } else {
            self.config.worker_threads()
        }
    }

    /// Scan a directory tree into the store. Takes the store by value: the
    /// handle moves into the writer thread and nothing else touches it.
    pub fn scan_directory(&self, directory: &Path, store: Store) -> Result<RunStats> {
        let timezone = self.config.timezone()?;
        let mode = if self.options.strict_dates {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        };
        let policy = DatePolicy::new(timezone, mode, &self.config.dates);

        let discovery = Discovery::new(
            &self.config.scanner,
            &self.options.extra_extensions,
            self.options.media_only,
        );
        let paths = discovery
            .discover(directory)
            .with_context(|| format!("failed to walk {}", directory.display()))?;
        info!(
            directory = %directory.display(),
            count = paths.len(),
            "discovered candidate files"
        );

        let prior = store.prior_states().context("failed to load prior state")?;
        info!(known = prior.len(), "loaded prior records from store");

        let abort = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<Outcome>();

        let writer_abort = Arc::clone(&abort);
        let writer = thread::spawn(move || -> (RunStats, Result<()>) {
            let mut stats = RunStats::default();
            for outcome in rx {
                match outcome {
                    Outcome::Skipped => stats.skipped += 1,
                    Outcome::Vanished => stats.vanished += 1,
                    Outcome::Record(record) => {
                        let processed = record.processed;
                        if let Err(e) = store.upsert(&record) {
                            error!(
                                path = %record.full_path,
                                error = %e,
                                "store write failed, aborting run"
                            );
                            writer_abort.store(true, Ordering::SeqCst);
                            return (stats, Err(e.context("store write failed")));
                        }
                        if processed {
                            stats.processed_ok += 1;
                        } else {
                            stats.processed_error += 1;
                        }
                    }
                }
            }
            (stats, Ok(()))
        });

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads())
            .build()
            .context("failed to build worker pool")?;

        pool.install(|| {
            paths.par_iter().for_each_with(tx, |tx, path| {
                if abort.load(Ordering::SeqCst) {
                    return;
                }
                let outcome = self.process_path(path, &discovery, &prior, &policy);
                let _ = tx.send(outcome);
            });
        });

        let (mut stats, write_result) = writer
            .join()
            .map_err(|_| anyhow!("store writer thread panicked"))?;
        write_result?;

        stats.discovered = paths.len();
        stats.log_summary();
        Ok(stats)
    }

    /// Steps 1-3 of the pipeline for one path: change detection, metadata
    /// extraction and date resolution. Never touches the store.
    fn process_path(
        &self,
        path: &Path,
        discovery: &Discovery,
        prior: &HashMap<String, PriorFileState>,
        policy: &DatePolicy,
    ) -> Outcome {
        let path_str = path.to_string_lossy().to_string();
        let prior_state = prior.get(&path_str);

        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(source) => {
                let err = ExtractError::Stat {
                    path: path.to_path_buf(),
                    source,
                };
                warn!(error = %err, "dropping path for this run");
                return Outcome::Vanished;
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let kind = discovery.classify(&extension);
        let now = Utc::now();

        let sig = match signature::file_signature(path, &meta) {
            Ok(sig) => sig,
            Err(source) => {
                let err = ExtractError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                };
                // A transient read failure must not clobber an intact record;
                // a path we have never catalogued gets a failed record.
                return match prior_state {
                    Some(state) if state.processed => {
                        warn!(error = %err, "unreadable file, keeping stored record");
                        Outcome::Vanished
                    }
                    _ => {
                        warn!(error = %err, "unreadable file, recording failure");
                        Outcome::Record(self.failed_record(
                            path_str,
                            file_name,
                            kind,
                            extension,
                            &meta,
                            policy,
                            err.to_string(),
                            now,
                        ))
                    }
                };
            }
        };

        if change_detection::decide(prior_state, &sig, self.options.force) == Decision::Skip {
            debug!(path = %path.display(), "unchanged, skipping");
            return Outcome::Skipped;
        }

        let facts = metadata::extract_facts(path, kind, &extension, &meta);

        // An existing capture time survives a force-driven rewrite of an
        // unchanged file; everything else recomputes from scratch.
        let unchanged = change_detection::is_unchanged(prior_state, &sig);
        let preserved = if unchanged && !self.options.force_all_dates {
            prior_state.and_then(|state| state.capture_time)
        } else {
            None
        };
        let capture_time =
            preserved.or_else(|| dates::resolve_capture_time(&facts.candidates, policy, now));

        let to_local = |t: DateTime<Utc>| t.with_timezone(&policy.timezone).fixed_offset();

        Outcome::Record(MediaRecord {
            full_path: path_str,
            file_name,
            kind,
            extension,
            size_bytes: meta.len(),
            fs_created: facts.fs_created.map(to_local),
            fs_modified: facts.fs_modified.map(to_local),
            capture_time,
            duration_secs: if kind == MediaKind::Video {
                facts.duration_secs
            } else {
                None
            },
            error_message: None,
            last_updated: to_local(now),
            file_hash: Some(sig),
            processed: true,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn failed_record(
        &self,
        full_path: String,
        file_name: String,
        kind: MediaKind,
        extension: String,
        meta: &Metadata,
        policy: &DatePolicy,
        error_message: String,
        now: DateTime<Utc>,
    ) -> MediaRecord {
        let to_local = |t: std::time::SystemTime| {
            DateTime::<Utc>::from(t)
                .with_timezone(&policy.timezone)
                .fixed_offset()
        };
        MediaRecord {
            full_path,
            file_name,
            kind,
            extension,
            size_bytes: meta.len(),
            fs_created: meta.created().ok().map(to_local),
            fs_modified: meta.modified().ok().map(to_local),
            capture_time: None,
            duration_secs: None,
            error_message: Some(error_message),
            last_updated: now.with_timezone(&policy.timezone).fixed_offset(),
            file_hash: None,
            processed: false,
        }
    }
}
