//! mediadex — incremental media metadata catalog.
//!
//! Walks directory trees, detects new or changed files with a cheap content
//! signature, extracts capture timestamps (and video duration) from
//! multiple sources, resolves one authoritative capture time, and upserts
//! one record per file path into a SQLite store. Re-running is cheap:
//! unchanged files are skipped, and per-file failures never abort a run.

pub mod config;
pub mod dates;
pub mod db;
pub mod export;
pub mod logging;
pub mod metadata;
pub mod scanner;
pub mod stats;

pub use config::Config;
pub use db::{MediaKind, MediaRecord, Store};
pub use scanner::{ScanOptions, Scanner};
pub use stats::RunStats;
