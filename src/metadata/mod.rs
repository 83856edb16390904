//! Per-file metadata extraction.
//!
//! Produces a normalized bag of timestamp candidates (and a duration for
//! video) from all sources for one file. No source decides the winner here;
//! the resolver in `dates` does. A source that cannot be read simply
//! contributes nothing.

pub mod exif;
pub mod filename;
pub mod video;

use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dates::{DateCandidate, DateSource};
use crate::db::MediaKind;

/// Errors at the worker boundary. Transient stat failures drop the path
/// from the run; read failures become failed records.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything extraction learned about one file.
#[derive(Debug, Clone, Default)]
pub struct FileFacts {
    pub fs_created: Option<DateTime<Utc>>,
    pub fs_modified: Option<DateTime<Utc>>,
    /// Timestamp candidates from all sources, tagged by origin.
    pub candidates: Vec<(DateSource, DateCandidate)>,
    pub duration_secs: Option<f64>,
}

/// Gather timestamp candidates for a file that already passed a stat call.
///
/// Partial results are normal: a file with no embedded metadata and no
/// filename stamp still yields its filesystem times.
pub fn extract_facts(path: &Path, kind: MediaKind, extension: &str, meta: &Metadata) -> FileFacts {
    let mut facts = FileFacts {
        fs_created: meta.created().ok().map(DateTime::<Utc>::from),
        fs_modified: meta.modified().ok().map(DateTime::<Utc>::from),
        ..FileFacts::default()
    };

    match kind {
        MediaKind::Image => {
            if let Some(stamp) = exif::capture_stamp(path) {
                facts
                    .candidates
                    .push((DateSource::Embedded, DateCandidate::Naive(stamp)));
            }
        }
        MediaKind::Video => {
            let video = video::video_facts(path, extension);
            if let Some(t) = video.creation_time {
                facts
                    .candidates
                    .push((DateSource::Embedded, DateCandidate::Aware(t)));
            }
            facts.duration_secs = video.duration_secs;
        }
        MediaKind::Other => {}
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if let Some(stamp) = filename::capture_stamp(&file_name) {
        facts
            .candidates
            .push((DateSource::Filename, DateCandidate::Naive(stamp)));
    }

    if let Some(t) = facts.fs_created {
        facts
            .candidates
            .push((DateSource::FsCreated, DateCandidate::Aware(t.fixed_offset())));
    }
    if let Some(t) = facts.fs_modified {
        facts.candidates.push((
            DateSource::FsModified,
            DateCandidate::Aware(t.fixed_offset()),
        ));
    }

    facts
}
