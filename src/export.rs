//! Read-only export surfaces over the store: full CSV dumps and
//! date-filtered listings with renamed copies.
//!
//! The image/video co-occurrence classification lives here and is computed
//! on read: it depends on the full set of video records for the queried
//! dates, so nothing about it is persisted.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::db::{MediaKind, MediaRecord, Store};

/// Dump every stored record to a CSV file, columns in schema order.
pub fn export_csv(store: &Store, output: &Path) -> Result<usize> {
    let records = store.all_records()?;
    let mut wtr = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    wtr.write_record([
        "full_path",
        "file_name",
        "file_type",
        "file_extension",
        "file_size",
        "file_creation_time",
        "file_modification_time",
        "capture_time",
        "duration",
        "error_message",
        "last_updated",
        "file_hash",
        "processed",
    ])?;

    for record in &records {
        let time = |t: Option<DateTime<FixedOffset>>| t.map(|t| t.to_rfc3339()).unwrap_or_default();
        wtr.write_record([
            record.full_path.clone(),
            record.file_name.clone(),
            record.kind.as_str().to_string(),
            record.extension.clone(),
            record.size_bytes.to_string(),
            time(record.fs_created),
            time(record.fs_modified),
            time(record.capture_time),
            record.duration_secs.map(|d| d.to_string()).unwrap_or_default(),
            record.error_message.clone().unwrap_or_default(),
            record.last_updated.to_rfc3339(),
            record.file_hash.clone().unwrap_or_default(),
            (record.processed as u8).to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(records.len())
}

/// `YYYY-MM-DD`, strictly; anything else is a usage error.
pub fn validate_date(date: &str) -> Result<()> {
    let ok = date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
    if ok {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "invalid date {:?}, expected YYYY-MM-DD",
            date
        ))
    }
}

/// Closed capture interval of a video record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// Capture windows for every video in the set that has both a capture time
/// and a positive duration.
pub fn video_windows(records: &[MediaRecord]) -> Vec<VideoWindow> {
    records
        .iter()
        .filter(|r| r.kind == MediaKind::Video)
        .filter_map(|r| {
            let start = r.capture_time?;
            let duration = r.duration_secs.filter(|d| *d > 0.0)?;
            let end = start + Duration::milliseconds((duration * 1000.0) as i64);
            Some(VideoWindow { start, end })
        })
        .collect()
}

/// Whether an instant falls inside any video's capture window. Both ends
/// inclusive: a photo taken at the exact moment a recording starts or
/// stops still co-occurs with it.
pub fn in_video_window(t: DateTime<FixedOffset>, windows: &[VideoWindow]) -> bool {
    windows.iter().any(|w| w.start <= t && t <= w.end)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOutcome {
    pub copied: usize,
    pub failed: usize,
}

/// Copy the records' files into `destination`, renamed to their capture
/// stamp (`%Y%m%d-%H%M%S`). Images captured inside a video's window get an
/// extra `-include` suffix; name collisions get `-1`, `-2`, ... counters.
/// With `clean`, regular files already in the destination are removed first.
pub fn copy_renamed(
    records: &[MediaRecord],
    destination: &Path,
    clean: bool,
) -> Result<CopyOutcome> {
    std::fs::create_dir_all(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;

    if clean {
        for entry in std::fs::read_dir(destination)? {
            let entry = entry?;
            if entry.path().is_file() {
                std::fs::remove_file(entry.path())
                    .with_context(|| format!("failed to clean {}", entry.path().display()))?;
            }
        }
    }

    let windows = video_windows(records);
    let mut outcome = CopyOutcome::default();

    for record in records {
        let Some(capture) = record.capture_time else {
            continue;
        };
        let mut stem = capture.format("%Y%m%d-%H%M%S").to_string();
        if record.kind == MediaKind::Image && in_video_window(capture, &windows) {
            stem.push_str("-include");
        }

        let target = unique_target(destination, &stem, &record.extension);
        match std::fs::copy(&record.full_path, &target) {
            Ok(_) => {
                info!(
                    source = %record.full_path,
                    target = %target.display(),
                    "exported"
                );
                outcome.copied += 1;
            }
            Err(e) => {
                warn!(source = %record.full_path, error = %e, "export copy failed");
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

fn unique_target(destination: &Path, stem: &str, extension: &str) -> PathBuf {
    let file_name = |stem: &str| {
        if extension.is_empty() {
            stem.to_string()
        } else {
            format!("{}.{}", stem, extension)
        }
    };

    let mut target = destination.join(file_name(stem));
    let mut counter = 1;
    while target.exists() {
        target = destination.join(file_name(&format!("{}-{}", stem, counter)));
        counter += 1;
    }
    target
}

/// Print a date-filtered listing, one line per record.
pub fn print_listing(records: &[MediaRecord]) {
    if records.is_empty() {
        println!("No media files found for the specified dates");
        return;
    }
    println!("Capture Time               | Full Path");
    println!("{}", "-".repeat(80));
    for record in records {
        let capture = record
            .capture_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        println!("{} | {}", capture, record.full_path);
    }
}
