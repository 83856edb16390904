//! Run counters and store statistics reporting.

use anyhow::Result;
use tracing::info;

use crate::db::Store;

/// Aggregate counters for one scan run. Accumulated at the single store
/// writer, so the totals are exact regardless of worker interleaving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub discovered: usize,
    pub processed_ok: usize,
    pub processed_error: usize,
    pub skipped: usize,
    /// Paths that failed to stat or read mid-scan and were dropped
    /// without touching the store.
    pub vanished: usize,
}

impl RunStats {
    pub fn log_summary(&self) {
        info!(
            discovered = self.discovered,
            processed_ok = self.processed_ok,
            processed_error = self.processed_error,
            skipped = self.skipped,
            vanished = self.vanished,
            "scan complete"
        );
    }
}

/// Store-wide statistics for the `stats` report.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub total_files: u64,
    pub total_bytes: u64,
    /// (file type, count, bytes) per kind.
    pub by_kind: Vec<(String, u64, u64)>,
    /// (extension, count), most common first, at most ten.
    pub top_extensions: Vec<(String, u64)>,
}

pub fn collect(store: &Store) -> Result<StoreStats> {
    let (total_files, total_bytes) = store.conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(file_size), 0) FROM media_files",
        [],
        |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as u64)),
    )?;

    let mut stmt = store.conn.prepare(
        "SELECT file_type, COUNT(*), COALESCE(SUM(file_size), 0) \
         FROM media_files GROUP BY file_type ORDER BY file_type",
    )?;
    let by_kind = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)? as u64,
                row.get::<_, i64>(2)? as u64,
            ))
        })?
        .filter_map(|r| r.ok())
        .collect();

    let mut stmt = store.conn.prepare(
        "SELECT file_extension, COUNT(*) FROM media_files \
         GROUP BY file_extension ORDER BY COUNT(*) DESC LIMIT 10",
    )?;
    let top_extensions = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(StoreStats {
        total_files,
        total_bytes,
        by_kind,
        top_extensions,
    })
}

pub fn print_report(stats: &StoreStats, run: Option<&RunStats>) {
    println!("Total files in store: {}", stats.total_files);
    println!("Total size: {}", format_size(stats.total_bytes));

    println!("\nFiles by type:");
    for (kind, count, bytes) in &stats.by_kind {
        println!("  {}: {} files, {}", kind, count, format_size(*bytes));
    }

    println!("\nTop extensions:");
    for (ext, count) in &stats.top_extensions {
        println!("  {}: {} files", ext, count);
    }

    if let Some(run) = run {
        println!("\nThis run:");
        println!("  discovered: {}", run.discovered);
        println!("  processed ok: {}", run.processed_ok);
        println!("  processed with error: {}", run.processed_error);
        println!("  skipped unchanged: {}", run.skipped);
        println!("  vanished: {}", run.vanished);
    }
}

pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.1} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.1} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MediaKind, MediaRecord};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn format_size_picks_sensible_units() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn collect_groups_by_kind_and_extension() {
        let dir = tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let now = Utc.with_ymd_and_hms(2025, 3, 24, 12, 0, 0).unwrap().fixed_offset();
        for (path, kind, ext, size) in [
            ("/a.jpg", MediaKind::Image, "jpg", 100u64),
            ("/b.jpg", MediaKind::Image, "jpg", 200),
            ("/c.mp4", MediaKind::Video, "mp4", 1000),
        ] {
            store
                .upsert(&MediaRecord {
                    full_path: path.to_string(),
                    file_name: path.trim_start_matches('/').to_string(),
                    kind,
                    extension: ext.to_string(),
                    size_bytes: size,
                    fs_created: None,
                    fs_modified: Some(now),
                    capture_time: None,
                    duration_secs: None,
                    error_message: None,
                    last_updated: now,
                    file_hash: Some("sig".to_string()),
                    processed: true,
                })
                .unwrap();
        }

        let stats = collect(&store).unwrap();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_bytes, 1300);
        assert_eq!(stats.by_kind.len(), 2);
        assert_eq!(stats.top_extensions[0], ("jpg".to_string(), 2));
    }
}
