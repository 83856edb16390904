//! SQLite store for media records.
//!
//! One table, `media_files`, keyed uniquely on `full_path`. The store handle
//! is owned by a single writer at a time; the scan pipeline funnels all
//! writes through one thread (see `scanner`), so no locking happens here.

mod schema;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;

pub use schema::{MIGRATIONS, SCHEMA};

/// File classification derived from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }
}

/// One media file's persisted metadata. All timestamps carry an explicit
/// UTC offset; nothing naive is ever stored.
#[derive(Debug, Clone)]
pub struct MediaRecord {
    pub full_path: String,
    pub file_name: String,
    pub kind: MediaKind,
    pub extension: String,
    pub size_bytes: u64,
    pub fs_created: Option<DateTime<FixedOffset>>,
    pub fs_modified: Option<DateTime<FixedOffset>>,
    pub capture_time: Option<DateTime<FixedOffset>>,
    /// Video length in seconds; only set for `MediaKind::Video`.
    pub duration_secs: Option<f64>,
    pub error_message: Option<String>,
    pub last_updated: DateTime<FixedOffset>,
    pub file_hash: Option<String>,
    pub processed: bool,
}

/// The slice of a stored record the change detector and the capture-time
/// preservation rule need, loaded for all paths before a scan.
#[derive(Debug, Clone)]
pub struct PriorFileState {
    pub file_hash: Option<String>,
    pub processed: bool,
    pub capture_time: Option<DateTime<FixedOffset>>,
}

pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        for migration in MIGRATIONS {
            let _ = self.conn.execute(migration, []);
        }
        Ok(())
    }

    /// Insert or fully overwrite the record for its path.
    ///
    /// A single `INSERT ... ON CONFLICT DO UPDATE` statement, so each write
    /// is atomic and the path-uniqueness constraint is enforced by SQLite.
    pub fn upsert(&self, record: &MediaRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO media_files (
                full_path, file_name, file_type, file_extension, file_size,
                file_creation_time, file_modification_time, capture_time,
                duration, error_message, last_updated, file_hash, processed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(full_path) DO UPDATE SET
                file_name = excluded.file_name,
                file_type = excluded.file_type,
                file_extension = excluded.file_extension,
                file_size = excluded.file_size,
                file_creation_time = excluded.file_creation_time,
                file_modification_time = excluded.file_modification_time,
                capture_time = excluded.capture_time,
                duration = excluded.duration,
                error_message = excluded.error_message,
                last_updated = excluded.last_updated,
                file_hash = excluded.file_hash,
                processed = excluded.processed
            "#,
            rusqlite::params![
                record.full_path,
                record.file_name,
                record.kind.as_str(),
                record.extension,
                record.size_bytes as i64,
                record.fs_created.map(|t| t.to_rfc3339()),
                record.fs_modified.map(|t| t.to_rfc3339()),
                record.capture_time.map(|t| t.to_rfc3339()),
                record.duration_secs,
                record.error_message,
                record.last_updated.to_rfc3339(),
                record.file_hash,
                record.processed as i64,
            ],
        )?;
        Ok(())
    }

    /// Hash, processed state and capture time for every stored path.
    pub fn prior_states(&self) -> Result<HashMap<String, PriorFileState>> {
        let mut stmt = self
            .conn
            .prepare("SELECT full_path, file_hash, processed, capture_time FROM media_files")?;
        let states = stmt
            .query_map([], |row| {
                let capture: Option<String> = row.get(3)?;
                Ok((
                    row.get::<_, String>(0)?,
                    PriorFileState {
                        file_hash: row.get(1)?,
                        processed: row.get::<_, i64>(2)? != 0,
                        capture_time: capture
                            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok()),
                    },
                ))
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(states)
    }

    pub fn get_record(&self, full_path: &str) -> Result<Option<MediaRecord>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM media_files WHERE full_path = ?", RECORD_COLUMNS),
            [full_path],
            record_from_row,
        );
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn all_records(&self) -> Result<Vec<MediaRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM media_files ORDER BY full_path",
            RECORD_COLUMNS
        ))?;
        let records = stmt
            .query_map([], record_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    /// Records whose capture time falls on one of the given `YYYY-MM-DD`
    /// dates, ascending by capture time. Prefix match against the stored
    /// ISO 8601 text, as the export tooling expects.
    pub fn records_for_dates(&self, dates: &[String]) -> Result<Vec<MediaRecord>> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }
        let conditions = vec!["capture_time LIKE ?"; dates.len()].join(" OR ");
        let sql = format!(
            "SELECT {} FROM media_files WHERE capture_time IS NOT NULL AND ({}) ORDER BY capture_time ASC",
            RECORD_COLUMNS, conditions
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let params: Vec<String> = dates.iter().map(|d| format!("{}%", d)).collect();
        let records = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), record_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    pub fn count_records(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM media_files", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

const RECORD_COLUMNS: &str = "full_path, file_name, file_type, file_extension, file_size, \
     file_creation_time, file_modification_time, capture_time, duration, \
     error_message, last_updated, file_hash, processed";

fn record_from_row(row: &rusqlite::Row) -> rusqlite::Result<MediaRecord> {
    let parse = |s: Option<String>| s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok());
    let last_updated: String = row.get(10)?;
    Ok(MediaRecord {
        full_path: row.get(0)?,
        file_name: row.get(1)?,
        kind: MediaKind::parse(&row.get::<_, String>(2)?),
        extension: row.get(3)?,
        size_bytes: row.get::<_, i64>(4)? as u64,
        fs_created: parse(row.get(5)?),
        fs_modified: parse(row.get(6)?),
        capture_time: parse(row.get(7)?),
        duration_secs: row.get(8)?,
        error_message: row.get(9)?,
        last_updated: DateTime::parse_from_rfc3339(&last_updated)
            .unwrap_or_else(|_| DateTime::<chrono::Utc>::MIN_UTC.fixed_offset()),
        file_hash: row.get(11)?,
        processed: row.get::<_, i64>(12)? != 0,
    })
}
