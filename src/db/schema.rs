pub const SCHEMA: &str = r#"
-- Media files table: one row per distinct file path
CREATE TABLE IF NOT EXISTS media_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_path TEXT NOT NULL UNIQUE,
    file_name TEXT NOT NULL,
    file_type TEXT NOT NULL,
    file_extension TEXT NOT NULL,
    file_size INTEGER NOT NULL,

    -- Filesystem timestamps, ISO 8601 with explicit offset
    file_creation_time TEXT,
    file_modification_time TEXT,

    -- Resolved capture time, ISO 8601 with explicit offset
    capture_time TEXT,

    -- Video length in seconds
    duration REAL,

    error_message TEXT,
    last_updated TEXT NOT NULL,

    -- Content signature for change detection
    file_hash TEXT,
    processed INTEGER NOT NULL DEFAULT 1
);

-- Indexes for common queries
CREATE INDEX IF NOT EXISTS idx_media_file_type ON media_files(file_type);
CREATE INDEX IF NOT EXISTS idx_media_capture_time ON media_files(capture_time);
"#;

/// Migrations for databases created by earlier versions.
/// Applied best-effort; "duplicate column" failures are ignored.
pub const MIGRATIONS: &[&str] = &[
    "ALTER TABLE media_files ADD COLUMN error_message TEXT",
    "ALTER TABLE media_files ADD COLUMN file_hash TEXT",
    "ALTER TABLE media_files ADD COLUMN processed INTEGER NOT NULL DEFAULT 1",
];
