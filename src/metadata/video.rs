//! Embedded creation time and duration for ISO-BMFF video containers.
//!
//! Covers mp4/mov/m4v/3gp through the pure-Rust `mp4` crate. Other video
//! containers (avi, mkv, webm, ...) have no self-contained reader in this
//! stack; they contribute no embedded candidate and no duration, which the
//! resolver treats as normal absence.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Seconds between the ISO-BMFF epoch (1904-01-01) and the Unix epoch.
const MP4_EPOCH_OFFSET: u64 = 2_082_844_800;

const ISO_BMFF_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "3gp"];

#[derive(Debug, Clone, Copy, Default)]
pub struct VideoFacts {
    pub creation_time: Option<DateTime<FixedOffset>>,
    pub duration_secs: Option<f64>,
}

/// Read creation time and duration from the container's movie header.
/// Unsupported or corrupt containers return empty facts.
pub fn video_facts(path: &Path, extension: &str) -> VideoFacts {
    if !ISO_BMFF_EXTENSIONS.contains(&extension) {
        return VideoFacts::default();
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return VideoFacts::default(),
    };
    let size = match file.metadata() {
        Ok(m) => m.len(),
        Err(_) => return VideoFacts::default(),
    };
    let reader = BufReader::new(file);
    let mp4 = match mp4::Mp4Reader::read_header(reader, size) {
        Ok(mp4) => mp4,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "unreadable video container");
            return VideoFacts::default();
        }
    };

    let mvhd = &mp4.moov.mvhd;
    let creation_time = mvhd_creation_time(mvhd.creation_time)
        .and_then(|unix| Utc.timestamp_opt(unix as i64, 0).single())
        .map(|t| t.fixed_offset());
    let duration_secs = if mvhd.timescale > 0 && mvhd.duration > 0 {
        Some(mvhd.duration as f64 / mvhd.timescale as f64)
    } else {
        None
    };

    VideoFacts {
        creation_time,
        duration_secs,
    }
}

/// Movie headers written before 2038 store seconds since 1904; some tools
/// write Unix seconds instead. A zero value means "unset".
fn mvhd_creation_time(raw: u64) -> Option<u64> {
    if raw == 0 {
        None
    } else if raw >= MP4_EPOCH_OFFSET {
        Some(raw - MP4_EPOCH_OFFSET)
    } else {
        Some(raw)
    }
}
