//! Embedded capture time from image EXIF data.

use chrono::NaiveDateTime;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Read the capture timestamp from a file's EXIF block.
///
/// DateTimeOriginal is preferred, then DateTimeDigitized, then DateTime.
/// Unreadable or tag-less containers contribute nothing; that is never an
/// error at this level.
pub fn capture_stamp(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable EXIF data");
            return None;
        }
    };

    for tag in [
        exif::Tag::DateTimeOriginal,
        exif::Tag::DateTimeDigitized,
        exif::Tag::DateTime,
    ] {
        if let Some(field) = exif.get_field(tag, exif::In::PRIMARY) {
            let raw = field.display_value().to_string();
            let raw = raw.trim_matches('"');
            if let Some(stamp) = parse_exif_datetime(raw) {
                return Some(stamp);
            }
            debug!(path = %path.display(), value = raw, "unparseable EXIF datetime");
        }
    }

    None
}

/// EXIF stores `YYYY:MM:DD HH:MM:SS`; kamadak-exif's display form uses
/// dashes in the date part. Accept both.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_both_exif_datetime_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 16)
            .unwrap()
            .and_hms_opt(8, 5, 30)
            .unwrap();
        assert_eq!(parse_exif_datetime("2024-06-16 08:05:30"), Some(expected));
        assert_eq!(parse_exif_datetime("2024:06:16 08:05:30"), Some(expected));
        assert_eq!(parse_exif_datetime("not a date"), None);
    }

    #[test]
    fn garbage_file_contributes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();
        assert_eq!(capture_stamp(&path), None);
    }
}
