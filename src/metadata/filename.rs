//! Filename-embedded timestamps.
//!
//! Some devices write a capture stamp into the filename and omit metadata
//! entirely (OneDrive's iOS uploads are the common case). The patterns here
//! cover the device families seen in real collections:
//!
//! - `20240616_080000123_iOS.heic`      (iOS upload, milliseconds suffix)
//! - `IMG_20240616_080000.jpg`          (Android, also VID_ / PXL_)
//! - `20240616-080000.jpg` / `20240616_080000.jpg`
//! - `2024-06-16 08.00.00.jpg`

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Parse a capture stamp out of a file name. Stamps with impossible
/// calendar fields (month 13, hour 25) yield nothing.
pub fn capture_stamp(file_name: &str) -> Option<NaiveDateTime> {
    let patterns = [
        // YYYYMMDD_HHMMSSmmm_iOS
        r"^(\d{4})(\d{2})(\d{2})_(\d{2})(\d{2})(\d{2})\d{3}_iOS",
        // IMG_/VID_/PXL_ YYYYMMDD_HHMMSS
        r"^(?:IMG|VID|PXL)_(\d{4})(\d{2})(\d{2})_(\d{2})(\d{2})(\d{2})",
        // Bare YYYYMMDD-HHMMSS or YYYYMMDD_HHMMSS
        r"^(\d{4})(\d{2})(\d{2})[-_](\d{2})(\d{2})(\d{2})",
        // YYYY-MM-DD HH.MM.SS
        r"^(\d{4})-(\d{2})-(\d{2}) (\d{2})\.(\d{2})\.(\d{2})",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).ok()?;
        if let Some(caps) = re.captures(file_name) {
            let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
            let (year, month, day) = (field(1)? as i32, field(2)?, field(3)?);
            let (hour, minute, second) = (field(4)?, field(5)?, field(6)?);
            if let Some(stamp) = NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|d| d.and_hms_opt(hour, minute, second))
            {
                return Some(stamp);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_ios_upload_names() {
        assert_eq!(
            capture_stamp("20240616_080530123_iOS.heic"),
            Some(stamp(2024, 6, 16, 8, 5, 30))
        );
    }

    #[test]
    fn parses_android_prefixed_names() {
        assert_eq!(
            capture_stamp("IMG_20240616_080530.jpg"),
            Some(stamp(2024, 6, 16, 8, 5, 30))
        );
        assert_eq!(
            capture_stamp("VID_20231201_193000.mp4"),
            Some(stamp(2023, 12, 1, 19, 30, 0))
        );
        assert_eq!(
            capture_stamp("PXL_20240101_000001.jpg"),
            Some(stamp(2024, 1, 1, 0, 0, 1))
        );
    }

    #[test]
    fn parses_bare_stamps() {
        assert_eq!(
            capture_stamp("20240616-080530.jpg"),
            Some(stamp(2024, 6, 16, 8, 5, 30))
        );
        assert_eq!(
            capture_stamp("20240616_080530.jpg"),
            Some(stamp(2024, 6, 16, 8, 5, 30))
        );
    }

    #[test]
    fn parses_dotted_time_form() {
        assert_eq!(
            capture_stamp("2024-06-16 08.05.30.png"),
            Some(stamp(2024, 6, 16, 8, 5, 30))
        );
    }

    #[test]
    fn impossible_fields_yield_nothing() {
        assert_eq!(capture_stamp("20241301_080530.jpg"), None);
        assert_eq!(capture_stamp("IMG_20240616_250530.jpg"), None);
    }

    #[test]
    fn unrelated_names_yield_nothing() {
        assert_eq!(capture_stamp("DSC01234.jpg"), None);
        assert_eq!(capture_stamp("holiday.jpg"), None);
    }
}
