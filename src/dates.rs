//! Capture-time resolution.
//!
//! Each extraction source contributes at most one candidate; the resolver
//! walks them in priority order (embedded tag, filename stamp, filesystem
//! creation time, filesystem modification time) and takes the first one
//! that passes the plausibility check. Candidates without zone information
//! are interpreted in the configured timezone; everything returned carries
//! an explicit offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::DateConfig;

/// A timestamp as one source produced it. Embedded tags and filename stamps
/// are usually zoneless local time; filesystem times come zone-aware.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateCandidate {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

/// Where a candidate came from, in resolution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateSource {
    Embedded,
    Filename,
    FsCreated,
    FsModified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Lenient,
    Strict,
}

#[derive(Debug, Clone)]
pub struct DatePolicy {
    pub timezone: Tz,
    pub mode: ValidationMode,
    pub epoch_floor_year: i32,
    pub future_skew_hours: i64,
}

impl DatePolicy {
    pub fn new(timezone: Tz, mode: ValidationMode, config: &DateConfig) -> Self {
        Self {
            timezone,
            mode,
            epoch_floor_year: config.epoch_floor_year,
            future_skew_hours: config.future_skew_hours,
        }
    }

    /// Normalize a candidate into the configured timezone with an explicit
    /// offset. Naive values that fall into a DST gap resolve to nothing.
    pub fn localize(&self, candidate: DateCandidate) -> Option<DateTime<FixedOffset>> {
        match candidate {
            DateCandidate::Aware(t) => Some(t.with_timezone(&self.timezone).fixed_offset()),
            DateCandidate::Naive(naive) => self
                .timezone
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.fixed_offset()),
        }
    }

    fn is_plausible(&self, t: DateTime<FixedOffset>, now: DateTime<Utc>) -> bool {
        if self.mode == ValidationMode::Lenient {
            return true;
        }
        let floor = match self
            .timezone
            .with_ymd_and_hms(self.epoch_floor_year, 1, 1, 0, 0, 0)
            .earliest()
        {
            Some(f) => f,
            None => return true,
        };
        let ceiling = now + Duration::hours(self.future_skew_hours);
        let t = t.with_timezone(&Utc);
        t >= floor.with_timezone(&Utc) && t <= ceiling
    }
}

/// Pick the capture time to persist, or `None` when no source produced a
/// plausible candidate. Implausible candidates fall through to the next
/// source rather than erroring.
pub fn resolve_capture_time(
    candidates: &[(DateSource, DateCandidate)],
    policy: &DatePolicy,
    now: DateTime<Utc>,
) -> Option<DateTime<FixedOffset>> {
    let mut ordered: Vec<&(DateSource, DateCandidate)> = candidates.iter().collect();
    ordered.sort_by_key(|(source, _)| *source);

    ordered
        .into_iter()
        .filter_map(|&(_, candidate)| policy.localize(candidate))
        .find(|&t| policy.is_plausible(t, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn policy(mode: ValidationMode) -> DatePolicy {
        DatePolicy::new(chrono_tz::UTC, mode, &DateConfig::default())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 24, 12, 0, 0).unwrap()
    }

    #[test]
    fn embedded_wins_over_filename_and_fs_times() {
        let candidates = vec![
            (
                DateSource::FsModified,
                DateCandidate::Naive(naive(2025, 3, 1, 0, 0, 0)),
            ),
            (
                DateSource::Embedded,
                DateCandidate::Naive(naive(2024, 6, 15, 10, 30, 0)),
            ),
            (
                DateSource::Filename,
                DateCandidate::Naive(naive(2024, 6, 16, 0, 0, 0)),
            ),
        ];
        let resolved = resolve_capture_time(&candidates, &policy(ValidationMode::Lenient), now());
        assert_eq!(
            resolved.unwrap().naive_utc(),
            naive(2024, 6, 15, 10, 30, 0)
        );
    }

    #[test]
    fn filename_used_when_no_embedded_tag() {
        let candidates = vec![
            (
                DateSource::Filename,
                DateCandidate::Naive(naive(2024, 6, 16, 8, 0, 0)),
            ),
            (
                DateSource::FsCreated,
                DateCandidate::Naive(naive(2025, 1, 1, 0, 0, 0)),
            ),
        ];
        let resolved = resolve_capture_time(&candidates, &policy(ValidationMode::Lenient), now());
        assert_eq!(resolved.unwrap().naive_utc(), naive(2024, 6, 16, 8, 0, 0));
    }

    #[test]
    fn strict_rejects_epoch_date_lenient_accepts_it() {
        let candidates = vec![(
            DateSource::Embedded,
            DateCandidate::Naive(naive(1970, 1, 1, 0, 0, 1)),
        )];

        let strict = resolve_capture_time(&candidates, &policy(ValidationMode::Strict), now());
        assert!(strict.is_none());

        let lenient = resolve_capture_time(&candidates, &policy(ValidationMode::Lenient), now());
        assert_eq!(lenient.unwrap().naive_utc(), naive(1970, 1, 1, 0, 0, 1));
    }

    #[test]
    fn strict_implausible_embedded_falls_through_to_filename() {
        let candidates = vec![
            (
                DateSource::Embedded,
                DateCandidate::Naive(naive(1970, 1, 1, 0, 0, 1)),
            ),
            (
                DateSource::Filename,
                DateCandidate::Naive(naive(2024, 6, 16, 8, 0, 0)),
            ),
        ];
        let resolved = resolve_capture_time(&candidates, &policy(ValidationMode::Strict), now());
        assert_eq!(resolved.unwrap().naive_utc(), naive(2024, 6, 16, 8, 0, 0));
    }

    #[test]
    fn strict_rejects_dates_beyond_future_skew() {
        let candidates = vec![(
            DateSource::Embedded,
            DateCandidate::Naive(naive(2025, 3, 26, 12, 0, 0)),
        )];
        let resolved = resolve_capture_time(&candidates, &policy(ValidationMode::Strict), now());
        assert!(resolved.is_none());
    }

    #[test]
    fn strict_allows_dates_within_future_skew() {
        let candidates = vec![(
            DateSource::Embedded,
            DateCandidate::Naive(naive(2025, 3, 24, 20, 0, 0)),
        )];
        let resolved = resolve_capture_time(&candidates, &policy(ValidationMode::Strict), now());
        assert!(resolved.is_some());
    }

    #[test]
    fn naive_candidates_are_interpreted_in_configured_timezone() {
        let policy = DatePolicy::new(
            chrono_tz::Asia::Tokyo,
            ValidationMode::Lenient,
            &DateConfig::default(),
        );
        let candidates = vec![(
            DateSource::Filename,
            DateCandidate::Naive(naive(2024, 6, 16, 9, 0, 0)),
        )];
        let resolved = resolve_capture_time(&candidates, &policy, now()).unwrap();
        assert_eq!(resolved.offset().local_minus_utc(), 9 * 3600);
        // 09:00 JST is midnight UTC
        assert_eq!(resolved.naive_utc(), naive(2024, 6, 16, 0, 0, 0));
    }

    #[test]
    fn aware_candidates_keep_their_instant() {
        let policy = DatePolicy::new(
            chrono_tz::Asia::Tokyo,
            ValidationMode::Lenient,
            &DateConfig::default(),
        );
        let instant = Utc.with_ymd_and_hms(2024, 6, 16, 0, 0, 0).unwrap();
        let candidates = vec![(
            DateSource::FsModified,
            DateCandidate::Aware(instant.fixed_offset()),
        )];
        let resolved = resolve_capture_time(&candidates, &policy, now()).unwrap();
        assert_eq!(resolved.with_timezone(&Utc), instant);
        assert_eq!(resolved.offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn no_candidates_resolves_to_none() {
        let resolved = resolve_capture_time(&[], &policy(ValidationMode::Strict), now());
        assert!(resolved.is_none());
    }
}
