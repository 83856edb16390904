//! Skip/reprocess decision for candidate files.
//!
//! A file is skipped only when the store already holds a successfully
//! processed record whose signature matches the current one. Everything
//! else is reprocessed: unknown paths, prior failures, changed content,
//! and every path when `--force` is active.

use crate::db::PriorFileState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Reprocess,
}

pub fn decide(prior: Option<&PriorFileState>, signature: &str, force: bool) -> Decision {
    if force {
        return Decision::Reprocess;
    }
    match prior {
        Some(state) if state.processed && state.file_hash.as_deref() == Some(signature) => {
            Decision::Skip
        }
        _ => Decision::Reprocess,
    }
}

/// Whether the stored state matches the file on disk. Used by the
/// capture-time preservation rule: a force-driven rewrite of an unchanged
/// file keeps its resolved capture time.
pub fn is_unchanged(prior: Option<&PriorFileState>, signature: &str) -> bool {
    matches!(
        prior,
        Some(state) if state.processed && state.file_hash.as_deref() == Some(signature)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(hash: &str, processed: bool) -> PriorFileState {
        PriorFileState {
            file_hash: Some(hash.to_string()),
            processed,
            capture_time: None,
        }
    }

    #[test]
    fn unknown_path_is_reprocessed() {
        assert_eq!(decide(None, "abc", false), Decision::Reprocess);
    }

    #[test]
    fn matching_signature_is_skipped() {
        let prior = state("abc", true);
        assert_eq!(decide(Some(&prior), "abc", false), Decision::Skip);
    }

    #[test]
    fn changed_signature_is_reprocessed() {
        let prior = state("abc", true);
        assert_eq!(decide(Some(&prior), "def", false), Decision::Reprocess);
    }

    #[test]
    fn prior_failure_is_reprocessed() {
        let prior = state("abc", false);
        assert_eq!(decide(Some(&prior), "abc", false), Decision::Reprocess);
    }

    #[test]
    fn force_reprocesses_everything() {
        let prior = state("abc", true);
        assert_eq!(decide(Some(&prior), "abc", true), Decision::Reprocess);
    }

    #[test]
    fn unchanged_requires_processed_and_equal_hash() {
        assert!(is_unchanged(Some(&state("abc", true)), "abc"));
        assert!(!is_unchanged(Some(&state("abc", false)), "abc"));
        assert!(!is_unchanged(Some(&state("abc", true)), "def"));
        assert!(!is_unchanged(None, "abc"));
    }
}
