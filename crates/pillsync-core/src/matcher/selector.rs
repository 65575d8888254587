//! Best-match selection.

use super::{MatchError, MatchOutcome};
use crate::models::MatchResult;

/// Pick the first item with the highest score.
///
/// Later items replace the current best only when strictly greater, so ties
/// resolve to the earliest item. No minimum score is applied.
pub fn select_best_by<T, F>(items: &[T], score: F) -> MatchOutcome<&T>
where
    F: Fn(&T) -> f64,
{
    let mut iter = items.iter();
    let first = iter.next().ok_or(MatchError::EmptyCandidateSet)?;

    let mut best = first;
    let mut best_score = score(first);
    for item in iter {
        let s = score(item);
        if s > best_score {
            best = item;
            best_score = s;
        }
    }
    Ok(best)
}

/// Pick the match result with the highest confidence.
pub fn select_best(results: &[MatchResult]) -> MatchOutcome<&MatchResult> {
    select_best_by(results, |r| r.confidence)
}
