use std::collections::BTreeMap;

use super::super::domain::{AspectVersionId, Classification, ReportAspect};
use super::config::ClassificationConfig;
use super::round2;

/// Weighted aggregate of the visible aspect scores. Weights are taken as
/// authored; the engine does not renormalize when visible weights fail to
/// sum to 100.
pub(crate) fn overall_score(
    scores: &[ReportAspect],
    weights: &BTreeMap<AspectVersionId, f64>,
) -> f64 {
    let total = scores
        .iter()
        .map(|aspect| {
            let weight = weights.get(&aspect.aspect).copied().unwrap_or(0.0);
            aspect.total_score * weight / 100.0
        })
        .sum();
    round2(total)
}

/// Final classification is SAFE only when all three rules hold:
/// the overall score clears the threshold, no aspect vetoes with its own
/// WATCHLIST verdict, and the mandatory-failure tally stays within
/// tolerance.
pub(crate) fn final_classification(
    overall: f64,
    scores: &[ReportAspect],
    mandatory_failures: u32,
    config: &ClassificationConfig,
) -> Classification {
    let score_ok = overall >= config.safe_threshold;
    let no_veto = scores
        .iter()
        .all(|aspect| aspect.classification != Classification::Watchlist);
    let mandatory_ok = mandatory_failures <= config.mandatory_failure_tolerance;

    if score_ok && no_veto && mandatory_ok {
        Classification::Safe
    } else {
        Classification::Watchlist
    }
}
