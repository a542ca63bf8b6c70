use serde::{Deserialize, Serialize};

/// Knobs for the scoring and classification rules.
///
/// The same `safe_threshold` gates both per-aspect and overall
/// classification; the two are computed at different weighting
/// granularities, and that shared threshold is a documented choice of the
/// original rulebook, not an assumption of this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Minimum score (per aspect and overall) that still classifies SAFE.
    pub safe_threshold: f64,
    /// How many failed or missing mandatory visible answers are tolerated
    /// before the report classifies WATCHLIST outright.
    pub mandatory_failure_tolerance: u32,
    /// Compensation score assumed for a hidden question that has no options
    /// defined.
    pub missing_option_compensation: f64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            safe_threshold: 80.0,
            mandatory_failure_tolerance: 1,
            missing_option_compensation: 100.0,
        }
    }
}
