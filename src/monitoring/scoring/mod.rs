mod aspects;
mod config;
mod rules;

pub use config::ClassificationConfig;

use serde::{Deserialize, Serialize};

use super::context::BorrowerContext;
use super::domain::{Answer, Classification, ReportAspect, TemplateVersion};

/// Stateless engine turning answers, a template version, and a borrower
/// context into per-aspect scores and the overall classification. Pure:
/// persistence and side effects belong to the caller.
pub struct ClassificationEngine {
    config: ClassificationConfig,
}

impl ClassificationEngine {
    pub fn new(config: ClassificationConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(
        &self,
        template: &TemplateVersion,
        answers: &[Answer],
        context: &BorrowerContext,
    ) -> ScoringOutcome {
        let breakdown = aspects::score_aspects(&template.aspects, answers, context, &self.config);
        let overall_score = rules::overall_score(&breakdown.scores, &breakdown.weights);
        let final_classification = rules::final_classification(
            overall_score,
            &breakdown.scores,
            breakdown.mandatory_failures,
            &self.config,
        );

        ScoringOutcome {
            overall_score,
            final_classification,
            aspects: breakdown.scores,
            mandatory_failures: breakdown.mandatory_failures,
        }
    }
}

/// Evaluation result for one report; `aspects` holds the visible aspects in
/// template order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub overall_score: f64,
    pub final_classification: Classification,
    pub aspects: Vec<ReportAspect>,
    pub mandatory_failures: u32,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
