use std::collections::BTreeMap;

use super::super::context::BorrowerContext;
use super::super::domain::{
    Answer, AspectVersionId, Classification, QuestionVersion, QuestionVersionId, ReportAspect,
    TemplateAspect,
};
use super::super::visibility::is_visible;
use super::config::ClassificationConfig;
use super::round2;

/// Per-aspect scoring output plus the signals the final-classification rules
/// need: the weight map of visible aspects and the mandatory-failure tally.
pub(crate) struct AspectBreakdown {
    pub scores: Vec<ReportAspect>,
    pub weights: BTreeMap<AspectVersionId, f64>,
    pub mandatory_failures: u32,
}

/// Score every visible aspect of the template.
///
/// An aspect whose own visibility rule fails is excluded from both the
/// scores and the weight map, with no compensation. Within a visible
/// aspect, a hidden question is compensated at its best option score so a
/// question the borrower was never asked cannot depress the aspect, while a
/// visible question left unanswered contributes nothing.
pub(crate) fn score_aspects(
    aspects: &[TemplateAspect],
    answers: &[Answer],
    context: &BorrowerContext,
    config: &ClassificationConfig,
) -> AspectBreakdown {
    let answered: BTreeMap<&QuestionVersionId, &Answer> = answers
        .iter()
        .map(|answer| (&answer.question, answer))
        .collect();

    let mut scores = Vec::new();
    let mut weights = BTreeMap::new();
    let mut mandatory_failures = 0u32;

    for entry in aspects {
        let aspect = &entry.aspect;
        if !is_visible(aspect.visibility.as_ref(), context) {
            continue;
        }

        let mut total = 0.0f64;
        for question in &aspect.questions {
            if is_visible(question.visibility.as_ref(), context) {
                let score = selected_score(question, &answered);
                if let Some(score) = score {
                    total += question.weight / 100.0 * score;
                }
                if question.mandatory && score.map(|value| value < 0.0).unwrap_or(true) {
                    mandatory_failures += 1;
                }
            } else {
                total += question.weight / 100.0 * compensation(question, config);
            }
        }

        let total_score = round2(total);
        let classification = if total_score >= config.safe_threshold {
            Classification::Safe
        } else {
            Classification::Watchlist
        };

        scores.push(ReportAspect {
            aspect: aspect.id.clone(),
            total_score,
            classification,
        });
        weights.insert(aspect.id.clone(), entry.weight);
    }

    AspectBreakdown {
        scores,
        weights,
        mandatory_failures,
    }
}

/// Score of the selected option, or `None` when the question is unanswered
/// or the answer references an option no longer on the question.
fn selected_score(
    question: &QuestionVersion,
    answered: &BTreeMap<&QuestionVersionId, &Answer>,
) -> Option<f64> {
    let answer = answered.get(&question.id)?;
    question
        .options
        .iter()
        .find(|option| option.id == answer.option)
        .map(|option| option.score)
}

/// Best-case score assumed for a hidden question.
fn compensation(question: &QuestionVersion, config: &ClassificationConfig) -> f64 {
    question
        .options
        .iter()
        .map(|option| option.score)
        .fold(None, |best: Option<f64>, score| match best {
            Some(current) if current >= score => Some(current),
            _ => Some(score),
        })
        .unwrap_or(config.missing_option_compensation)
}
