use std::sync::Arc;

use chrono::Utc;

use crate::monitoring::audit::{AuditError, AuditEvent, AuditSink};
use crate::monitoring::context::{BorrowerContext, ContextValue};
use crate::monitoring::domain::{
    ActorId, Answer, AspectVersion, AspectVersionId, BorrowerId, OptionId, PeriodId,
    QuestionOption, QuestionVersion, QuestionVersionId, Report, ReportId, ReportStatus,
    ReviewerRole, TemplateAspect, TemplateVersion, TemplateVersionId,
};
use crate::monitoring::scoring::ClassificationConfig;
use crate::monitoring::service::ReportReviewService;
use crate::monitoring::store::{MemoryAuditLog, MemoryStore, StaticContexts, StaticRoles};
use crate::monitoring::visibility::{RuleOperator, RuleSource, RuleValue, VisibilityRule};

pub(super) type Service =
    ReportReviewService<MemoryStore, StaticContexts, StaticRoles, MemoryAuditLog>;

pub(super) struct Harness {
    pub service: Service,
    pub store: MemoryStore,
    pub audit: MemoryAuditLog,
}

pub(super) fn analyst() -> ActorId {
    ActorId("maya.analyst".to_string())
}

pub(super) fn business_head() -> ActorId {
    ActorId("bram.busheadd".to_string())
}

pub(super) fn division_head() -> ActorId {
    ActorId("sari.divhead".to_string())
}

pub(super) fn outsider() -> ActorId {
    ActorId("intern.temp".to_string())
}

pub(super) fn borrower() -> BorrowerId {
    BorrowerId("acme-industrial".to_string())
}

pub(super) fn reviewer_roles() -> StaticRoles {
    StaticRoles::default()
        .grant(analyst(), ReviewerRole::RiskAnalyst)
        .grant(business_head(), ReviewerRole::BusinessDepartmentHead)
        .grant(division_head(), ReviewerRole::RiskDivisionHead)
}

pub(super) fn harness(context: BorrowerContext) -> Harness {
    let store = MemoryStore::default();
    let audit = MemoryAuditLog::default();
    let contexts = StaticContexts::default().with(borrower(), context);
    let service = ReportReviewService::new(
        Arc::new(store.clone()),
        Arc::new(contexts),
        Arc::new(reviewer_roles()),
        Arc::new(audit.clone()),
        ClassificationConfig::default(),
    );

    Harness {
        service,
        store,
        audit,
    }
}

pub(super) fn context_with(pairs: &[(&str, ContextValue)]) -> BorrowerContext {
    let mut context = BorrowerContext::default();
    for (field, value) in pairs {
        context.detail.insert((*field).to_string(), value.clone());
    }
    context
}

pub(super) fn report(id: &str) -> Report {
    Report {
        id: ReportId(id.to_string()),
        borrower: borrower(),
        period: PeriodId("2026-Q1".to_string()),
        template_version: TemplateVersionId("tpl-corp-v3".to_string()),
        status: ReportStatus::Submitted,
        rejection_reason: None,
        created_by: ActorId("rm.owner".to_string()),
        submitted_at: Utc::now(),
    }
}

pub(super) fn option(id: &str, score: f64) -> QuestionOption {
    QuestionOption {
        id: OptionId(id.to_string()),
        label: id.to_string(),
        score,
    }
}

pub(super) fn question(
    id: &str,
    weight: f64,
    mandatory: bool,
    visibility: Option<VisibilityRule>,
    options: Vec<QuestionOption>,
) -> QuestionVersion {
    QuestionVersion {
        id: QuestionVersionId(id.to_string()),
        text: id.to_string(),
        weight,
        mandatory,
        visibility,
        options,
    }
}

pub(super) fn aspect(
    id: &str,
    weight: f64,
    visibility: Option<VisibilityRule>,
    questions: Vec<QuestionVersion>,
) -> TemplateAspect {
    TemplateAspect {
        weight,
        aspect: AspectVersion {
            id: AspectVersionId(id.to_string()),
            name: id.to_string(),
            visibility,
            questions,
        },
    }
}

pub(super) fn template_of(aspects: Vec<TemplateAspect>) -> TemplateVersion {
    TemplateVersion {
        id: TemplateVersionId("tpl-corp-v3".to_string()),
        name: "Corporate monitoring v3".to_string(),
        aspects,
    }
}

/// Default two-aspect template used by the workflow tests: financial health
/// (60%) with a mandatory liquidity question, management (40%) with a
/// mandatory governance question.
pub(super) fn template() -> TemplateVersion {
    template_of(vec![
        aspect(
            "asp-financial",
            60.0,
            None,
            vec![
                question(
                    "q-liquidity",
                    50.0,
                    true,
                    None,
                    vec![
                        option("opt-liq-good", 100.0),
                        option("opt-liq-weak", 40.0),
                        option("opt-liq-breach", -20.0),
                    ],
                ),
                question(
                    "q-leverage",
                    50.0,
                    false,
                    None,
                    vec![option("opt-lev-low", 100.0), option("opt-lev-high", 40.0)],
                ),
            ],
        ),
        aspect(
            "asp-management",
            40.0,
            None,
            vec![question(
                "q-governance",
                100.0,
                true,
                None,
                vec![option("opt-gov-sound", 100.0), option("opt-gov-poor", 0.0)],
            )],
        ),
    ])
}

pub(super) fn answer(question: &str, option: &str) -> Answer {
    Answer {
        question: QuestionVersionId(question.to_string()),
        option: OptionId(option.to_string()),
        notes: None,
    }
}

/// Best answer everywhere: both aspects score 100, overall 100, SAFE.
pub(super) fn safe_answers() -> Vec<Answer> {
    vec![
        answer("q-liquidity", "opt-liq-good"),
        answer("q-leverage", "opt-lev-low"),
        answer("q-governance", "opt-gov-sound"),
    ]
}

/// Distressed answer set: financial scores 10, management 0, overall 6,
/// WATCHLIST on every rule.
pub(super) fn watchlist_answers() -> Vec<Answer> {
    vec![
        answer("q-liquidity", "opt-liq-breach"),
        answer("q-leverage", "opt-lev-high"),
        answer("q-governance", "opt-gov-poor"),
    ]
}

pub(super) fn detail_rule(field: &str, operator: RuleOperator, value: ContextValue) -> VisibilityRule {
    VisibilityRule {
        source: RuleSource::BorrowerDetail,
        field: field.to_string(),
        operator,
        value: RuleValue::One(value),
    }
}

pub(super) fn facility_rule(
    field: &str,
    operator: RuleOperator,
    value: ContextValue,
) -> VisibilityRule {
    VisibilityRule {
        source: RuleSource::Facility,
        field: field.to_string(),
        operator,
        value: RuleValue::One(value),
    }
}

/// Rule that never matches the empty context; hides whatever carries it.
pub(super) fn never_rule() -> VisibilityRule {
    detail_rule(
        "no-such-field",
        RuleOperator::Eq,
        ContextValue::from("unreachable"),
    )
}

/// Audit sink that always fails, for verifying best-effort semantics.
#[derive(Default, Clone)]
pub(super) struct FailingAuditSink;

impl AuditSink for FailingAuditSink {
    fn record(&self, _event: AuditEvent) -> Result<(), AuditError> {
        Err(AuditError::Transport("audit store offline".to_string()))
    }
}
