use std::sync::Arc;

use super::common::*;
use crate::monitoring::approvals::{ApprovalDecision, ApprovalError, DecisionPayload};
use crate::monitoring::audit::AuditAction;
use crate::monitoring::context::{BorrowerContext, ContextValue};
use crate::monitoring::domain::{
    ApprovalLevel, ApprovalStatus, Classification, ClassificationInput, ReportId, ReportStatus,
    WatchlistStatus,
};
use crate::monitoring::repository::{ReportRepository, RepositoryError};
use crate::monitoring::scoring::ClassificationConfig;
use crate::monitoring::service::{ReportReviewService, ReviewServiceError};
use crate::monitoring::store::{MemoryStore, StaticContexts};
use crate::monitoring::visibility::RuleOperator;

fn submitted(harness: &Harness, id: &str) -> ReportId {
    let record = harness
        .service
        .submit(report(id), template(), safe_answers())
        .expect("submission succeeds");
    record.report.id
}

#[test]
fn submit_installs_three_pending_approvals() {
    let harness = harness(BorrowerContext::default());
    let mut filed = report("rep-1");
    filed.status = ReportStatus::Done; // callers cannot smuggle a status in

    let record = harness
        .service
        .submit(filed, template(), safe_answers())
        .expect("submission succeeds");

    assert_eq!(record.report.status, ReportStatus::Submitted);
    assert_eq!(record.approvals.len(), 3);
    assert!(record
        .approvals
        .iter()
        .all(|approval| approval.status == ApprovalStatus::Pending));
    assert!(record.summary.is_none());
    assert!(record.aspects.is_empty());
}

#[test]
fn get_propagates_not_found() {
    let harness = harness(BorrowerContext::default());
    match harness.service.get(&ReportId("missing".to_string())) {
        Err(ReviewServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn recalculation_persists_summary_and_aspects() {
    let harness = harness(context_with(&[("collectibility", ContextValue::from(2.0))]));
    let id = submitted(&harness, "rep-1");

    let record = harness
        .service
        .calculate_and_store_summary(&id, Some(&analyst()))
        .expect("recalculation succeeds");

    assert_eq!(record.aspects.len(), 2);
    let summary = record.summary.expect("summary created");
    assert_eq!(summary.final_classification, Some(Classification::Safe));
    assert_eq!(summary.indicative_collectibility, 2);
    assert!(!summary.is_override);
}

#[test]
fn recalculation_is_idempotent() {
    let harness = harness(BorrowerContext::default());
    let id = harness
        .service
        .submit(report("rep-1"), template(), watchlist_answers())
        .expect("submission succeeds")
        .report
        .id;

    let first = harness
        .service
        .calculate_and_store_summary(&id, None)
        .expect("first run");
    let second = harness
        .service
        .calculate_and_store_summary(&id, None)
        .expect("second run");

    assert_eq!(first.aspects, second.aspects);
    assert_eq!(first.summary, second.summary);

    let entries = harness.store.watchlist_entries();
    assert_eq!(entries.len(), 1, "no duplicate watchlist entry");
    assert_eq!(entries[0].status, WatchlistStatus::Active);
    assert_eq!(entries[0].report, id);
}

#[test]
fn safe_recalculation_resolves_watchlist_opened_by_same_report() {
    // Governance question only visible while the borrower is flagged
    // distressed; once the flag clears, compensation lifts the score back
    // to SAFE.
    let template = template_of(vec![aspect(
        "asp-mgmt",
        100.0,
        None,
        vec![question(
            "q-governance",
            100.0,
            true,
            Some(detail_rule(
                "distressed",
                RuleOperator::Eq,
                ContextValue::from(true),
            )),
            vec![option("opt-sound", 100.0), option("opt-poor", 0.0)],
        )],
    )]);
    let answers = vec![answer("q-governance", "opt-poor")];

    let store = MemoryStore::default();
    let distressed = harness_with_store(
        store.clone(),
        context_with(&[("distressed", ContextValue::from(true))]),
    );
    let id = distressed
        .service
        .submit(report("rep-1"), template.clone(), answers.clone())
        .expect("submission succeeds")
        .report
        .id;

    let record = distressed
        .service
        .calculate_and_store_summary(&id, None)
        .expect("distressed run");
    assert_eq!(record.classification(), Some(Classification::Watchlist));
    assert_eq!(store.watchlist_entries().len(), 1);

    let recovered = harness_with_store(
        store.clone(),
        context_with(&[("distressed", ContextValue::from(false))]),
    );
    let record = recovered
        .service
        .calculate_and_store_summary(&id, None)
        .expect("recovered run");
    assert_eq!(record.classification(), Some(Classification::Safe));

    let entries = store.watchlist_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, WatchlistStatus::Resolved);
    assert!(entries[0].closed_at.is_some());
}

#[test]
fn level1_approval_with_override_rewrites_summary() {
    let harness = harness(BorrowerContext::default());
    let id = submitted(&harness, "rep-1");
    harness
        .service
        .calculate_and_store_summary(&id, None)
        .expect("summary in place");

    let payload = DecisionPayload {
        classification: Some(ClassificationInput::Name("WATCHLIST".to_string())),
        override_reason: Some("pending litigation not captured by template".to_string()),
        ..DecisionPayload::default()
    };
    let record = harness
        .service
        .process_approval(&id, ApprovalLevel::Level1, &analyst(), ApprovalDecision::Approved, payload)
        .expect("level 1 approval");

    assert_eq!(record.report.status, ReportStatus::Reviewed);
    let summary = record.summary.expect("summary present");
    assert_eq!(summary.final_classification, Some(Classification::Watchlist));
    assert!(summary.is_override);
    assert_eq!(summary.override_by, Some(analyst()));
    assert_eq!(
        summary.override_reason.as_deref(),
        Some("pending litigation not captured by template")
    );
}

#[test]
fn override_is_ignored_outside_level1() {
    let harness = harness(BorrowerContext::default());
    let id = submitted(&harness, "rep-1");
    harness
        .service
        .calculate_and_store_summary(&id, None)
        .expect("summary in place");
    harness
        .service
        .process_approval(
            &id,
            ApprovalLevel::Level1,
            &analyst(),
            ApprovalDecision::Approved,
            DecisionPayload::default(),
        )
        .expect("level 1");

    let payload = DecisionPayload {
        classification: Some(ClassificationInput::Code(2)),
        override_reason: Some("should not apply at this level".to_string()),
        ..DecisionPayload::default()
    };
    let record = harness
        .service
        .process_approval(
            &id,
            ApprovalLevel::Level2,
            &business_head(),
            ApprovalDecision::Approved,
            payload,
        )
        .expect("level 2");

    let summary = record.summary.expect("summary present");
    assert_eq!(summary.final_classification, Some(Classification::Safe));
    assert!(!summary.is_override);
}

#[test]
fn business_and_reviewer_notes_merge_into_summary() {
    let harness = harness(BorrowerContext::default());
    let id = submitted(&harness, "rep-1");

    let payload = DecisionPayload {
        business_notes: Some("expansion plan on track".to_string()),
        reviewer_notes: Some("follow up on receivables aging".to_string()),
        ..DecisionPayload::default()
    };
    let record = harness
        .service
        .process_approval(&id, ApprovalLevel::Level1, &analyst(), ApprovalDecision::Approved, payload)
        .expect("level 1");

    let summary = record.summary.expect("summary created on workflow touch");
    assert_eq!(
        summary.business_notes.as_deref(),
        Some("expansion plan on track")
    );
    assert_eq!(
        summary.reviewer_notes.as_deref(),
        Some("follow up on receivables aging")
    );
    assert_eq!(summary.final_classification, None);
}

#[test]
fn wrong_role_fails_and_leaves_records_unchanged() {
    let harness = harness(BorrowerContext::default());
    let id = submitted(&harness, "rep-1");
    let before = harness.service.get(&id).expect("fetch before");

    let result = harness.service.process_approval(
        &id,
        ApprovalLevel::Level1,
        &outsider(),
        ApprovalDecision::Approved,
        DecisionPayload::default(),
    );
    assert!(matches!(
        result,
        Err(ReviewServiceError::Approval(ApprovalError::RoleMismatch { .. }))
    ));

    let after = harness.service.get(&id).expect("fetch after");
    assert_eq!(before, after);
    assert!(harness.audit.events().is_empty());
}

#[test]
fn out_of_order_level2_is_an_invalid_state_failure() {
    let harness = harness(BorrowerContext::default());
    let id = submitted(&harness, "rep-1");

    let result = harness.service.process_approval(
        &id,
        ApprovalLevel::Level2,
        &business_head(),
        ApprovalDecision::Approved,
        DecisionPayload::default(),
    );
    assert!(matches!(
        result,
        Err(ReviewServiceError::Approval(
            ApprovalError::InvalidReportStatus { .. }
        ))
    ));
}

#[test]
fn concurrent_decision_loses_the_conditional_update() {
    let harness = harness(BorrowerContext::default());
    let id = submitted(&harness, "rep-1");
    harness
        .service
        .process_approval(
            &id,
            ApprovalLevel::Level1,
            &analyst(),
            ApprovalDecision::Approved,
            DecisionPayload::default(),
        )
        .expect("first decision");

    // Replay the same level directly against the repository, as a racing
    // writer that passed its precondition read would.
    let write = crate::monitoring::repository::DecisionWrite {
        level: ApprovalLevel::Level1,
        status: ApprovalStatus::Approved,
        reviewer: analyst(),
        notes: None,
        decided_at: chrono::Utc::now(),
        report_status: ReportStatus::Reviewed,
        rejection_reason: None,
        summary: Default::default(),
    };
    assert!(matches!(
        harness.store.apply_decision(&id, write),
        Err(RepositoryError::Conflict)
    ));
}

#[test]
fn reset_approvals_reinstalls_a_pending_chain() {
    let harness = harness(BorrowerContext::default());
    let id = submitted(&harness, "rep-1");
    harness
        .service
        .process_approval(
            &id,
            ApprovalLevel::Level1,
            &analyst(),
            ApprovalDecision::Approved,
            DecisionPayload::default(),
        )
        .expect("level 1");

    let record = harness.service.reset_approvals(&id).expect("reset");
    assert_eq!(record.approvals.len(), 3);
    assert!(record
        .approvals
        .iter()
        .all(|approval| approval.status == ApprovalStatus::Pending && approval.reviewer.is_none()));
}

#[test]
fn audit_failure_does_not_abort_the_operation() {
    let store = MemoryStore::default();
    let service = ReportReviewService::new(
        Arc::new(store),
        Arc::new(StaticContexts::default()),
        Arc::new(reviewer_roles()),
        Arc::new(FailingAuditSink),
        ClassificationConfig::default(),
    );

    let id = service
        .submit(report("rep-1"), template(), safe_answers())
        .expect("submission succeeds")
        .report
        .id;

    let record = service
        .calculate_and_store_summary(&id, None)
        .expect("recalculation survives audit outage");
    assert_eq!(record.classification(), Some(Classification::Safe));

    service
        .process_approval(
            &id,
            ApprovalLevel::Level1,
            &analyst(),
            ApprovalDecision::Approved,
            DecisionPayload::default(),
        )
        .expect("approval survives audit outage");
}

#[test]
fn audit_events_capture_recalculation_and_decisions() {
    let harness = harness(BorrowerContext::default());
    let id = submitted(&harness, "rep-1");

    harness
        .service
        .calculate_and_store_summary(&id, Some(&analyst()))
        .expect("recalculation");
    harness
        .service
        .process_approval(
            &id,
            ApprovalLevel::Level1,
            &analyst(),
            ApprovalDecision::Approved,
            DecisionPayload::default(),
        )
        .expect("approval");

    let events = harness.audit.events();
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].action, AuditAction::Recalculated);
    assert_eq!(events[0].metadata["classification"], "SAFE");
    assert_eq!(events[0].metadata["overall_score"], 100.0);
    assert_eq!(events[0].level, None);

    assert_eq!(events[1].action, AuditAction::Approved);
    assert_eq!(events[1].level, Some(ApprovalLevel::Level1));
    assert_eq!(events[1].before.as_deref(), Some("SUBMITTED"));
    assert_eq!(events[1].after.as_deref(), Some("REVIEWED"));
}

#[test]
fn status_view_reports_review_progress() {
    let harness = harness(BorrowerContext::default());
    let id = submitted(&harness, "rep-1");
    harness
        .service
        .calculate_and_store_summary(&id, None)
        .expect("recalculation");

    let view = harness.service.get(&id).expect("fetch").status_view();
    assert_eq!(view.status, "SUBMITTED");
    assert_eq!(view.classification, Some("SAFE"));
    assert!(!view.is_override);
    assert_eq!(view.approvals.len(), 3);
    assert_eq!(view.approvals[0].level, "LEVEL_1");
    assert_eq!(view.approvals[0].status, "PENDING");
}

fn harness_with_store(store: MemoryStore, context: BorrowerContext) -> Harness {
    let audit = crate::monitoring::store::MemoryAuditLog::default();
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
