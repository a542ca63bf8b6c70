use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::access::RoleProvider;
use super::approvals::{
    self, ApprovalDecision, ApprovalError, DecisionPayload, ValidationError,
};
use super::audit::{AuditAction, AuditEvent, AuditSink};
use super::context::ContextProvider;
use super::domain::{
    ActorId, Answer, ApprovalLevel, Classification, Report, ReportId, ReportStatus, TemplateVersion,
};
use super::repository::{
    ClassificationOverride, DecisionWrite, ReportRecord, ReportRepository, RepositoryError,
    SummaryPatch, WatchlistRepository,
};
use super::scoring::{ClassificationConfig, ClassificationEngine};
use super::watchlist;

/// Facade composing the scoring engine, the approval state machine, and the
/// collaborator seams (storage, borrower context, roles, audit).
pub struct ReportReviewService<R, C, P, A> {
    repository: Arc<R>,
    contexts: Arc<C>,
    roles: Arc<P>,
    audit: Arc<A>,
    engine: ClassificationEngine,
}

impl<R, C, P, A> ReportReviewService<R, C, P, A>
where
    R: ReportRepository + WatchlistRepository + 'static,
    C: ContextProvider + 'static,
    P: RoleProvider + 'static,
    A: AuditSink + 'static,
{
    pub fn new(
        repository: Arc<R>,
        contexts: Arc<C>,
        roles: Arc<P>,
        audit: Arc<A>,
        config: ClassificationConfig,
    ) -> Self {
        Self {
            repository,
            contexts,
            roles,
            audit,
            engine: ClassificationEngine::new(config),
        }
    }

    /// Register a freshly filed report: status SUBMITTED, three PENDING
    /// approvals, no derived state yet.
    pub fn submit(
        &self,
        mut report: Report,
        template: TemplateVersion,
        answers: Vec<Answer>,
    ) -> Result<ReportRecord, ReviewServiceError> {
        report.status = ReportStatus::Submitted;
        report.rejection_reason = None;

        let record = ReportRecord {
            report,
            template,
            answers,
            approvals: approvals::pending_chain(),
            summary: None,
            aspects: Vec::new(),
        };

        let stored = self.repository.insert(record)?;
        debug!(report = %stored.report.id.0, "report submitted");
        Ok(stored)
    }

    pub fn get(&self, id: &ReportId) -> Result<ReportRecord, ReviewServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Run scoring and persist the result: replace the per-aspect rows,
    /// upsert the summary, reconcile the borrower's watchlist membership,
    /// and record the audit event. Safe to re-run; unchanged inputs yield
    /// identical rows and no duplicate watchlist entry.
    pub fn calculate_and_store_summary(
        &self,
        id: &ReportId,
        actor: Option<&ActorId>,
    ) -> Result<ReportRecord, ReviewServiceError> {
        let record = self.get(id)?;
        let context = self.contexts.context_for(&record.report.borrower);

        let outcome = self
            .engine
            .evaluate(&record.template, &record.answers, &context);
        let previous = record.classification();

        let stored = self.repository.store_calculation(
            id,
            outcome.aspects.clone(),
            outcome.final_classification,
            context.collectibility(),
        )?;

        watchlist::sync(
            &*self.repository,
            &stored.report.borrower,
            id,
            outcome.final_classification,
            Utc::now(),
        )?;

        self.record_audit(AuditEvent {
            actor: actor.cloned(),
            action: AuditAction::Recalculated,
            subject_type: "report_summary",
            subject_id: id.0.clone(),
            report: id.clone(),
            level: None,
            before: previous.map(|classification| classification.label().to_string()),
            after: Some(outcome.final_classification.label().to_string()),
            metadata: json!({
                "overall_score": outcome.overall_score,
                "classification": outcome.final_classification.label(),
            }),
        });

        Ok(stored)
    }

    /// Decide one approval level. Preconditions are checked on a snapshot,
    /// then the whole transition is applied as a single conditional write;
    /// a write that finds the approval no longer PENDING surfaces as
    /// already-decided.
    pub fn process_approval(
        &self,
        id: &ReportId,
        level: ApprovalLevel,
        actor: &ActorId,
        decision: ApprovalDecision,
        payload: DecisionPayload,
    ) -> Result<ReportRecord, ReviewServiceError> {
        let override_classification = payload.validate()?;

        let record = self.get(id)?;
        approvals::check_preconditions(
            &record.report,
            &record.approvals,
            level,
            actor,
            &*self.roles,
        )?;

        let previous_status = record.report.status;
        let report_status = approvals::next_status(level, decision);
        let rejection_reason = matches!(decision, ApprovalDecision::Rejected)
            .then(|| payload.rejection_reason());

        let write = DecisionWrite {
            level,
            status: decision.as_status(),
            reviewer: actor.clone(),
            notes: payload.notes.clone(),
            decided_at: Utc::now(),
            report_status,
            rejection_reason,
            summary: self.summary_patch(level, decision, actor, &payload, override_classification),
        };

        let updated = match self.repository.apply_decision(id, write) {
            Ok(record) => record,
            Err(RepositoryError::Conflict) => {
                return Err(ApprovalError::AlreadyDecided { level }.into())
            }
            Err(error) => return Err(error.into()),
        };

        let action = match decision {
            ApprovalDecision::Approved => AuditAction::Approved,
            ApprovalDecision::Rejected => AuditAction::Rejected,
        };
        self.record_audit(AuditEvent {
            actor: Some(actor.clone()),
            action,
            subject_type: "approval",
            subject_id: level.label().to_string(),
            report: id.clone(),
            level: Some(level),
            before: Some(previous_status.label().to_string()),
            after: Some(report_status.label().to_string()),
            metadata: serde_json::to_value(&payload).unwrap_or(Value::Null),
        });

        Ok(updated)
    }

    /// Install a fresh approval chain, discarding any existing rows. Used
    /// at initial submission and at resubmission after rejection.
    pub fn create_pending_approvals(
        &self,
        id: &ReportId,
    ) -> Result<ReportRecord, ReviewServiceError> {
        let record = self
            .repository
            .replace_approvals(id, approvals::pending_chain())?;
        Ok(record)
    }

    pub fn reset_approvals(&self, id: &ReportId) -> Result<ReportRecord, ReviewServiceError> {
        self.create_pending_approvals(id)
    }

    /// The classification override is honored only on a LEVEL_1 approval;
    /// business/reviewer notes merge into the summary at any level.
    fn summary_patch(
        &self,
        level: ApprovalLevel,
        decision: ApprovalDecision,
        actor: &ActorId,
        payload: &DecisionPayload,
        override_classification: Option<Classification>,
    ) -> SummaryPatch {
        let override_classification = override_classification
            .filter(|_| level == ApprovalLevel::Level1)
            .filter(|_| decision == ApprovalDecision::Approved);

        SummaryPatch {
            override_classification: override_classification.map(|classification| {
                ClassificationOverride {
                    classification,
                    by: actor.clone(),
                    // validate() guarantees the reason accompanies the value
                    reason: payload.override_reason.clone().unwrap_or_default(),
                }
            }),
            business_notes: payload.business_notes.clone(),
            reviewer_notes: payload.reviewer_notes.clone(),
        }
    }

    fn record_audit(&self, event: AuditEvent) {
        if let Err(error) = self.audit.record(event) {
            warn!(%error, "audit sink rejected event; continuing");
        }
    }
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Approval(#[from] ApprovalError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
