use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ActorId, Answer, Approval, ApprovalLevel, ApprovalStatus, BorrowerId, Classification, Report,
    ReportAspect, ReportId, ReportStatus, ReportSummary, TemplateVersion, WatchlistEntry,
    WatchlistStatus,
};

/// Repository aggregate: the report plus everything it owns, including the
/// template version snapshot it was submitted against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report: Report,
    pub template: TemplateVersion,
    pub answers: Vec<Answer>,
    pub approvals: Vec<Approval>,
    pub summary: Option<ReportSummary>,
    pub aspects: Vec<ReportAspect>,
}

impl ReportRecord {
    pub fn approval(&self, level: ApprovalLevel) -> Option<&Approval> {
        self.approvals.iter().find(|approval| approval.level == level)
    }

    pub fn classification(&self) -> Option<Classification> {
        self.summary
            .as_ref()
            .and_then(|summary| summary.final_classification)
    }

    pub fn status_view(&self) -> ReportStatusView {
        ReportStatusView {
            report: self.report.id.clone(),
            status: self.report.status.label(),
            classification: self.classification().map(Classification::label),
            is_override: self
                .summary
                .as_ref()
                .map(|summary| summary.is_override)
                .unwrap_or(false),
            approvals: self
                .approvals
                .iter()
                .map(|approval| ApprovalView {
                    level: approval.level.label(),
                    status: approval.status.label(),
                    reviewer: approval.reviewer.clone(),
                })
                .collect(),
        }
    }
}

/// Sanitized representation of a report's review progress.
#[derive(Debug, Clone, Serialize)]
pub struct ReportStatusView {
    pub report: ReportId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<&'static str>,
    pub is_override: bool,
    pub approvals: Vec<ApprovalView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalView {
    pub level: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<ActorId>,
}

/// Everything a single approval decision writes, applied by the repository
/// in one atomic step.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionWrite {
    pub level: ApprovalLevel,
    pub status: ApprovalStatus,
    pub reviewer: ActorId,
    pub notes: Option<String>,
    pub decided_at: DateTime<Utc>,
    pub report_status: ReportStatus,
    pub rejection_reason: Option<String>,
    pub summary: SummaryPatch,
}

/// Summary fields touched by a decision. Empty patches leave the summary
/// alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryPatch {
    pub override_classification: Option<ClassificationOverride>,
    pub business_notes: Option<String>,
    pub reviewer_notes: Option<String>,
}

impl SummaryPatch {
    pub fn is_empty(&self) -> bool {
        self.override_classification.is_none()
            && self.business_notes.is_none()
            && self.reviewer_notes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOverride {
    pub classification: Classification,
    pub by: ActorId,
    pub reason: String,
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or was concurrently decided")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for report aggregates.
///
/// `apply_decision` and `store_calculation` are the transaction boundaries:
/// an implementation must apply each call atomically and roll back all of
/// its writes together on failure. `apply_decision` must re-verify that the
/// targeted approval is still PENDING inside that boundary (conditional
/// update / row lock) and report a failed check as [`RepositoryError::Conflict`]
/// rather than trusting the caller's earlier read.
pub trait ReportRepository: Send + Sync {
    fn insert(&self, record: ReportRecord) -> Result<ReportRecord, RepositoryError>;

    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError>;

    /// Delete any existing approval rows and install the given chain.
    fn replace_approvals(
        &self,
        id: &ReportId,
        approvals: Vec<Approval>,
    ) -> Result<ReportRecord, RepositoryError>;

    /// Replace the per-aspect rows wholesale and upsert the summary's
    /// computed fields, preserving override flags and notes on an existing
    /// summary.
    fn store_calculation(
        &self,
        id: &ReportId,
        aspects: Vec<ReportAspect>,
        final_classification: Classification,
        indicative_collectibility: i16,
    ) -> Result<ReportRecord, RepositoryError>;

    /// Atomically decide one approval and advance the report, per the
    /// trait-level contract.
    fn apply_decision(
        &self,
        id: &ReportId,
        write: DecisionWrite,
    ) -> Result<ReportRecord, RepositoryError>;
}

/// Storage abstraction for borrower watchlist membership.
pub trait WatchlistRepository: Send + Sync {
    /// The borrower's ACTIVE entry, if one exists. At most one may be
    /// active at a time.
    fn active_for(&self, borrower: &BorrowerId) -> Result<Option<WatchlistEntry>, RepositoryError>;

    /// Insert a new ACTIVE entry; fails with [`RepositoryError::Conflict`]
    /// if the borrower already has one.
    fn open_entry(&self, entry: WatchlistEntry) -> Result<WatchlistEntry, RepositoryError>;

    /// Close the borrower's ACTIVE entry for the given report. Returns
    /// whether an entry changed.
    fn close_entry(
        &self,
        borrower: &BorrowerId,
        report: &ReportId,
        status: WatchlistStatus,
        closed_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;
}
