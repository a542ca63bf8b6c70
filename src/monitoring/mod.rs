//! Borrower monitoring core: questionnaire scoring, classification, and the
//! three-level review workflow over one shared summary record per report.

pub mod access;
pub mod approvals;
pub mod audit;
pub mod context;
pub mod domain;
pub mod repository;
pub mod scoring;
pub mod store;
pub mod visibility;

mod service;
mod watchlist;

#[cfg(test)]
mod tests;

pub use access::RoleProvider;
pub use approvals::{
    ApprovalDecision, ApprovalError, DecisionPayload, ValidationError, DEFAULT_REJECTION_REASON,
};
pub use audit::{AuditAction, AuditError, AuditEvent, AuditSink};
pub use context::{BorrowerContext, ContextProvider, ContextValue};
pub use domain::{
    ActorId, Answer, Approval, ApprovalLevel, ApprovalStatus, AspectVersion, AspectVersionId,
    BorrowerId, Classification, ClassificationInput, OptionId, PeriodId, QuestionOption,
    QuestionVersion, QuestionVersionId, Report, ReportAspect, ReportId, ReportStatus,
    ReportSummary, ReviewerRole, TemplateAspect, TemplateVersion, TemplateVersionId,
    WatchlistEntry, WatchlistStatus,
};
pub use repository::{
    ApprovalView, ClassificationOverride, DecisionWrite, ReportRecord, ReportRepository,
    ReportStatusView, RepositoryError, SummaryPatch, WatchlistRepository,
};
pub use scoring::{ClassificationConfig, ClassificationEngine, ScoringOutcome};
pub use service::{ReportReviewService, ReviewServiceError};
pub use store::{MemoryAuditLog, MemoryStore, StaticContexts, StaticRoles};
pub use visibility::{RuleOperator, RuleSource, RuleValue, VisibilityRule};
