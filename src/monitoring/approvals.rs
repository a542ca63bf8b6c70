//! Preconditions and transition table for the sequential three-level
//! approval workflow, plus the decision payload and its boundary
//! validation. All checks here are pure; the atomic write happens in the
//! repository.

use serde::{Deserialize, Serialize};

use super::access::RoleProvider;
use super::domain::{
    ActorId, Approval, ApprovalLevel, ApprovalStatus, Classification, ClassificationInput, Report,
    ReportStatus, ReviewerRole,
};

/// Stored as `rejection_reason` when a rejecting reviewer supplies no notes.
pub const DEFAULT_REJECTION_REASON: &str = "Rejected without additional notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

impl ApprovalDecision {
    pub const fn as_status(self) -> ApprovalStatus {
        match self {
            ApprovalDecision::Approved => ApprovalStatus::Approved,
            ApprovalDecision::Rejected => ApprovalStatus::Rejected,
        }
    }

    /// Boundary parser for raw decision strings.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "APPROVED" => Ok(ApprovalDecision::Approved),
            "REJECTED" => Ok(ApprovalDecision::Rejected),
            _ => Err(ValidationError::UnknownDecision(raw.to_string())),
        }
    }
}

impl ApprovalLevel {
    /// Boundary parser for raw level strings.
    pub fn parse(raw: &str) -> Result<Self, ApprovalError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "LEVEL_1" | "LEVEL1" | "1" => Ok(ApprovalLevel::Level1),
            "LEVEL_2" | "LEVEL2" | "2" => Ok(ApprovalLevel::Level2),
            "LEVEL_3" | "LEVEL3" | "3" => Ok(ApprovalLevel::Level3),
            _ => Err(ApprovalError::UnknownLevel(raw.to_string())),
        }
    }
}

/// Free-form decision input supplied by the reviewing user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionPayload {
    pub notes: Option<String>,
    /// Optional classification override; only honored on a LEVEL_1 approval.
    pub classification: Option<ClassificationInput>,
    pub override_reason: Option<String>,
    pub business_notes: Option<String>,
    pub reviewer_notes: Option<String>,
}

impl DecisionPayload {
    /// Boundary validation: whenever a classification value is supplied it
    /// must resolve, and an override reason must accompany it. Returns the
    /// resolved override, if any.
    pub fn validate(&self) -> Result<Option<Classification>, ValidationError> {
        let input = match &self.classification {
            None => return Ok(None),
            Some(input) => input,
        };

        let classification = input
            .resolve()
            .ok_or_else(|| ValidationError::UnknownClassification(format!("{input:?}")))?;

        match self.override_reason.as_deref() {
            Some(reason) if !reason.trim().is_empty() => Ok(Some(classification)),
            _ => Err(ValidationError::OverrideReasonRequired),
        }
    }

    /// Rejection reason persisted on the report: the reviewer's notes, or
    /// the generic message when empty.
    pub fn rejection_reason(&self) -> String {
        match self.notes.as_deref() {
            Some(notes) if !notes.trim().is_empty() => notes.to_string(),
            _ => DEFAULT_REJECTION_REASON.to_string(),
        }
    }
}

/// Workflow failures; each rejects the whole operation with no partial
/// state committed.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("acting user lacks the {role} role required for {level}")]
    RoleMismatch {
        level: ApprovalLevel,
        role: ReviewerRole,
    },
    #[error("report is {actual}, expected {expected} before a {level} decision")]
    InvalidReportStatus {
        level: ApprovalLevel,
        expected: ReportStatus,
        actual: ReportStatus,
    },
    #[error("{level} requires the {prior} approval to be approved first")]
    PriorLevelPending {
        level: ApprovalLevel,
        prior: ApprovalLevel,
    },
    #[error("the {level} approval has already been decided")]
    AlreadyDecided { level: ApprovalLevel },
    #[error("unknown approval level '{0}'")]
    UnknownLevel(String),
}

/// Payload validation failures raised before the workflow mutates anything.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("override_reason is required when a classification override is supplied")]
    OverrideReasonRequired,
    #[error("unrecognized classification value {0}")]
    UnknownClassification(String),
    #[error("unknown approval decision '{0}'")]
    UnknownDecision(String),
}

/// Check every per-level precondition against a consistent snapshot of the
/// report and its approval chain, in the order the workflow defines: role,
/// report status, prior level, idempotency.
pub(crate) fn check_preconditions<P>(
    report: &Report,
    approvals: &[Approval],
    level: ApprovalLevel,
    actor: &ActorId,
    roles: &P,
) -> Result<(), ApprovalError>
where
    P: RoleProvider + ?Sized,
{
    let role = level.required_role();
    if !roles.actor_has_role(actor, role) {
        return Err(ApprovalError::RoleMismatch { level, role });
    }

    let expected = level.expected_status();
    if report.status != expected {
        return Err(ApprovalError::InvalidReportStatus {
            level,
            expected,
            actual: report.status,
        });
    }

    if let Some(prior) = level.prior() {
        let prior_approved = approvals
            .iter()
            .any(|approval| approval.level == prior && approval.status == ApprovalStatus::Approved);
        if !prior_approved {
            return Err(ApprovalError::PriorLevelPending { level, prior });
        }
    }

    let pending = approvals
        .iter()
        .any(|approval| approval.level == level && approval.status == ApprovalStatus::Pending);
    if !pending {
        return Err(ApprovalError::AlreadyDecided { level });
    }

    Ok(())
}

/// Report status after a decision at the given level.
pub(crate) fn next_status(level: ApprovalLevel, decision: ApprovalDecision) -> ReportStatus {
    match decision {
        ApprovalDecision::Approved => level.approved_status(),
        ApprovalDecision::Rejected => ReportStatus::Rejected,
    }
}

/// Fresh approval chain: one PENDING row per level, in level order.
pub(crate) fn pending_chain() -> Vec<Approval> {
    ApprovalLevel::ALL.into_iter().map(Approval::pending).collect()
}
