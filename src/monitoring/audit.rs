use serde::Serialize;
use serde_json::Value;

use super::domain::{ActorId, ApprovalLevel, ReportId};

/// Action recorded against the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Recalculated,
    Approved,
    Rejected,
}

impl AuditAction {
    pub const fn label(self) -> &'static str {
        match self {
            AuditAction::Recalculated => "recalculated",
            AuditAction::Approved => "approved",
            AuditAction::Rejected => "rejected",
        }
    }
}

/// One audit record handed to the external sink. `before`/`after` carry the
/// human-readable state labels around the mutation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub actor: Option<ActorId>,
    pub action: AuditAction,
    pub subject_type: &'static str,
    pub subject_id: String,
    pub report: ReportId,
    pub level: Option<ApprovalLevel>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub metadata: Value,
}

/// Outbound audit hook. Recording is best-effort observability: the service
/// logs failures and continues, and a sink error never rolls back the
/// primary operation.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit transport unavailable: {0}")]
    Transport(String),
}
