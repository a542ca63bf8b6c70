use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::visibility::VisibilityRule;

/// Identifier wrapper for monitoring reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

/// Identifier wrapper for corporate borrowers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BorrowerId(pub String);

/// Identifier wrapper for acting users (creators and reviewers).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// Identifier wrapper for reporting periods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateVersionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AspectVersionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionVersionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionId(pub String);

/// Lifecycle state of a monitoring report. Advances forward only; `Rejected`
/// is terminal and reachable from every pre-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Submitted,
    Reviewed,
    Approved,
    Done,
    Rejected,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Submitted => "SUBMITTED",
            ReportStatus::Reviewed => "REVIEWED",
            ReportStatus::Approved => "APPROVED",
            ReportStatus::Done => "DONE",
            ReportStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// SAFE/WATCHLIST verdict produced per aspect and for the report overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Safe,
    Watchlist,
}

impl Classification {
    pub const fn code(self) -> i16 {
        match self {
            Classification::Safe => 1,
            Classification::Watchlist => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Classification::Safe => "SAFE",
            Classification::Watchlist => "WATCHLIST",
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(Classification::Safe),
            2 => Some(Classification::Watchlist),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Some(Classification::Safe),
            "WATCHLIST" => Some(Classification::Watchlist),
            _ => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Loosely-typed classification carried in approval payloads. Accepts a raw
/// code, a symbolic name, or an already-typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassificationInput {
    Value(Classification),
    Code(i16),
    Name(String),
}

impl ClassificationInput {
    pub fn resolve(&self) -> Option<Classification> {
        match self {
            ClassificationInput::Value(classification) => Some(*classification),
            ClassificationInput::Code(code) => Classification::from_code(*code),
            ClassificationInput::Name(name) => Classification::from_name(name),
        }
    }
}

impl From<Classification> for ClassificationInput {
    fn from(value: Classification) -> Self {
        ClassificationInput::Value(value)
    }
}

/// Reviewer roles gating the three approval levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewerRole {
    RiskAnalyst,
    BusinessDepartmentHead,
    RiskDivisionHead,
}

impl ReviewerRole {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewerRole::RiskAnalyst => "risk-analyst",
            ReviewerRole::BusinessDepartmentHead => "business-department-head",
            ReviewerRole::RiskDivisionHead => "risk-division-head",
        }
    }
}

impl fmt::Display for ReviewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the three sequential approval slots attached to every submitted
/// report. The level carries the whole transition table: which role may act,
/// which report status must hold beforehand, and which status an approval
/// advances the report to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalLevel {
    #[serde(rename = "LEVEL_1")]
    Level1,
    #[serde(rename = "LEVEL_2")]
    Level2,
    #[serde(rename = "LEVEL_3")]
    Level3,
}

impl ApprovalLevel {
    pub const ALL: [ApprovalLevel; 3] =
        [ApprovalLevel::Level1, ApprovalLevel::Level2, ApprovalLevel::Level3];

    pub const fn label(self) -> &'static str {
        match self {
            ApprovalLevel::Level1 => "LEVEL_1",
            ApprovalLevel::Level2 => "LEVEL_2",
            ApprovalLevel::Level3 => "LEVEL_3",
        }
    }

    pub const fn required_role(self) -> ReviewerRole {
        match self {
            ApprovalLevel::Level1 => ReviewerRole::RiskAnalyst,
            ApprovalLevel::Level2 => ReviewerRole::BusinessDepartmentHead,
            ApprovalLevel::Level3 => ReviewerRole::RiskDivisionHead,
        }
    }

    /// Report status required before a decision at this level may be taken.
    pub const fn expected_status(self) -> ReportStatus {
        match self {
            ApprovalLevel::Level1 => ReportStatus::Submitted,
            ApprovalLevel::Level2 => ReportStatus::Reviewed,
            ApprovalLevel::Level3 => ReportStatus::Approved,
        }
    }

    /// Report status an approval at this level advances the report to.
    pub const fn approved_status(self) -> ReportStatus {
        match self {
            ApprovalLevel::Level1 => ReportStatus::Reviewed,
            ApprovalLevel::Level2 => ReportStatus::Approved,
            ApprovalLevel::Level3 => ReportStatus::Done,
        }
    }

    /// The level whose approval must already be recorded, if any.
    pub const fn prior(self) -> Option<ApprovalLevel> {
        match self {
            ApprovalLevel::Level1 => None,
            ApprovalLevel::Level2 => Some(ApprovalLevel::Level1),
            ApprovalLevel::Level3 => Some(ApprovalLevel::Level2),
        }
    }
}

impl fmt::Display for ApprovalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A periodic risk report filed for one borrower against one template
/// version. Owned answers, approvals, summary, and per-aspect results live
/// on the surrounding [`super::repository::ReportRecord`] aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub borrower: BorrowerId,
    pub period: PeriodId,
    pub template_version: TemplateVersionId,
    pub status: ReportStatus,
    pub rejection_reason: Option<String>,
    pub created_by: ActorId,
    pub submitted_at: DateTime<Utc>,
}

/// A selected option plus free-text notes for one question version.
/// Immutable once the report enters review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: QuestionVersionId,
    pub option: OptionId,
    pub notes: Option<String>,
}

/// Versioned questionnaire template snapshot. Reports keep scoring against
/// the version active at their creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVersion {
    pub id: TemplateVersionId,
    pub name: String,
    pub aspects: Vec<TemplateAspect>,
}

/// Association between a template version and an aspect version, carrying
/// the aspect's weight as a percentage of the template (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateAspect {
    pub weight: f64,
    pub aspect: AspectVersion,
}

/// A weighted grouping of questions, optionally gated by a visibility rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectVersion {
    pub id: AspectVersionId,
    pub name: String,
    pub visibility: Option<VisibilityRule>,
    pub questions: Vec<QuestionVersion>,
}

/// A question within an aspect; `weight` is a percentage of the aspect
/// (0-100). A negative option score marks a failing mandatory answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionVersion {
    pub id: QuestionVersionId,
    pub text: String,
    pub weight: f64,
    pub mandatory: bool,
    pub visibility: Option<VisibilityRule>,
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub label: String,
    pub score: f64,
}

/// Computed result for one visible aspect; replaced wholesale on every
/// recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAspect {
    pub aspect: AspectVersionId,
    pub total_score: f64,
    pub classification: Classification,
}

/// The single authoritative classification record per report, created lazily
/// on first calculation or first workflow touch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub final_classification: Option<Classification>,
    pub indicative_collectibility: i16,
    pub is_override: bool,
    pub override_reason: Option<String>,
    pub override_by: Option<ActorId>,
    pub business_notes: Option<String>,
    pub reviewer_notes: Option<String>,
}

/// One row of the three-level approval chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub level: ApprovalLevel,
    pub status: ApprovalStatus,
    pub reviewer: Option<ActorId>,
    pub notes: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl Approval {
    pub fn pending(level: ApprovalLevel) -> Self {
        Self {
            level,
            status: ApprovalStatus::Pending,
            reviewer: None,
            notes: None,
            decided_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchlistStatus {
    Active,
    Resolved,
    Archived,
}

impl WatchlistStatus {
    pub const fn label(self) -> &'static str {
        match self {
            WatchlistStatus::Active => "ACTIVE",
            WatchlistStatus::Resolved => "RESOLVED",
            WatchlistStatus::Archived => "ARCHIVED",
        }
    }
}

/// Borrower-level watchlist membership derived from the latest
/// classification; at most one `Active` entry per borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub borrower: BorrowerId,
    pub report: ReportId,
    pub status: WatchlistStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}
