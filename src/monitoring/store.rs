//! In-memory adapters for every collaborator seam. They serve as the
//! reference implementations of the trait contracts (including the
//! conditional-update semantics of `apply_decision`) and back the test
//! suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::access::RoleProvider;
use super::audit::{AuditError, AuditEvent, AuditSink};
use super::context::{BorrowerContext, ContextProvider};
use super::domain::{
    ActorId, Approval, ApprovalStatus, BorrowerId, Classification, ReportAspect, ReportId,
    ReportStatus, ReviewerRole, WatchlistEntry, WatchlistStatus,
};
use super::repository::{
    DecisionWrite, ReportRecord, ReportRepository, RepositoryError, WatchlistRepository,
};

/// Mutex-backed store for report aggregates and watchlist entries. Each
/// trait method runs under the lock, which gives the atomic all-or-nothing
/// behavior the repository contract asks for.
#[derive(Default, Clone)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<ReportId, ReportRecord>>>,
    watchlist: Arc<Mutex<Vec<WatchlistEntry>>>,
}

impl MemoryStore {
    pub fn watchlist_entries(&self) -> Vec<WatchlistEntry> {
        self.watchlist
            .lock()
            .expect("watchlist mutex poisoned")
            .clone()
    }
}

impl ReportRepository for MemoryStore {
    fn insert(&self, record: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.report.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn replace_approvals(
        &self,
        id: &ReportId,
        approvals: Vec<Approval>,
    ) -> Result<ReportRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.approvals = approvals;
        Ok(record.clone())
    }

    fn store_calculation(
        &self,
        id: &ReportId,
        aspects: Vec<ReportAspect>,
        final_classification: Classification,
        indicative_collectibility: i16,
    ) -> Result<ReportRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;

        record.aspects = aspects;
        let summary = record.summary.get_or_insert_with(Default::default);
        summary.final_classification = Some(final_classification);
        summary.indicative_collectibility = indicative_collectibility;

        Ok(record.clone())
    }

    fn apply_decision(
        &self,
        id: &ReportId,
        write: DecisionWrite,
    ) -> Result<ReportRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;

        // Conditional update: the approval must still be PENDING under the
        // lock, whatever the caller read earlier.
        let approval = record
            .approvals
            .iter_mut()
            .find(|approval| approval.level == write.level && approval.status == ApprovalStatus::Pending)
            .ok_or(RepositoryError::Conflict)?;

        approval.status = write.status;
        approval.reviewer = Some(write.reviewer.clone());
        approval.notes = write.notes.clone();
        approval.decided_at = Some(write.decided_at);

        record.report.status = write.report_status;
        if write.report_status == ReportStatus::Rejected {
            record.report.rejection_reason = write.rejection_reason.clone();
        }

        if !write.summary.is_empty() {
            let summary = record.summary.get_or_insert_with(Default::default);
            if let Some(override_write) = &write.summary.override_classification {
                summary.final_classification = Some(override_write.classification);
                summary.is_override = true;
                summary.override_by = Some(override_write.by.clone());
                summary.override_reason = Some(override_write.reason.clone());
            }
            if let Some(notes) = &write.summary.business_notes {
                summary.business_notes = Some(notes.clone());
            }
            if let Some(notes) = &write.summary.reviewer_notes {
                summary.reviewer_notes = Some(notes.clone());
            }
        }

        Ok(record.clone())
    }
}

impl WatchlistRepository for MemoryStore {
    fn active_for(&self, borrower: &BorrowerId) -> Result<Option<WatchlistEntry>, RepositoryError> {
        let guard = self.watchlist.lock().expect("watchlist mutex poisoned");
        Ok(guard
            .iter()
            .find(|entry| entry.borrower == *borrower && entry.status == WatchlistStatus::Active)
            .cloned())
    }

    fn open_entry(&self, entry: WatchlistEntry) -> Result<WatchlistEntry, RepositoryError> {
        let mut guard = self.watchlist.lock().expect("watchlist mutex poisoned");
        let already_active = guard
            .iter()
            .any(|existing| existing.borrower == entry.borrower && existing.status == WatchlistStatus::Active);
        if already_active {
            return Err(RepositoryError::Conflict);
        }
        guard.push(entry.clone());
        Ok(entry)
    }

    fn close_entry(
        &self,
        borrower: &BorrowerId,
        report: &ReportId,
        status: WatchlistStatus,
        closed_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.watchlist.lock().expect("watchlist mutex poisoned");
        match guard.iter_mut().find(|entry| {
            entry.borrower == *borrower
                && entry.report == *report
                && entry.status == WatchlistStatus::Active
        }) {
            Some(entry) => {
                entry.status = status;
                entry.closed_at = Some(closed_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Collecting audit sink with an accessor for assertions.
#[derive(Default, Clone)]
pub struct MemoryAuditLog {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditLog {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut guard = self.events.lock().expect("audit mutex poisoned");
        guard.push(event);
        Ok(())
    }
}

/// Fixed role grants, built up front.
#[derive(Default, Clone)]
pub struct StaticRoles {
    grants: HashMap<ActorId, Vec<ReviewerRole>>,
}

impl StaticRoles {
    pub fn grant(mut self, actor: ActorId, role: ReviewerRole) -> Self {
        self.grants.entry(actor).or_default().push(role);
        self
    }
}

impl RoleProvider for StaticRoles {
    fn actor_has_role(&self, actor: &ActorId, role: ReviewerRole) -> bool {
        self.grants
            .get(actor)
            .map(|roles| roles.contains(&role))
            .unwrap_or(false)
    }
}

/// Fixed borrower contexts; unknown borrowers get the empty snapshot.
#[derive(Default, Clone)]
pub struct StaticContexts {
    contexts: HashMap<BorrowerId, BorrowerContext>,
}

impl StaticContexts {
    pub fn with(mut self, borrower: BorrowerId, context: BorrowerContext) -> Self {
        self.contexts.insert(borrower, context);
        self
    }
}

impl ContextProvider for StaticContexts {
    fn context_for(&self, borrower: &BorrowerId) -> BorrowerContext {
        self.contexts.get(borrower).cloned().unwrap_or_default()
    }
}
