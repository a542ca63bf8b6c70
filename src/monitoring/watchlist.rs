use chrono::{DateTime, Utc};

use super::domain::{BorrowerId, Classification, ReportId, WatchlistEntry, WatchlistStatus};
use super::repository::{RepositoryError, WatchlistRepository};

/// Bring the borrower's watchlist membership in line with the freshly
/// persisted classification. Explicit post-condition check rather than a
/// save hook, and idempotent under repeated recalculation:
///
/// - WATCHLIST ensures exactly one ACTIVE entry exists, opening one against
///   this report only when the borrower has none;
/// - SAFE resolves the ACTIVE entry only when it was opened by this same
///   report; entries owned by other reports are left alone.
pub(crate) fn sync<R>(
    repository: &R,
    borrower: &BorrowerId,
    report: &ReportId,
    classification: Classification,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError>
where
    R: WatchlistRepository + ?Sized,
{
    match classification {
        Classification::Watchlist => {
            if repository.active_for(borrower)?.is_none() {
                repository.open_entry(WatchlistEntry {
                    borrower: borrower.clone(),
                    report: report.clone(),
                    status: WatchlistStatus::Active,
                    opened_at: now,
                    closed_at: None,
                })?;
            }
        }
        Classification::Safe => {
            if let Some(active) = repository.active_for(borrower)? {
                if active.report == *report {
                    repository.close_entry(borrower, report, WatchlistStatus::Resolved, now)?;
                }
            }
        }
    }

    Ok(())
}
