//! Borrower risk monitoring core for corporate loan portfolios.
//!
//! The crate owns two coupled pieces of machinery: the scoring engine that
//! turns weighted questionnaire answers into a SAFE/WATCHLIST classification
//! under conditional-visibility rules, and the sequential three-level
//! approval workflow that advances report status and may override that
//! classification. Persistence, role checks, borrower context, and audit
//! recording sit behind traits so the surrounding application supplies its
//! own adapters.

pub mod config;
pub mod monitoring;
pub mod telemetry;
