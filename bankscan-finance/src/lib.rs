//! bankscan-finance: account-number recovery, transaction-type
//! classification and statement totals.

pub mod account;
pub mod classify;
pub mod summary;

pub use account::{is_plausible_account, luhn_valid, AccountRecovery};
pub use classify::{resolve, FlagMarkers, KeywordTable};
pub use summary::StatementSummary;
