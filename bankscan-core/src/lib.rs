//! bankscan-core: statement data model, cell grid reconstruction, value
//! normalizers and the batch validation gate shared by every bank layout.

pub mod error;
pub mod grid;
pub mod normalize;
pub mod types;
pub mod validate;

pub use error::{Error, Remedy, Result};
pub use grid::{build_grid, Row, RowGrid};
pub use types::{CandidateTransaction, Entity, RawCell, RawTable, TransactionType};
pub use validate::{check_batch, validate_batch, Rejection};
