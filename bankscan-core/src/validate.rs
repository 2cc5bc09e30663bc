//! Validation gate: all-or-nothing acceptance of a parsed batch.

use std::fmt;

use rust_decimal::Decimal;

use crate::types::CandidateTransaction;

/// Why a batch was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyBatch,
    MissingAmount { index: usize },
    NegativeAmount { index: usize },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyBatch => f.write_str("empty batch"),
            Rejection::MissingAmount { index } => write!(f, "record {index} has no amount"),
            Rejection::NegativeAmount { index } => write!(f, "record {index} has a negative amount"),
        }
    }
}

/// Check a batch, reporting the first reason it cannot be persisted.
///
/// Dates and amounts are typed (`NaiveDate`, `Decimal`), so a present value
/// is always well-formed; what remains to check is presence and sign.
pub fn check_batch(transactions: &[CandidateTransaction]) -> Result<(), Rejection> {
    if transactions.is_empty() {
        return Err(Rejection::EmptyBatch);
    }

    for (index, txn) in transactions.iter().enumerate() {
        match txn.amount {
            None => return Err(Rejection::MissingAmount { index }),
            Some(a) if a < Decimal::ZERO => return Err(Rejection::NegativeAmount { index }),
            Some(_) => {}
        }
    }

    Ok(())
}

/// `true` when the whole batch may be persisted.
pub fn validate_batch(transactions: &[CandidateTransaction]) -> bool {
    match check_batch(transactions) {
        Ok(()) => true,
        Err(reason) => {
            tracing::debug!(%reason, count = transactions.len(), "batch rejected");
            false
        }
    }
}
