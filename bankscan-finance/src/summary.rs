//! Statement-level totals over a processed batch.

use std::collections::HashMap;

use bankscan_core::{CandidateTransaction, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Income / expense totals for one batch of transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_amount: Decimal,
    pub transaction_count: usize,
    /// Record count per transaction type (untyped rows are not counted here)
    pub by_type: HashMap<TransactionType, usize>,
}

impl StatementSummary {
    /// Income and expense are summed; transfers and other rows are counted
    /// but leave the totals alone.
    pub fn from_transactions(txns: &[CandidateTransaction]) -> Self {
        let mut summary = StatementSummary {
            transaction_count: txns.len(),
            ..Self::default()
        };

        for t in txns {
            let amount = t.amount.unwrap_or_default();
            match t.transaction_type {
                Some(TransactionType::Income) => summary.total_income += amount,
                Some(TransactionType::Expense) => summary.total_expense += amount,
                _ => {}
            }
            if let Some(kind) = t.transaction_type {
                *summary.by_type.entry(kind).or_insert(0) += 1;
            }
        }

        summary.net_amount = summary.total_income - summary.total_expense;
        summary
    }

    pub fn count(&self, kind: TransactionType) -> usize {
        self.by_type.get(&kind).copied().unwrap_or(0)
    }
}
