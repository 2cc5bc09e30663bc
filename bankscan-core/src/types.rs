//! Statement record types shared by the OCR boundary, the layout parsers and
//! the persistence hand-off.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OCR-recognised table cell.
///
/// Position fields are optional because OCR engines occasionally emit cells
/// without structural data; the grid reconstructor drops those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCell {
    pub row: Option<usize>,
    pub col: Option<usize>,
    pub text: String,
    pub confidence: Option<f32>,
}

impl RawCell {
    pub fn new(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            col: Some(col),
            text: text.into(),
            confidence: None,
        }
    }
}

/// A named entity reported by the text-understanding collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: String,
    pub text: String,
}

impl Entity {
    pub const BANK_CARD: &'static str = "BANK_CARD";

    pub fn is_bank_card(&self) -> bool {
        self.kind == Self::BANK_CARD
    }
}

/// The single table block a layout works on, plus the loose text the OCR
/// engine returned around it (used only for account-number recovery).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub header: Vec<RawCell>,
    pub body: Vec<RawCell>,
    pub title: Vec<String>,
    /// Free-text lines ("words_result") from general text recognition
    pub text_lines: Vec<String>,
    /// Bank-card entities recognised in header text
    pub entities: Vec<Entity>,
}

impl RawTable {
    pub fn header_texts(&self) -> impl Iterator<Item = &str> {
        self.header.iter().map(|c| c.text.as_str())
    }
}

/// Fixed transaction category set. Serialized with the labels the
/// persistence side stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "收入")]
    Income,
    #[serde(rename = "支出")]
    Expense,
    #[serde(rename = "转账")]
    Transfer,
    #[serde(rename = "其他")]
    Other,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "收入",
            TransactionType::Expense => "支出",
            TransactionType::Transfer => "转账",
            TransactionType::Other => "其他",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A parsed, not-yet-validated statement row.
///
/// Every row starts from the all-`None` template (`Default`) and is filled
/// as columns are interpreted. `amount` is stored non-negative; direction is
/// carried by `transaction_type`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateTransaction {
    pub account_number: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub balance: Option<Decimal>,
    pub counterparty: Option<String>,
    pub description: Option<String>,
    pub transaction_id: Option<String>,
}

impl CandidateTransaction {
    /// Row template carrying the statement-wide account number.
    pub fn template(account_number: Option<&str>) -> Self {
        Self {
            account_number: account_number.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == Some(TransactionType::Income)
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == Some(TransactionType::Expense)
    }
}
