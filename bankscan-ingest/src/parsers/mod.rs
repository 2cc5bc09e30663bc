//! Per-layout statement parsers.
//!
//! One type per bank layout version. Each carries its own header keywords,
//! column mapping and debit/credit rule as embedded data; nothing here knows
//! about any particular bank.

use std::any::Any;

use bankscan_core::normalize::parse_date;
use bankscan_core::{
    validate_batch, CandidateTransaction, Error, RawTable, Result, Row, RowGrid, TransactionType,
};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::ocr::extract_table;

pub mod beijing_bank;
pub mod boc_v1;
pub mod boc_v2;
pub mod boc_v3;
pub mod ccb_v1;
pub mod ccb_v2;
pub mod ccb_v3;
pub mod ceb_v1;
pub mod ceb_v2;

pub use beijing_bank::BeijingBank;
pub use boc_v1::BocV1;
pub use boc_v2::BocV2;
pub use boc_v3::BocV3;
pub use ccb_v1::CcbV1;
pub use ccb_v2::CcbV2;
pub use ccb_v3::CcbV3;
pub use ceb_v1::CebV1;
pub use ceb_v2::CebV2;

/// The three-step contract every layout implements.
///
/// Parsers are stateless; a fresh instance per document is fine and calls
/// may run concurrently on separate threads.
pub trait LayoutParser: Any + Send + Sync {
    /// Registry token, e.g. `"beijing_bank"`
    fn layout_id(&self) -> &'static str;

    /// Validate the OCR response and pull out the table block.
    fn parse(&self, ocr_output: &Value) -> Result<RawTable> {
        extract_table(ocr_output)
    }

    /// Map table rows to candidate transactions. Rows without a usable
    /// amount are dropped; zero survivors is an error.
    fn clean_data(&self, table: &RawTable) -> Result<Vec<CandidateTransaction>>;

    /// All-or-nothing acceptance gate.
    fn validate_data(&self, transactions: &[CandidateTransaction]) -> bool {
        validate_batch(transactions)
    }
}

/// Indices of header rows: a header keyword somewhere in the row and no
/// date in `date_col`. Keywords also occur inside data ("余额宝" holds
/// "余额"), so the date column has the final say.
pub(crate) fn header_rows(layout: &str, grid: &RowGrid, keywords: &[&str], date_col: usize) -> Vec<usize> {
    grid.rows()
        .filter(|r| r.contains_any(keywords) && !has_date(r, date_col))
        .inspect(|r| tracing::debug!(layout, row = r.index, cells = %r.joined(), "header row skipped"))
        .map(|r| r.index)
        .collect()
}

/// Leading token of `col` parses as a date (`"2022-01-10 09:30:01"` counts).
fn has_date(row: &Row, col: usize) -> bool {
    row.text(col)
        .and_then(|t| t.split_whitespace().next().and_then(parse_date))
        .is_some()
}

/// First row matching at least `min_hits` distinct header keywords.
pub(crate) fn data_header_row(grid: &RowGrid, keywords: &[&str], min_hits: usize) -> Option<usize> {
    grid.rows()
        .find(|r| keywords.iter().filter(|k| r.contains_any(&[**k])).count() >= min_hits)
        .map(|r| r.index)
}

/// Common tail of every `clean_data`: zero rows is a layout mismatch.
pub(crate) fn finish(
    layout: &str,
    grid: &RowGrid,
    transactions: Vec<CandidateTransaction>,
) -> Result<Vec<CandidateTransaction>> {
    if transactions.is_empty() {
        return Err(Error::NoTransactionsExtracted {
            layout: layout.to_string(),
            rows: grid.len(),
        });
    }
    tracing::info!(
        layout,
        rows = grid.len(),
        extracted = transactions.len(),
        "statement rows mapped"
    );
    Ok(transactions)
}

pub(crate) fn dropped(layout: &str, row: &Row, reason: &str) {
    tracing::debug!(layout, row = row.index, reason, cells = %row.joined(), "row dropped");
}

/// First non-zero side of a two-column amount pair, with the direction that
/// column stands for. Blank or zero on both sides yields `None`.
pub(crate) fn two_column_amount(
    sides: [(TransactionType, Option<Decimal>); 2],
) -> Option<(TransactionType, Decimal)> {
    sides
        .into_iter()
        .find_map(|(kind, amount)| nonzero(amount).map(|a| (kind, a)))
}

/// Magnitude of an amount cell, `None` for blank or zero.
pub(crate) fn nonzero(amount: Option<Decimal>) -> Option<Decimal> {
    amount.map(|a| a.abs()).filter(|a| !a.is_zero())
}

/// Join the non-empty parts with `sep`; `None` when nothing is left.
pub(crate) fn join_parts<'a>(parts: impl IntoIterator<Item = Option<&'a str>>, sep: &str) -> Option<String> {
    let kept: Vec<&str> = parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    (!kept.is_empty()).then(|| kept.join(sep))
}
