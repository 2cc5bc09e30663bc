//! China Everbright Bank credit card, layout version 1.
//!
//!   0 卡号 | 1 交易日期 | 2 交易地点 | 3 存入 | 4 支出 | 5 余额 | 6 摘要
//!
//! Supplementary cards print their own number on each row; that number
//! wins over the one recovered from the statement header.

use std::sync::OnceLock;

use bankscan_core::normalize::{parse_amount, parse_date};
use bankscan_core::{build_grid, CandidateTransaction, RawTable, Result, TransactionType};
use bankscan_finance::AccountRecovery;
use regex::Regex;

use super::{dropped, finish, join_parts, two_column_amount, LayoutParser};

const LAYOUT_ID: &str = "ceb_v1";

const HEADER_KEYWORDS: &[&str] = &["卡号", "账号", "交易日期"];

mod col {
    pub const CARD: usize = 0;
    pub const DATE: usize = 1;
    pub const PLACE: usize = 2;
    pub const DEPOSIT: usize = 3;
    pub const WITHDRAWAL: usize = 4;
    pub const BALANCE: usize = 5;
    pub const SUMMARY: usize = 6;
}

fn card_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{16}").expect("valid card number regex"))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CebV1;

impl LayoutParser for CebV1 {
    fn layout_id(&self) -> &'static str {
        LAYOUT_ID
    }

    fn clean_data(&self, table: &RawTable) -> Result<Vec<CandidateTransaction>> {
        let grid = build_grid(&table.body)?;
        let account = AccountRecovery::default().recover(table);
        let mut out = Vec::new();

        for row in grid.rows() {
            let first = row.cell(col::CARD).unwrap_or_default();
            if row.index == 0 || HEADER_KEYWORDS.iter().any(|k| first.contains(k)) {
                continue;
            }

            let row_card = card_number().find(first).map(|m| m.as_str());
            let mut txn = CandidateTransaction::template(row_card.or(account.as_deref()));

            let Some(date) = row.text(col::DATE).as_deref().and_then(parse_date) else {
                dropped(LAYOUT_ID, row, "no date");
                continue;
            };
            txn.transaction_date = Some(date);

            let deposit = row.text(col::DEPOSIT).as_deref().and_then(parse_amount);
            let withdrawal = row.text(col::WITHDRAWAL).as_deref().and_then(parse_amount);
            let Some((kind, amount)) = two_column_amount([
                (TransactionType::Income, deposit),
                (TransactionType::Expense, withdrawal),
            ]) else {
                dropped(LAYOUT_ID, row, "deposit and withdrawal both empty");
                continue;
            };
            txn.amount = Some(amount);
            txn.transaction_type = Some(kind);

            txn.balance = row.text(col::BALANCE).as_deref().and_then(parse_amount);

            let place = row.text(col::PLACE);
            let summary = row.text(col::SUMMARY);
            txn.description = join_parts([place.as_deref(), summary.as_deref()], " ");
            txn.counterparty = place;

            out.push(txn);
        }

        finish(LAYOUT_ID, &grid, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankscan_core::RawCell;

    fn row(r: usize, cols: &[&str]) -> Vec<RawCell> {
        cols.iter()
            .enumerate()
            .map(|(c, t)| RawCell::new(r, c, *t))
            .collect()
    }

    #[test]
    fn test_row_card_overrides_statement_account() {
        let table = RawTable {
            title: vec!["主卡号：4111111111111111".to_string()],
            body: [
                row(0, &["卡号", "交易日期", "交易地点", "存入", "支出", "余额", "摘要"]),
                row(1, &["", "2023-04-01", "北京 超市", "", "88.80", "911.20", "消费"]),
                row(2, &["6228480012345671", "2023-04-02", "", "500.00", "", "1,411.20", "还款"]),
                row(3, &["", "2023-04-03", "", "", "", "1,411.20", "查询"]),
            ]
            .concat(),
            ..RawTable::default()
        };

        let txns = CebV1.clean_data(&table).unwrap();
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].account_number.as_deref(), Some("4111111111111111"));
        assert_eq!(txns[0].transaction_type, Some(TransactionType::Expense));
        assert_eq!(txns[0].counterparty.as_deref(), Some("北京 超市"));
        assert_eq!(txns[0].description.as_deref(), Some("北京 超市 消费"));

        assert_eq!(txns[1].account_number.as_deref(), Some("6228480012345671"));
        assert_eq!(txns[1].transaction_type, Some(TransactionType::Income));
        assert_eq!(txns[1].counterparty, None);
        assert_eq!(txns[1].description.as_deref(), Some("还款"));
    }
}
