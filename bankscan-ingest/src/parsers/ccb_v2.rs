//! China Construction Bank, layout version 2.
//!
//!   0 日期 时间 | 1 凭证号码 | 2 摘要 | 3 对方户名 | 4 借方 | 5 贷方 |
//!   6 借贷 | 7 余额 | 8 交易流水号
//!
//! Column 6 names the side explicitly; without it the first non-empty
//! amount column decides. The balance cell sometimes carries a currency
//! amount in front of the real balance.

use std::sync::OnceLock;

use bankscan_core::normalize::{parse_amount, parse_date};
use bankscan_core::{build_grid, CandidateTransaction, RawTable, Result, TransactionType};
use bankscan_finance::{AccountRecovery, FlagMarkers};
use regex::Regex;

use super::{dropped, finish, header_rows, nonzero, two_column_amount, LayoutParser};

const LAYOUT_ID: &str = "ccb_v2";

const HEADER_KEYWORDS: &[&str] = &["日期", "凭证种类", "凭证号码", "借方", "贷方", "余额"];

const FLAGS: FlagMarkers = FlagMarkers {
    credit: &["贷"],
    debit: &["借"],
};

mod col {
    pub const DATE: usize = 0;
    pub const VOUCHER: usize = 1;
    pub const SUMMARY: usize = 2;
    pub const COUNTERPARTY: usize = 3;
    pub const DEBIT: usize = 4;
    pub const CREDIT: usize = 5;
    pub const FLAG: usize = 6;
    pub const BALANCE: usize = 7;
    pub const FLOW_NUMBER: usize = 8;
}

fn numeric_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?[\d,]+\.?\d*").expect("valid numeric token regex"))
}

/// Last number in a cell such as `"CNY 12.00 1,234.56"`.
fn last_number(cell: &str) -> Option<rust_decimal::Decimal> {
    numeric_token()
        .find_iter(cell)
        .last()
        .and_then(|m| parse_amount(m.as_str()))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CcbV2;

impl LayoutParser for CcbV2 {
    fn layout_id(&self) -> &'static str {
        LAYOUT_ID
    }

    fn clean_data(&self, table: &RawTable) -> Result<Vec<CandidateTransaction>> {
        let grid = build_grid(&table.body)?;
        let account = AccountRecovery::default().recover(table);
        let headers = header_rows(LAYOUT_ID, &grid, HEADER_KEYWORDS, col::DATE);
        let mut out = Vec::new();

        for row in grid.rows().filter(|r| !headers.contains(&r.index)) {
            let mut txn = CandidateTransaction::template(account.as_deref());

            let date = row
                .text(col::DATE)
                .and_then(|d| d.split_whitespace().next().and_then(parse_date));
            let Some(date) = date else {
                dropped(LAYOUT_ID, row, "no date");
                continue;
            };
            txn.transaction_date = Some(date);

            txn.transaction_id = row.text(col::VOUCHER);
            txn.description = row.text(col::SUMMARY);
            txn.counterparty = row.text(col::COUNTERPARTY);

            let debit = row.text(col::DEBIT).as_deref().and_then(parse_amount);
            let credit = row.text(col::CREDIT).as_deref().and_then(parse_amount);
            let picked = match row.text(col::FLAG).and_then(|f| FLAGS.read(&f)) {
                Some(kind @ TransactionType::Expense) => nonzero(debit).map(|a| (kind, a)),
                Some(kind @ TransactionType::Income) => nonzero(credit).map(|a| (kind, a)),
                _ => two_column_amount([
                    (TransactionType::Expense, debit),
                    (TransactionType::Income, credit),
                ]),
            };
            let Some((kind, amount)) = picked else {
                dropped(LAYOUT_ID, row, "no amount on the flagged side");
                continue;
            };
            txn.amount = Some(amount);
            txn.transaction_type = Some(kind);

            txn.balance = row.text(col::BALANCE).as_deref().and_then(last_number);
            if let Some(flow) = row.text(col::FLOW_NUMBER) {
                txn.transaction_id = Some(flow);
            }

            out.push(txn);
        }

        finish(LAYOUT_ID, &grid, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankscan_core::RawCell;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn row(r: usize, cols: &[&str]) -> Vec<RawCell> {
        cols.iter()
            .enumerate()
            .map(|(c, t)| RawCell::new(r, c, *t))
            .collect()
    }

    #[test]
    fn test_flag_selects_amount_column() {
        let body = [
            row(0, &["交易日期", "凭证号码", "摘要", "对方户名", "借方", "贷方", "借贷", "余额", "流水号"]),
            row(1, &["2022-01-10 09:30:01", "P1", "转账", "王五", "", "300.00", "贷", "CNY 1,300.00", "S1"]),
            row(2, &["2022-01-11 12:00:00", "P2", "消费", "", "45.50", "", "借", "1,254.50", ""]),
            row(3, &["2022-01-12", "P3", "手续费", "", "2.00", "", "", "1,252.50", ""]),
            row(4, &["2022-01-13", "P4", "错账", "", "", "9.00", "借", "1,252.50", ""]),
        ]
        .concat();

        let txns = CcbV2
            .clean_data(&RawTable { body, ..RawTable::default() })
            .unwrap();
        // Row 4 names the debit side but only has a credit amount
        assert_eq!(txns.len(), 3);

        assert_eq!(txns[0].transaction_date.unwrap().to_string(), "2022-01-10");
        assert_eq!(txns[0].transaction_type, Some(TransactionType::Income));
        assert_eq!(txns[0].balance, Some(Decimal::from(1300)));
        assert_eq!(txns[0].transaction_id.as_deref(), Some("S1"));

        assert_eq!(txns[1].transaction_type, Some(TransactionType::Expense));
        assert_eq!(txns[1].amount, Some(Decimal::from_str("45.50").unwrap()));
        assert_eq!(txns[1].transaction_id.as_deref(), Some("P2"));

        assert_eq!(txns[2].transaction_type, Some(TransactionType::Expense));
    }

    #[test]
    fn test_last_number() {
        assert_eq!(last_number("12.00 1,234.56"), Some(Decimal::from_str("1234.56").unwrap()));
        assert_eq!(last_number("无"), None);
        // Overdrawn balance keeps its sign
        assert_eq!(last_number("CNY -1,234.56"), Some(Decimal::from_str("-1234.56").unwrap()));
    }

    #[test]
    fn test_keyword_in_data_row_is_not_a_header() {
        let body = [
            row(0, &["交易日期", "凭证号码", "摘要", "对方户名", "借方", "贷方", "借贷", "余额", "流水号"]),
            row(1, &["2022-02-01 08:00:00", "P1", "消费", "美团", "18.00", "", "借", "982.00", ""]),
            row(2, &["2022-02-02 09:15:00", "P2", "转账", "余额宝", "", "100.00", "贷", "1,082.00", ""]),
        ]
        .concat();

        let txns = CcbV2
            .clean_data(&RawTable { body, ..RawTable::default() })
            .unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[1].counterparty.as_deref(), Some("余额宝"));
        assert_eq!(txns[1].amount, Some(Decimal::from(100)));
    }
}
