//! China Construction Bank, layout version 3 (mobile banking export).
//!
//!   0 序号 | 1 摘要 | 2 币别 | 3 交易日期 | 4 交易金额 | 5 账户余额 |
//!   6 交易地点/附言 | 7 对方账号与户名
//!
//! One signed amount column: a leading minus is money out.

use bankscan_core::normalize::{parse_amount, parse_date};
use bankscan_core::{build_grid, CandidateTransaction, RawTable, Result, TransactionType};
use bankscan_finance::AccountRecovery;

use super::{dropped, finish, LayoutParser};

const LAYOUT_ID: &str = "ccb_v3";

const HEADER_KEYWORDS: &[&str] = &["序号", "摘要", "币别"];

mod col {
    pub const SERIAL: usize = 0;
    pub const DATE: usize = 3;
    pub const AMOUNT: usize = 4;
    pub const BALANCE: usize = 5;
    pub const PLACE: usize = 6;
    pub const COUNTERPARTY: usize = 7;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CcbV3;

impl LayoutParser for CcbV3 {
    fn layout_id(&self) -> &'static str {
        LAYOUT_ID
    }

    fn clean_data(&self, table: &RawTable) -> Result<Vec<CandidateTransaction>> {
        let grid = build_grid(&table.body)?;
        let account = AccountRecovery::default().recover(table);
        let mut out = Vec::new();

        for row in grid.rows() {
            let first = row.cell(col::SERIAL).unwrap_or_default();
            if row.index == 0 || HEADER_KEYWORDS.iter().any(|k| first.contains(k)) {
                continue;
            }

            let mut txn = CandidateTransaction::template(account.as_deref());

            let Some(date) = row.text(col::DATE).as_deref().and_then(parse_date) else {
                dropped(LAYOUT_ID, row, "no date");
                continue;
            };
            txn.transaction_date = Some(date);

            let Some(amount) = row.text(col::AMOUNT).as_deref().and_then(parse_amount) else {
                dropped(LAYOUT_ID, row, "no amount");
                continue;
            };
            txn.transaction_type = Some(if amount.is_sign_negative() {
                TransactionType::Expense
            } else {
                TransactionType::Income
            });
            txn.amount = Some(amount.abs());

            txn.balance = row.text(col::BALANCE).as_deref().and_then(parse_amount);
            txn.description = row.text(col::PLACE);
            txn.counterparty = row.text(col::COUNTERPARTY);

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
    fn test_signed_amount_and_header_account() {
        let table = RawTable {
            header: vec![RawCell {
                row: None,
                col: None,
                text: "卡号/账号：6217001234567890122 户名：赵六".to_string(),
                confidence: None,
            }],
            body: [
                row(0, &["序号", "摘要", "币别", "交易日期", "交易金额", "账户余额", "交易地点/附言", "对方账号与户名"]),
                row(1, &["1", "消费", "人民币", "20220301", "-128.00", "872.00", "财付通", "美团外卖"]),
                row(2, &["2", "转入", "人民币", "20220302", "1,000.00", "1,872.00", "", "张三"]),
                row(3, &["小计", "", "", "", "871.00", "", "", ""]),
            ]
            .concat(),
            ..RawTable::default()
        };

        let txns = CcbV3.clean_data(&table).unwrap();
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].account_number.as_deref(), Some("6217001234567890122"));
        assert_eq!(txns[0].transaction_type, Some(TransactionType::Expense));
        assert_eq!(txns[0].amount, Some(Decimal::from_str("128.00").unwrap()));
        assert_eq!(txns[0].description.as_deref(), Some("财付通"));
        assert_eq!(txns[0].counterparty.as_deref(), Some("美团外卖"));

        assert_eq!(txns[1].transaction_type, Some(TransactionType::Income));
        assert_eq!(txns[1].description, None);
    }
}
