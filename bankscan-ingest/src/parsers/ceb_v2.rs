//! China Everbright Bank debit account, layout version 2.
//!
//!   0 交易日期 | 1 交易时间 | 2 存入金额 | 3 转出金额 | 4 账户余额 | 5 摘要

use bankscan_core::normalize::{parse_amount, parse_date};
use bankscan_core::{build_grid, CandidateTransaction, RawTable, Result, TransactionType};
use bankscan_finance::AccountRecovery;

use super::{dropped, finish, two_column_amount, LayoutParser};

const LAYOUT_ID: &str = "ceb_v2";

const HEADER_KEYWORDS: &[&str] = &["交易日期", "日期"];

mod col {
    pub const DATE: usize = 0;
    pub const DEPOSIT: usize = 2;
    pub const WITHDRAWAL: usize = 3;
    pub const BALANCE: usize = 4;
    pub const SUMMARY: usize = 5;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CebV2;

impl LayoutParser for CebV2 {
    fn layout_id(&self) -> &'static str {
        LAYOUT_ID
    }

    fn clean_data(&self, table: &RawTable) -> Result<Vec<CandidateTransaction>> {
        let grid = build_grid(&table.body)?;
        let account = AccountRecovery::default().recover(table);
        let mut out = Vec::new();

        for row in grid.rows() {
            let first = row.cell(col::DATE).unwrap_or_default();
            if row.index == 0 || HEADER_KEYWORDS.iter().any(|k| first.contains(k)) {
                continue;
            }

            let mut txn = CandidateTransaction::template(account.as_deref());
            // Repeated dates on a second line
            txn.transaction_date = row.primary(col::DATE).and_then(parse_date);

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
            txn.description = row.text(col::SUMMARY);

            out.push(txn);
        }

        finish(LAYOUT_ID, &grid, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankscan_core::{Error, RawCell};
    use rust_decimal::Decimal;

    fn row(r: usize, cols: &[&str]) -> Vec<RawCell> {
        cols.iter()
            .enumerate()
            .map(|(c, t)| RawCell::new(r, c, *t))
            .collect()
    }

    #[test]
    fn test_deposit_and_withdrawal_columns() {
        let body = [
            row(0, &["交易日期", "交易时间", "存入金额", "转出金额", "账户余额", "摘要"]),
            row(1, &["20230801\n20230801", "10:00", "2,000.00", "", "2,500.00", "工资"]),
            row(2, &["20230802", "11:00", "", "300.00", "2,200.00", "转账"]),
        ]
        .concat();

        let txns = CebV2
            .clean_data(&RawTable { body, ..RawTable::default() })
            .unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].transaction_date.unwrap().to_string(), "2023-08-01");
        assert_eq!(txns[0].transaction_type, Some(TransactionType::Income));
        assert_eq!(txns[0].amount, Some(Decimal::from(2000)));
        assert_eq!(txns[1].transaction_type, Some(TransactionType::Expense));
        assert_eq!(txns[1].description.as_deref(), Some("转账"));
    }

    #[test]
    fn test_all_zero_rows_is_no_transactions() {
        let body = [
            row(0, &["交易日期"]),
            row(1, &["20230801", "", "0.00", "0.00", "1.00", "结息"]),
        ]
        .concat();
        let err = CebV2
            .clean_data(&RawTable { body, ..RawTable::default() })
            .unwrap_err();
        assert!(matches!(err, Error::NoTransactionsExtracted { rows: 2, .. }));
    }
}
