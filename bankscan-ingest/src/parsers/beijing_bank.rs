//! Bank of Beijing personal statement.
//!
//! Expected table body (row 0 is the header):
//!   交易日期 | 业务种类 | 收支标志 | 发生额 | 余额 | 对方户名 / 对方账号 ...
//!
//! Cells often repeat their value on a second OCR line; only the first line
//! is read. Everything from column 5 onwards is counterparty text.

use bankscan_core::normalize::{parse_amount, parse_date, strip_punctuation};
use bankscan_core::{build_grid, CandidateTransaction, RawTable, Result, TransactionType};
use bankscan_finance::{resolve, AccountRecovery, KeywordTable};

use super::{dropped, finish, LayoutParser};

const LAYOUT_ID: &str = "beijing_bank";

const HEADER_KEYWORDS: &[&str] = &["交易日期", "日期"];

const KEYWORDS: KeywordTable = KeywordTable::new(&[
    (TransactionType::Income, &["收款", "收入", "利息", "汇入", "转入", "医保"]),
    (TransactionType::Expense, &["支付", "汇款", "转账", "消费", "支取", "转出"]),
]);

mod col {
    pub const DATE: usize = 0;
    pub const BUSINESS: usize = 1;
    pub const FLAG: usize = 2;
    pub const AMOUNT: usize = 3;
    pub const BALANCE: usize = 4;
    pub const COUNTERPARTY: usize = 5;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BeijingBank;

/// Any non-empty flag cell is a direction: "收入" is income, the rest is
/// spending ("支出", "付", OCR noise).
fn read_flag(cell: &str) -> TransactionType {
    if cell.contains("收入") {
        TransactionType::Income
    } else {
        TransactionType::Expense
    }
}

impl LayoutParser for BeijingBank {
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

            txn.transaction_date = row.primary(col::DATE).and_then(parse_date);

            let business = row.primary(col::BUSINESS);
            txn.description = business.map(str::to_string);

            let flag = row.primary(col::FLAG).map(read_flag);
            let keyword = business.and_then(|b| KEYWORDS.classify(b));

            let Some(amount) = row.primary(col::AMOUNT).and_then(parse_amount) else {
                dropped(LAYOUT_ID, row, "no amount");
                continue;
            };
            txn.amount = Some(amount.abs());
            txn.transaction_type = Some(resolve(flag, keyword));
            txn.balance = row.primary(col::BALANCE).and_then(parse_amount);

            let counterparty = strip_punctuation(&row.lines_from(col::COUNTERPARTY).join(" "));
            if !counterparty.is_empty() {
                txn.counterparty = Some(counterparty);
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

    fn body(rows: &[&[&str]]) -> Vec<RawCell> {
        rows.iter()
            .enumerate()
            .flat_map(|(r, cols)| {
                cols.iter()
                    .enumerate()
                    .map(move |(c, text)| RawCell::new(r, c, *text))
            })
            .collect()
    }

    #[test]
    fn test_header_and_multiline_cells() {
        let table = RawTable {
            body: body(&[
                &["交易日期", "业务种类", "收支标志", "发生额", "余额", "对方户名"],
                &["20230105\n20230105", "网银转入", "收入", "1,000.00", "3,000.00", "张三\n北京分行"],
                &["20230106", "消费", "", "-25.50", "2,974.50", ""],
            ]),
            ..RawTable::default()
        };

        let txns = BeijingBank.clean_data(&table).unwrap();
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].transaction_date.unwrap().to_string(), "2023-01-05");
        assert_eq!(txns[0].transaction_type, Some(TransactionType::Income));
        assert_eq!(txns[0].counterparty.as_deref(), Some("张三 北京分行"));

        // No flag: keyword from business type; sign dropped from the amount
        assert_eq!(txns[1].transaction_type, Some(TransactionType::Expense));
        assert_eq!(txns[1].amount, Some(Decimal::from_str("25.50").unwrap()));
        assert_eq!(txns[1].counterparty, None);
    }

    #[test]
    fn test_flag_beats_business_keyword() {
        let table = RawTable {
            body: body(&[
                &["日期"],
                &["20230107", "转入", "支出", "10.00", "1.00"],
            ]),
            ..RawTable::default()
        };
        let txns = BeijingBank.clean_data(&table).unwrap();
        assert_eq!(txns[0].transaction_type, Some(TransactionType::Expense));
    }

    #[test]
    fn test_unknown_type_defaults_to_other() {
        let table = RawTable {
            body: body(&[&["日期"], &["20230107", "冲账", "", "10.00", "1.00"]]),
            ..RawTable::default()
        };
        let txns = BeijingBank.clean_data(&table).unwrap();
        assert_eq!(txns[0].transaction_type, Some(TransactionType::Other));
    }
}
