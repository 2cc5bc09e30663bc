//! China Construction Bank, layout version 1.
//!
//!   0 日期 | 1 凭证种类 | 2 凭证号码 | 3 摘要 | 4 对方户名 | 5 借方 | 6 贷方 |
//!   7 .. 8 | 9 余额 | 10 交易流水号
//!
//! Debit and credit sit in separate columns. The summary text is the
//! stronger signal: "转账" in a credit column is still a transfer.

use bankscan_core::normalize::{parse_amount, parse_date};
use bankscan_core::{build_grid, CandidateTransaction, RawTable, Result, TransactionType};
use bankscan_finance::{AccountRecovery, KeywordTable};

use super::{dropped, finish, header_rows, two_column_amount, LayoutParser};

const LAYOUT_ID: &str = "ccb_v1";

const HEADER_KEYWORDS: &[&str] = &["日期", "凭证种类", "凭证号码", "借方", "贷方"];

pub(crate) const CCB_KEYWORDS: KeywordTable = KeywordTable::new(&[
    (TransactionType::Income, &["贷记", "存入", "转入", "收到", "退款", "利息"]),
    (TransactionType::Expense, &["借记", "支取", "转出", "支付", "手续费", "年费"]),
    (TransactionType::Transfer, &["转账", "汇款", "代付", "代发"]),
    (TransactionType::Other, &["冲正", "撤销", "退回"]),
]);

mod col {
    pub const DATE: usize = 0;
    pub const VOUCHER: usize = 2;
    pub const SUMMARY: usize = 3;
    pub const COUNTERPARTY: usize = 4;
    pub const DEBIT: usize = 5;
    pub const CREDIT: usize = 6;
    pub const BALANCE: usize = 9;
    pub const FLOW_NUMBER: usize = 10;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CcbV1;

impl LayoutParser for CcbV1 {
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

            let Some(date) = row.text(col::DATE).as_deref().and_then(parse_date) else {
                dropped(LAYOUT_ID, row, "no date");
                continue;
            };
            txn.transaction_date = Some(date);

            txn.description = row
                .text(col::SUMMARY)
                .map(|s| s.trim_end_matches([',', '，']).to_string())
                .filter(|s| !s.is_empty());
            let keyword = txn.description.as_deref().and_then(|d| CCB_KEYWORDS.classify(d));

            txn.counterparty = row.text(col::COUNTERPARTY);

            let debit = row.text(col::DEBIT).as_deref().and_then(parse_amount);
            let credit = row.text(col::CREDIT).as_deref().and_then(parse_amount);
            let Some((side, amount)) = two_column_amount([
                (TransactionType::Expense, debit),
                (TransactionType::Income, credit),
            ]) else {
                dropped(LAYOUT_ID, row, "debit and credit both empty");
                continue;
            };
            txn.amount = Some(amount);
            txn.transaction_type = Some(keyword.unwrap_or(side));

            txn.balance = row.text(col::BALANCE).as_deref().and_then(parse_amount);
            txn.transaction_id = row.text(col::FLOW_NUMBER).or_else(|| row.text(col::VOUCHER));

            out.push(txn);
        }

        finish(LAYOUT_ID, &grid, out)
    }
}
