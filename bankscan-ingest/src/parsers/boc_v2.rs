//! Bank of Communications, layout version 2 (bilingual export).
//! (交通银行; `boc` here is not Bank of China.)
//!
//!   0 Serial | 1 Trans Date | 2 Trans Time | 3 Trading Type | 4 Dc Flg |
//!   5 Trans Amt | 6 Balance | 7 Payment Receipt Account |
//!   8 Payment Receipt Account Name | 9 Trading Place |
//!   10 Accounting Fluid Number | 11 Abstract

use bankscan_core::normalize::{parse_amount, parse_date};
use bankscan_core::{build_grid, CandidateTransaction, RawTable, Result, TransactionType};
use bankscan_finance::{resolve, AccountRecovery, FlagMarkers, KeywordTable};

use super::{dropped, finish, header_rows, join_parts, LayoutParser};

const LAYOUT_ID: &str = "boc_v2";

const HEADER_KEYWORDS: &[&str] = &["Serial", "Trans Date", "Trading Type", "Dc Flg", "Trans Amt", "Balance"];

const FLAGS: FlagMarkers = FlagMarkers {
    credit: &["Cr", "贷"],
    debit: &["Dr", "借"],
};

const KEYWORDS: KeywordTable = KeywordTable::new(&[
    (TransactionType::Income, &["收入", "转入", "存入", "退款", "利息", "红包", "汇入", "代发工资"]),
    (TransactionType::Expense, &["支出", "转出", "消费", "取款", "手续费", "年费", "跨行汇款"]),
    (TransactionType::Transfer, &["转账", "汇款", "代付", "代发"]),
    (TransactionType::Other, &["冲正", "撤销", "退回"]),
]);

mod col {
    pub const DATE: usize = 1;
    pub const TRADING_TYPE: usize = 3;
    pub const FLAG: usize = 4;
    pub const AMOUNT: usize = 5;
    pub const BALANCE: usize = 6;
    pub const PEER_ACCOUNT: usize = 7;
    pub const PEER_NAME: usize = 8;
    pub const PLACE: usize = 9;
    pub const FLUID_NUMBER: usize = 10;
    pub const ABSTRACT: usize = 11;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BocV2;

impl LayoutParser for BocV2 {
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

            let Some(amount) = row.text(col::AMOUNT).as_deref().and_then(parse_amount) else {
                dropped(LAYOUT_ID, row, "no amount");
                continue;
            };
            txn.amount = Some(amount.abs());

            let trading_type = row.text(col::TRADING_TYPE);
            let flag = row.text(col::FLAG).and_then(|f| FLAGS.read(&f));
            let keyword = trading_type.as_deref().and_then(|t| KEYWORDS.classify(t));
            txn.transaction_type = Some(resolve(flag, keyword));

            txn.balance = row.text(col::BALANCE).as_deref().and_then(parse_amount);

            let peer_account = row.text(col::PEER_ACCOUNT);
            let peer_name = row.text(col::PEER_NAME);
            txn.counterparty = join_parts([peer_account.as_deref(), peer_name.as_deref()], " - ");

            let place = row.text(col::PLACE);
            let summary = row.text(col::ABSTRACT);
            txn.description = join_parts(
                [trading_type.as_deref(), place.as_deref(), summary.as_deref()],
                " - ",
            );

            txn.transaction_id = row.text(col::FLUID_NUMBER);

            out.push(txn);
        }

        finish(LAYOUT_ID, &grid, out)
    }
}
