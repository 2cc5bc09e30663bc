//! Bank of Communications, layout version 3.
//! (交通银行; `boc` here is not Bank of China.)
//!
//!   交易日期 | 交易地点 | 交易方式 | 借贷标志 | 交易金额 | 余额

use bankscan_core::normalize::{parse_amount, parse_date};
use bankscan_core::{build_grid, CandidateTransaction, RawTable, Result, TransactionType};
use bankscan_finance::{resolve, AccountRecovery, FlagMarkers, KeywordTable};

use super::{dropped, finish, header_rows, join_parts, LayoutParser};

const LAYOUT_ID: &str = "boc_v3";

const HEADER_KEYWORDS: &[&str] = &["交易日期", "交易地点", "交易方式", "借贷标志", "交易金额", "余额"];

const FLAGS: FlagMarkers = FlagMarkers {
    credit: &["贷 Cr", "贷Cr", "贷", "Cr"],
    debit: &["借 Dr", "借Dr", "借", "Dr"],
};

const KEYWORDS: KeywordTable = KeywordTable::new(&[
    (TransactionType::Income, &["收入", "转入", "存入", "退款", "利息", "红包", "汇入", "代发工资"]),
    (TransactionType::Expense, &["支出", "转出", "消费", "取款", "手续费", "年费", "跨行汇款"]),
    (TransactionType::Transfer, &["转账", "汇款", "代付", "代发"]),
    (TransactionType::Other, &["冲正", "撤销", "退回"]),
]);

mod col {
    pub const DATE: usize = 0;
    pub const PLACE: usize = 1;
    pub const METHOD: usize = 2;
    pub const FLAG: usize = 3;
    pub const AMOUNT: usize = 4;
    pub const BALANCE: usize = 5;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BocV3;

impl LayoutParser for BocV3 {
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

            let place = row.text(col::PLACE);
            let method = row.text(col::METHOD);
            txn.description = join_parts([method.as_deref(), place.as_deref()], " - ");

            let Some(amount) = row.text(col::AMOUNT).as_deref().and_then(parse_amount) else {
                dropped(LAYOUT_ID, row, "no amount");
                continue;
            };
            txn.amount = Some(amount.abs());

            let flag = row.text(col::FLAG).and_then(|f| FLAGS.read(&f));
            let keyword = method.as_deref().and_then(|m| KEYWORDS.classify(m));
            txn.transaction_type = Some(resolve(flag, keyword));

            txn.balance = row.text(col::BALANCE).as_deref().and_then(parse_amount);

            out.push(txn);
        }

        finish(LAYOUT_ID, &grid, out)
    }
}
