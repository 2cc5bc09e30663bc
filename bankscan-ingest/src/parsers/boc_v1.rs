//! Bank of Communications, layout version 1.
//! (交通银行; `boc` here is not Bank of China.)
//!
//! The body starts with account/summary rows; transactions begin after the
//! row carrying the data header:
//!   序号 | 交易日期 | 交易地点 | 交易方式 | 收支标志 | 交易金额 | 余额
//! The header is the first row naming at least two of those columns. Page
//! footers ("End Of Page", print timestamps, currency totals) are
//! interleaved with data rows.

use bankscan_core::normalize::{parse_amount, parse_date};
use bankscan_core::{build_grid, CandidateTransaction, Error, RawTable, Result, TransactionType};
use bankscan_finance::{resolve, AccountRecovery, FlagMarkers, KeywordTable};

use super::{data_header_row, dropped, finish, join_parts, LayoutParser};

const LAYOUT_ID: &str = "boc_v1";

const HEADER_KEYWORDS: &[&str] = &["序号", "交易日期", "交易地点", "交易方式", "收支标志", "交易金额", "余额"];

const FOOTER_MARKERS: &[&str] = &["End Of Page", "打印时间", "币种", "付方/收方额汇总"];

const ONLINE_PLACES: &[&str] = &["网上支付", "网上转账"];

const FLAGS: FlagMarkers = FlagMarkers {
    credit: &["收(Cr)", "收（Cr）", "Cr", "贷", "收"],
    debit: &["付(Dr)", "付（Dr）", "Dr", "借", "付"],
};

const KEYWORDS: KeywordTable = KeywordTable::new(&[
    (TransactionType::Income, &["收入", "转入", "存入", "退款", "利息", "红包", "汇入", "代发工资"]),
    (TransactionType::Expense, &["支出", "转出", "消费", "取款", "手续费", "年费", "跨行汇款"]),
    (TransactionType::Transfer, &["转账", "汇款", "代付", "代发"]),
    (TransactionType::Other, &["冲正", "撤销", "退回"]),
]);

mod col {
    pub const SERIAL: usize = 0;
    pub const DATE: usize = 1;
    pub const PLACE: usize = 2;
    pub const METHOD: usize = 3;
    pub const FLAG: usize = 4;
    pub const AMOUNT: usize = 5;
    pub const BALANCE: usize = 6;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BocV1;

impl LayoutParser for BocV1 {
    fn layout_id(&self) -> &'static str {
        LAYOUT_ID
    }

    fn clean_data(&self, table: &RawTable) -> Result<Vec<CandidateTransaction>> {
        let grid = build_grid(&table.body)?;
        let account = AccountRecovery::default().recover(table);

        let Some(data_header) = data_header_row(&grid, HEADER_KEYWORDS, 2) else {
            return Err(Error::HeaderRowNotFound {
                layout: LAYOUT_ID.to_string(),
            });
        };

        let mut out = Vec::new();

        for row in grid.rows().filter(|r| r.index > data_header) {
            let first = row.text(col::SERIAL).unwrap_or_default();
            if FOOTER_MARKERS.iter().any(|m| first.contains(m)) {
                continue;
            }
            if first.is_empty() || !first.chars().all(|c| c.is_ascii_digit()) {
                dropped(LAYOUT_ID, row, "serial is not numeric");
                continue;
            }

            let mut txn = CandidateTransaction::template(account.as_deref());
            txn.transaction_id = Some(first);

            let Some(date) = row.text(col::DATE).as_deref().and_then(parse_date) else {
                dropped(LAYOUT_ID, row, "no date");
                continue;
            };
            txn.transaction_date = Some(date);

            let place = row.text(col::PLACE);
            let method = row.text(col::METHOD);
            txn.description = join_parts([method.as_deref(), place.as_deref()], " - ");
            if let Some(p) = place.as_deref() {
                if ONLINE_PLACES.iter().any(|k| p.contains(k)) {
                    txn.counterparty = Some(p.to_string());
                }
            }

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
