//! Deterministic transaction-type classification.
//!
//! Resolution order per row: an explicit debit/credit flag cell wins over
//! keyword inference from the description or business-type column. With
//! neither, a row that has an amount falls back to `Other`.

use bankscan_core::TransactionType;

/// Category -> keyword list, scanned in table order. The first category with
/// a keyword contained in the text wins.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTable {
    entries: &'static [(TransactionType, &'static [&'static str])],
}

impl KeywordTable {
    pub const fn new(entries: &'static [(TransactionType, &'static [&'static str])]) -> Self {
        Self { entries }
    }

    pub fn classify(&self, text: &str) -> Option<TransactionType> {
        if text.trim().is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(category, _)| *category)
    }
}

/// Literal debit/credit markers as a bank prints them in a flag column.
///
/// Markers are compared against the whole trimmed cell, so "借" never
/// matches inside "借记卡消费".
#[derive(Debug, Clone, Copy)]
pub struct FlagMarkers {
    pub credit: &'static [&'static str],
    pub debit: &'static [&'static str],
}

impl FlagMarkers {
    pub fn read(&self, cell: &str) -> Option<TransactionType> {
        let cell = cell.trim();
        if self.credit.iter().any(|m| *m == cell) {
            Some(TransactionType::Income)
        } else if self.debit.iter().any(|m| *m == cell) {
            Some(TransactionType::Expense)
        } else {
            None
        }
    }
}

/// Flag beats keyword; nothing at all means `Other`.
pub fn resolve(flag: Option<TransactionType>, keyword: Option<TransactionType>) -> TransactionType {
    flag.or(keyword).unwrap_or(TransactionType::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: KeywordTable = KeywordTable::new(&[
        (TransactionType::Income, &["转入", "利息", "代发工资"]),
        (TransactionType::Expense, &["转出", "消费", "手续费"]),
        (TransactionType::Transfer, &["转账", "汇款"]),
        (TransactionType::Other, &["冲正", "撤销"]),
    ]);

    const MARKERS: FlagMarkers = FlagMarkers {
        credit: &["贷", "Cr", "贷 Cr"],
        debit: &["借", "Dr", "借 Dr"],
    };

    #[test]
    fn test_keyword_order() {
        assert_eq!(TABLE.classify("银联消费"), Some(TransactionType::Expense));
        assert_eq!(TABLE.classify("跨行转账"), Some(TransactionType::Transfer));
        // Income listed first, so 代发工资 never reaches Transfer
        assert_eq!(TABLE.classify("代发工资"), Some(TransactionType::Income));
        assert_eq!(TABLE.classify("冲正交易"), Some(TransactionType::Other));
        assert_eq!(TABLE.classify("网银"), None);
        assert_eq!(TABLE.classify("  "), None);
    }

    #[test]
    fn test_flag_markers_exact() {
        assert_eq!(MARKERS.read(" 贷 "), Some(TransactionType::Income));
        assert_eq!(MARKERS.read("借 Dr"), Some(TransactionType::Expense));
        assert_eq!(MARKERS.read("借记卡消费"), None);
        assert_eq!(MARKERS.read(""), None);
    }

    #[test]
    fn test_resolution_order() {
        use TransactionType::*;
        assert_eq!(resolve(Some(Income), Some(Expense)), Income);
        assert_eq!(resolve(None, Some(Transfer)), Transfer);
        assert_eq!(resolve(None, None), Other);
    }
}
