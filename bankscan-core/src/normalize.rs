//! Pure value normalizers for OCR cell text: dates, amounts and free text.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Amounts at or above this magnitude are treated as OCR/merge artifacts.
const AMOUNT_CEILING: i64 = 1_000_000_000_000;

/// Chinese digit glyphs OCR engines substitute for printed digits.
const CN_DIGITS: &[(char, char)] = &[
    ('零', '0'),
    ('〇', '0'),
    ('一', '1'),
    ('二', '2'),
    ('三', '3'),
    ('四', '4'),
    ('五', '5'),
    ('六', '6'),
    ('七', '7'),
    ('八', '8'),
    ('九', '9'),
];

/// Parse a `YYYYMMDD` date, ignoring every non-digit character.
///
/// `"2023-01-05"`, `"2023年01月05日"` and `"20230105"` all normalize to the
/// same date. Anything that does not reduce to exactly eight digits, or is
/// not a real calendar date, yields `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(&digits, "%Y%m%d").ok()
}

/// Parse a signed monetary amount out of noisy OCR text.
///
/// Strips currency symbols, ASCII and full-width thousand separators and
/// whitespace, maps Chinese digit glyphs, keeps only digits, `.` and `-`,
/// and keeps the first of several decimal points.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let mut cleaned = String::with_capacity(s.len());
    let mut seen_dot = false;

    for ch in s.chars() {
        let ch = CN_DIGITS
            .iter()
            .find(|(cn, _)| *cn == ch)
            .map(|(_, ascii)| *ascii)
            .unwrap_or(ch);
        match ch {
            '0'..='9' | '-' => cleaned.push(ch),
            '.' if !seen_dot => {
                seen_dot = true;
                cleaned.push('.');
            }
            // ¥ ￥ , ， whitespace and everything else
            _ => {}
        }
    }

    if cleaned.is_empty() {
        return None;
    }

    let amount = Decimal::from_str(&cleaned).ok()?;
    if amount.abs() >= Decimal::from(AMOUNT_CEILING) {
        tracing::warn!(raw = s, %amount, "amount above plausibility ceiling, discarded");
        return None;
    }
    Some(amount)
}

/// Collapse whitespace runs to a single space and trim.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First physical line of a multi-line OCR cell, trimmed.
pub fn primary_line(s: &str) -> &str {
    s.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

/// Drop punctuation, keeping letters, digits (CJK included), `_` and single
/// spaces.
pub fn strip_punctuation(s: &str) -> String {
    let kept: String = s
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    normalize_text(&kept)
}

/// Empty strings become `None`; everything else is whitespace-normalized.
pub fn non_empty(s: &str) -> Option<String> {
    let t = normalize_text(s);
    (!t.is_empty()).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_date_variants() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(parse_date("20230105"), Some(d));
        assert_eq!(parse_date("2023-01-05"), Some(d));
        assert_eq!(parse_date("2023年01月05日"), Some(d));
        assert_eq!(parse_date(" 2023/01/05 "), Some(d));
    }

    #[test]
    fn test_parse_date_rejects_bad_input() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("交易日期"), None);
        assert_eq!(parse_date("2023015"), None);
        assert_eq!(parse_date("20230105 10:22:01"), None);
        assert_eq!(parse_date("20231305"), None);
        assert_eq!(parse_date("20230230"), None);
    }

    #[test]
    fn test_parse_amount_separators_and_symbols() {
        assert_eq!(parse_amount("¥1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("￥1，234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1 234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1234.56"), parse_amount("¥1,234.56"));
    }

    #[test]
    fn test_parse_amount_sign_and_glyphs() {
        assert_eq!(parse_amount("-50.00"), Some(dec("-50.00")));
        assert_eq!(parse_amount("一二三.五"), Some(dec("123.5")));
        assert_eq!(parse_amount("1.2.3"), Some(dec("1.23")));
        assert_eq!(parse_amount("RMB 88.00元"), Some(dec("88.00")));
    }

    #[test]
    fn test_parse_amount_rejects_garbage_and_huge() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("余额"), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("12-34"), None);
        assert_eq!(parse_amount("1000000000000"), None);
        assert_eq!(parse_amount("999999999999.99"), Some(dec("999999999999.99")));
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(normalize_text("  网上 \n  支付\t宝 "), "网上 支付 宝");
        assert_eq!(primary_line("\n 20230105 \n20230106"), "20230105");
        assert_eq!(strip_punctuation("张三（北京）-- 有限公司!"), "张三北京 有限公司");
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(" 利息 "), Some("利息".to_string()));
    }
}
