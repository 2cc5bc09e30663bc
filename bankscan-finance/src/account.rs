//! Statement account-number recovery.
//!
//! Printed account numbers come back from OCR buried in addresses, phone
//! numbers and header prose. Recovery runs an ordered cascade and stops at
//! the first hit:
//!
//! 1. bank-card entities from the text-understanding collaborator
//! 2. labelled patterns ("卡号:", "账号：", "Account No." ...)
//! 3. bare 16-19 digit runs that pass the plausibility filter
//!
//! Strategies 2 and 3 each walk the text sources in a fixed order: header
//! cells, title lines, first table row, then everything concatenated.

use std::sync::OnceLock;

use bankscan_core::{Entity, RawTable};
use regex::Regex;

/// Issuer prefixes that win a tie between several plausible digit runs.
pub const KNOWN_PREFIXES: &[&str] = &["622", "621", "623", "625", "628", "620", "436", "601"];

/// A text strategy: given one source string, maybe produce an account number.
pub type TextStrategy<'a> = &'a dyn Fn(&str) -> Option<String>;

/// ASCII digits only: a plain run, or a printed number in groups of four
/// (`6222 0202 0011 2230`, a 19-digit tail group of three). The trailing
/// non-digit keeps a following date from being read as one more group.
const LABELLED_DIGITS: &str = r"([0-9]{4}(?: [0-9]{4}){2,}(?: [0-9]{1,3})?|[0-9]{8,})(?:[^0-9]|$)";

fn labelled_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"卡号/账号\s*[:：]\s*",
            r"[主副]?卡\s*号\s*[:：]\s*",
            r"[卡账]/号\s*[:：]\s*",
            r"账\s*[号户]\s*[:：]\s*",
            r"(?i)account\s*no\.?\s*[:：]?\s*",
        ]
        .iter()
        .map(|label| Regex::new(&format!("{label}{LABELLED_DIGITS}")).expect("account label regex"))
        .collect()
    })
}

fn digit_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("digit run regex"))
}

/// Luhn (mod 10) checksum over an ASCII digit string.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Each digit is the previous one plus `step` (mod 10), e.g. `1234567890123`.
fn is_sequential(digits: &[u8], step: u8) -> bool {
    digits.windows(2).all(|w| (w[0] + step) % 10 == w[1])
}

/// Reject phone numbers, placeholders and truncated runs.
///
/// Length 10-32, first digit non-zero, not all one digit, not a running
/// sequence up or down, and Luhn-valid at the common card lengths 16 and 19.
pub fn is_plausible_account(candidate: &str) -> bool {
    let len = candidate.len();
    if !(10..=32).contains(&len) || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u8> = candidate.bytes().map(|b| b - b'0').collect();
    if digits[0] == 0 {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }
    if is_sequential(&digits, 1) || is_sequential(&digits, 9) {
        return false;
    }
    if (len == 16 || len == 19) && !luhn_valid(candidate) {
        return false;
    }
    true
}

/// Strategy 1: the first bank-card entity, digits only.
pub fn entity_account(entities: &[Entity]) -> Option<String> {
    entities
        .iter()
        .filter(|e| e.is_bank_card())
        .map(|e| e.text.chars().filter(char::is_ascii_digit).collect::<String>())
        .find(|digits| !digits.is_empty())
}

/// Strategy 2: digits following a card/account label and a colon.
pub fn labelled_account(text: &str) -> Option<String> {
    labelled_res()
        .iter()
        .find_map(|re| re.captures(text).map(|caps| caps[1].replace(' ', "")))
}

/// Strategy 3: plausible bare 16-19 digit runs.
///
/// Several survivors: a known issuer prefix wins, otherwise the longest
/// (first seen on equal length).
pub fn bare_digit_account(text: &str, prefixes: &[&str]) -> Option<String> {
    let candidates: Vec<&str> = digit_run_re()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|d| (16..=19).contains(&d.len()))
        .filter(|d| is_plausible_account(d))
        .collect();

    if let Some(hit) = candidates
        .iter()
        .find(|d| prefixes.iter().any(|p| d.starts_with(p)))
    {
        return Some(hit.to_string());
    }

    candidates
        .iter()
        .copied()
        .fold(None::<&str>, |best, d| match best {
            Some(b) if b.len() >= d.len() => Some(b),
            _ => Some(d),
        })
        .map(str::to_string)
}

/// Text sources in search order: header cells, title lines, first body row,
/// then all text concatenated.
pub fn candidate_sources(table: &RawTable) -> Vec<String> {
    let mut sources: Vec<String> = table.header_texts().map(str::to_string).collect();
    sources.extend(table.title.iter().cloned());

    let first_row = table.body.iter().filter_map(|c| c.row).min();
    if let Some(first) = first_row {
        let mut cells: Vec<_> = table
            .body
            .iter()
            .filter(|c| c.row == Some(first))
            .collect();
        cells.sort_by_key(|c| c.col);
        let joined = cells
            .iter()
            .map(|c| c.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        sources.push(joined);
    }

    let everything = table
        .header_texts()
        .chain(table.title.iter().map(String::as_str))
        .chain(table.text_lines.iter().map(String::as_str))
        .chain(table.body.iter().map(|c| c.text.as_str()))
        .collect::<Vec<_>>()
        .join(" ");
    sources.push(everything);

    sources
}

/// Account-number recovery configured with a layout's issuer prefixes.
#[derive(Debug, Clone, Copy)]
pub struct AccountRecovery {
    prefixes: &'static [&'static str],
}

impl Default for AccountRecovery {
    fn default() -> Self {
        Self {
            prefixes: KNOWN_PREFIXES,
        }
    }
}

impl AccountRecovery {
    pub const fn with_prefixes(prefixes: &'static [&'static str]) -> Self {
        Self { prefixes }
    }

    /// Best-guess statement account number, or `None` on a miss.
    pub fn recover(&self, table: &RawTable) -> Option<String> {
        if let Some(found) = entity_account(&table.entities) {
            tracing::debug!(account = %found, strategy = "entity", "account number recovered");
            return Some(found);
        }

        let bare = |text: &str| bare_digit_account(text, self.prefixes);
        let strategies: [(&str, TextStrategy<'_>); 2] =
            [("labelled", &labelled_account), ("bare_digits", &bare)];
        let sources = candidate_sources(table);

        for (name, strategy) in strategies {
            if let Some(found) = sources.iter().find_map(|s| strategy(s.as_str())) {
                tracing::debug!(account = %found, strategy = name, "account number recovered");
                return Some(found);
            }
        }

        tracing::debug!("no account number recovered");
        None
    }
}
