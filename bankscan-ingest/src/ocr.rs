//! OCR collaborator boundary.
//!
//! The table-recognition service answers with JSON shaped like:
//!
//! ```text
//! { "tables_result": [ { "header": [{"words": ..}],
//!                        "body":   [{"row_start": 0, "col_start": 0, "words": ".."}] } ],
//!   "words_result": [ {"words": ".."} ],
//!   "title": [ {"words": ".."} ] }
//! ```
//!
//! Only the first table is used. Everything here is boundary validation; no
//! business rules live in this module.

use bankscan_core::{Entity, Error, RawCell, RawTable, Result};
use serde_json::Value;

/// Table/text recognition collaborator. Implementations own their own
/// transport, timeouts and retries.
pub trait OcrEngine {
    fn recognize_table(&self, image: &[u8]) -> Result<Value>;
}

/// Text-understanding collaborator used to tag bank-card entities.
pub trait EntityRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>>;
}

/// Pull the single relevant table block out of an OCR response.
pub fn extract_table(response: &Value) -> Result<RawTable> {
    let Some(root) = response.as_object() else {
        return Err(Error::UnrecognizedTable(format!(
            "response is not a mapping ({})",
            kind_of(response)
        )));
    };

    if let Some(code) = root.get("error_code") {
        let msg = root
            .get("error_msg")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(Error::Ocr(format!("{msg} (code {code})")));
    }

    let tables = root
        .get("tables_result")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::UnrecognizedTable("missing tables_result".into()))?;

    let table = tables
        .first()
        .ok_or_else(|| Error::UnrecognizedTable("tables_result is empty".into()))?;

    let Some(block) = table.as_object() else {
        return Err(Error::UnrecognizedTable(format!(
            "table block is not a mapping ({})",
            kind_of(table)
        )));
    };

    let mut title = words_of(root.get("title"));
    title.extend(words_of(block.get("title")));

    Ok(RawTable {
        header: cells_of(block.get("header")),
        body: cells_of(block.get("body")),
        title,
        text_lines: words_of(root.get("words_result")),
        entities: Vec::new(),
    })
}

fn cells_of(v: Option<&Value>) -> Vec<RawCell> {
    v.and_then(Value::as_array)
        .map(|items| items.iter().filter_map(cell_of).collect())
        .unwrap_or_default()
}

/// A cell needs text; positions are optional and checked by the grid.
fn cell_of(v: &Value) -> Option<RawCell> {
    let obj = v.as_object()?;
    let text = obj.get("words")?.as_str()?.to_string();
    let index = |key: &str| {
        obj.get(key)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    };
    let confidence = obj
        .get("probability")
        .or_else(|| obj.get("confidence"))
        .and_then(Value::as_f64)
        .map(|p| p as f32);

    Some(RawCell {
        row: index("row_start"),
        col: index("col_start"),
        text,
        confidence,
    })
}

fn words_of(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => o.get("words").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_first_table() {
        let resp = json!({
            "tables_result": [
                {
                    "header": [{"words": "卡号：6222020200112230"}],
                    "body": [
                        {"row_start": 0, "col_start": 0, "words": "交易日期", "probability": 0.98},
                        {"row_start": 1, "col_start": 0, "words": "20230105"}
                    ]
                },
                { "body": [{"row_start": 0, "col_start": 0, "words": "ignored"}] }
            ],
            "words_result": [{"words": "北京银行 个人账户明细"}]
        });
        let table = extract_table(&resp).unwrap();
        assert_eq!(table.header.len(), 1);
        assert_eq!(table.body.len(), 2);
        assert_eq!(table.body[0].confidence, Some(0.98));
        assert_eq!(table.body[1].row, Some(1));
        assert_eq!(table.text_lines, vec!["北京银行 个人账户明细".to_string()]);
    }

    #[test]
    fn test_keeps_cells_without_position() {
        let resp = json!({"tables_result": [{"body": [{"words": "floating"}]}]});
        let table = extract_table(&resp).unwrap();
        assert_eq!(table.body[0].row, None);
        assert_eq!(table.body[0].col, None);
    }

    #[test]
    fn test_rejects_non_mapping() {
        let err = extract_table(&json!(["not", "a", "mapping"])).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedTable(_)));
    }

    #[test]
    fn test_rejects_missing_or_empty_tables() {
        assert!(matches!(
            extract_table(&json!({"words_result": []})),
            Err(Error::UnrecognizedTable(_))
        ));
        assert!(matches!(
            extract_table(&json!({"tables_result": []})),
            Err(Error::UnrecognizedTable(_))
        ));
        assert!(matches!(
            extract_table(&json!({"tables_result": ["text"]})),
            Err(Error::UnrecognizedTable(_))
        ));
    }

    #[test]
    fn test_surfaces_service_error() {
        let resp = json!({"error_code": 17, "error_msg": "Open api daily request limit reached"});
        let err = extract_table(&resp).unwrap_err();
        assert!(matches!(err, Error::Ocr(ref m) if m.contains("daily request limit")));
    }
}
