//! End-to-end statement processing:
//! OCR → parse → entity annotation → clean → validate → hand-off record.

use bankscan_core::{check_batch, CandidateTransaction, Error, RawTable, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ocr::{EntityRecognizer, OcrEngine};
use crate::parsers::LayoutParser;
use crate::registry::ParserRegistry;

/// Validated batch ready for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedStatement {
    pub layout: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    pub account_number: Option<String>,
    pub transactions: Vec<CandidateTransaction>,
}

/// Run a statement image through OCR and the named layout.
pub fn process_statement(
    registry: &ParserRegistry,
    layout: &str,
    ocr: &dyn OcrEngine,
    entities: Option<&dyn EntityRecognizer>,
    image: &[u8],
    source_ref: Option<&str>,
) -> Result<ProcessedStatement> {
    let parser = registry.get(layout)?;
    tracing::info!(layout, bytes = image.len(), "recognizing statement image");
    let response = ocr
        .recognize_table(image)
        .map_err(|e| e.in_layout(layout))?;
    run(layout, parser.as_ref(), &response, entities, source_ref)
}

/// Same as [`process_statement`] for an OCR response captured earlier.
pub fn process_ocr_output(
    registry: &ParserRegistry,
    layout: &str,
    response: &Value,
    entities: Option<&dyn EntityRecognizer>,
    source_ref: Option<&str>,
) -> Result<ProcessedStatement> {
    let parser = registry.get(layout)?;
    run(layout, parser.as_ref(), response, entities, source_ref)
}

/// `layout` is the id the caller asked for, which is what gets recorded;
/// one parser type may be registered under several ids.
fn run(
    layout: &str,
    parser: &dyn LayoutParser,
    response: &Value,
    entities: Option<&dyn EntityRecognizer>,
    source_ref: Option<&str>,
) -> Result<ProcessedStatement> {
    tracing::debug!(layout, parser = parser.layout_id(), ocr = %response, "ocr response");

    let mut table = parser.parse(response).map_err(|e| e.in_layout(layout))?;
    if let Some(recognizer) = entities {
        annotate(&mut table, recognizer);
    }

    let transactions = parser.clean_data(&table).map_err(|e| e.in_layout(layout))?;

    if !parser.validate_data(&transactions) {
        let reason = check_batch(&transactions)
            .err()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "layout validation failed".to_string());
        return Err(Error::ValidationRejected {
            layout: layout.to_string(),
            count: transactions.len(),
            reason,
        });
    }

    let account_number = transactions.iter().find_map(|t| t.account_number.clone());
    tracing::info!(
        layout,
        source_ref,
        count = transactions.len(),
        account = account_number.as_deref().unwrap_or("-"),
        "statement processed"
    );

    Ok(ProcessedStatement {
        layout: layout.to_string(),
        source_ref: source_ref.map(str::to_string),
        account_number,
        transactions,
    })
}

/// Tag bank-card entities in header text. Recognizer failures only cost the
/// first account-recovery strategy, so they are logged and skipped.
fn annotate(table: &mut RawTable, recognizer: &dyn EntityRecognizer) {
    let texts: Vec<String> = table
        .header_texts()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .collect();

    for text in texts {
        match recognizer.recognize(&text) {
            Ok(found) => table.entities.extend(found),
            Err(e) => tracing::warn!(error = %e, "entity recognition failed, continuing without"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankscan_core::Entity;
    use serde_json::json;

    struct Cards;

    impl EntityRecognizer for Cards {
        fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
            if text.contains("尊敬的客户") {
                return Err(Error::Ocr("quota".into()));
            }
            Ok(vec![Entity {
                kind: Entity::BANK_CARD.to_string(),
                text: "6222 0202 0011 2230".to_string(),
            }])
        }
    }

    fn response() -> Value {
        json!({
            "tables_result": [{
                "header": [{"words": "尊敬的客户"}, {"words": "北京银行对账单"}],
                "body": [
                    {"row_start": 0, "col_start": 0, "words": "交易日期"},
                    {"row_start": 1, "col_start": 0, "words": "20230105"},
                    {"row_start": 1, "col_start": 1, "words": "消费"},
                    {"row_start": 1, "col_start": 2, "words": "支出"},
                    {"row_start": 1, "col_start": 3, "words": "12.00"}
                ]
            }]
        })
    }

    #[test]
    fn test_entities_feed_account_recovery() {
        let registry = ParserRegistry::with_default_layouts();
        let out = process_ocr_output(
            &registry,
            "beijing_bank",
            &response(),
            Some(&Cards as &dyn EntityRecognizer),
            Some("s3://x"),
        )
        .unwrap();
        assert_eq!(out.account_number.as_deref(), Some("6222020200112230"));
        assert_eq!(out.source_ref.as_deref(), Some("s3://x"));
        assert_eq!(out.transactions.len(), 1);
    }

    #[test]
    fn test_errors_name_the_layout() {
        let registry = ParserRegistry::with_default_layouts();
        let err = process_ocr_output(&registry, "ceb_v2", &json!({"tables_result": []}), None, None)
            .unwrap_err();
        assert_eq!(err.layout(), Some("ceb_v2"));
    }
}
