//! bankscan-ingest: OCR boundary, per-bank layout parsers, the layout
//! registry and the statement processing pipeline.

pub mod ocr;
pub mod parsers;
pub mod pipeline;
pub mod registry;

pub use ocr::{extract_table, EntityRecognizer, OcrEngine};
pub use parsers::LayoutParser;
pub use pipeline::{process_ocr_output, process_statement, ProcessedStatement};
pub use registry::{default_registry, ParserRegistry};
