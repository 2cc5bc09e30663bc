//! Error taxonomy for the statement normalization layer.
//!
//! Every variant is recoverable by the caller; none of them should take a
//! worker down. Per-row extraction failures never surface here: layouts drop
//! the offending row and carry on.

/// Result alias used across the bankscan crates.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No parser is registered under this layout id
    #[error("unsupported layout: {0}")]
    UnsupportedLayout(String),

    /// The OCR response held no table, or was not shaped like one
    #[error("no table recognised in OCR response: {0}")]
    UnrecognizedTable(String),

    /// A table was found but none of its cells carried a row/column position
    #[error("table contains no usable cells")]
    EmptyGrid,

    /// Layouts that anchor on a transaction header row could not find it
    #[error("layout {layout}: transaction header row not found")]
    HeaderRowNotFound { layout: String },

    /// The table was read but zero rows survived field mapping
    #[error("layout {layout}: no transactions extracted from {rows} table rows")]
    NoTransactionsExtracted { layout: String, rows: usize },

    /// The batch was produced but failed the validation gate
    #[error("layout {layout}: batch of {count} transactions rejected ({reason})")]
    ValidationRejected {
        layout: String,
        count: usize,
        reason: String,
    },

    /// The OCR or text-understanding collaborator reported a failure
    #[error("OCR collaborator failed: {0}")]
    Ocr(String),

    /// A layout-agnostic failure raised while processing under `layout`
    #[error("layout {layout}: {source}")]
    InLayout {
        layout: String,
        #[source]
        source: Box<Error>,
    },
}

/// What a caller is expected to do next with a failed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remedy {
    /// Re-scan or re-OCR the image (possibly with another engine)
    Rescan,
    /// The table was readable; try a different layout id
    TryAnotherLayout,
    /// Caller bug or missing registration
    FixRequest,
}

impl Error {
    pub fn remedy(&self) -> Remedy {
        match self {
            Error::UnrecognizedTable(_) | Error::EmptyGrid | Error::Ocr(_) => Remedy::Rescan,
            Error::HeaderRowNotFound { .. }
            | Error::NoTransactionsExtracted { .. }
            | Error::ValidationRejected { .. } => Remedy::TryAnotherLayout,
            Error::UnsupportedLayout(_) => Remedy::FixRequest,
            Error::InLayout { source, .. } => source.remedy(),
        }
    }

    /// Layout id this failure was raised under, if known.
    pub fn layout(&self) -> Option<&str> {
        match self {
            Error::UnsupportedLayout(layout)
            | Error::HeaderRowNotFound { layout }
            | Error::NoTransactionsExtracted { layout, .. }
            | Error::ValidationRejected { layout, .. }
            | Error::InLayout { layout, .. } => Some(layout),
            Error::UnrecognizedTable(_) | Error::EmptyGrid | Error::Ocr(_) => None,
        }
    }

    /// Attach `layout` unless the error already names one.
    pub fn in_layout(self, layout: &str) -> Error {
        if self.layout().is_some() {
            return self;
        }
        Error::InLayout {
            layout: layout.to_string(),
            source: Box::new(self),
        }
    }
}
