use thiserror::Error;

/// Errors that can occur in the kiji pipeline.
#[derive(Debug, Error)]
pub enum KijiError {
    /// An underlying file could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted vocabulary file could not be parsed.
    #[error("vocabulary file error: {0}")]
    VocabFile(#[from] serde_json::Error),

    /// A data file is missing a required column.
    #[error("missing column {column:?} in header {header:?}")]
    MissingColumn {
        /// The column that was requested.
        column: String,
        /// The header line that was actually present.
        header: String,
    },

    /// A data row has fewer fields than the header declares.
    #[error("malformed record on line {line}: expected {expected} fields, got {got}")]
    MalformedRecord {
        /// 1-based line number in the input file.
        line: usize,
        /// Field count declared by the header.
        expected: usize,
        /// Field count found on the row.
        got: usize,
    },

    /// A label was encountered that is absent from the reference label index.
    ///
    /// Raised when encoding dev/test data against a label index derived from
    /// the training split. Class IDs must stay aligned across splits, so an
    /// unseen label is rejected rather than silently renumbered.
    #[error("unknown label {label:?}, not present in the training label set")]
    UnknownLabel {
        /// The offending label value.
        label: String,
    },
}

/// Result type alias for kiji pipeline operations.
pub type Result<T> = std::result::Result<T, KijiError>;
