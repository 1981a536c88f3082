//! # Error Types
//!
//! Only structural failures are errors here. Expected misses (no match at a
//! grounding tier, a numeral that does not normalize, a failed execution)
//! are carried as `Option`/tagged-union values by the functions that
//! produce them.

/// Errors from sqldecode operations.
#[derive(Debug, thiserror::Error)]
pub enum SqlDecodeError {
    /// A table declared a column type other than `text` or `real`.
    #[error("unknown column type {tag:?} for column {column}")]
    UnknownColumnType {
        /// The column index.
        column: usize,

        /// The unrecognized type tag.
        tag: String,
    },

    /// A scoring mode other than `train` or `test`.
    #[error("invalid scoring mode {0:?}; expected \"train\" or \"test\"")]
    InvalidMode(String),

    /// Score tensors or parallel fields disagree in shape.
    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// What was being checked.
        context: &'static str,

        /// The expected length.
        expected: usize,

        /// The observed length.
        found: usize,
    },

    /// A column index past the end of a table header.
    #[error("column {column} out of range for table with {num_columns} columns")]
    ColumnOutOfRange {
        /// The offending column.
        column: usize,

        /// The number of columns in the table.
        num_columns: usize,
    },

    /// An index that is not a member of a field enumeration.
    #[error("index {index} is not a valid {field}")]
    InvalidFieldIndex {
        /// The enumeration name.
        field: &'static str,

        /// The offending index.
        index: usize,
    },

    /// A table id with no entry in the table store.
    #[error("unknown table id {0:?}")]
    UnknownTable(String),

    /// A span that does not fit inside its token sequence.
    #[error("invalid span [{start}, {end}] over {len} tokens")]
    InvalidSpan {
        /// Span start.
        start: usize,

        /// Span end (inclusive).
        end: usize,

        /// The token sequence length.
        len: usize,
    },

    /// A decoded condition value that is not a span where one is required.
    #[error("condition {slot} does not carry a value span")]
    MissingValueSpan {
        /// The condition slot.
        slot: usize,
    },

    /// A gold value could not be located in the question tokens.
    #[error("value tokens {value:?} not found in question")]
    ValueNotFound {
        /// The value tokens.
        value: Vec<String>,
    },

    /// A WHERE segment of a reference SQL token stream with no operator token.
    #[error("no comparison operator in WHERE segment {tokens:?}")]
    MissingOperator {
        /// The segment tokens.
        tokens: Vec<String>,
    },

    /// A numeral string outside the convertible domain.
    #[error("invalid numeral {0:?}")]
    InvalidNumeral(String),

    /// Error from the sub-word tokenizer boundary.
    #[error("tokenizer: {0}")]
    Tokenizer(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SqlDecodeError {
    /// Whether the error invalidates a whole run rather than one example.
    ///
    /// Malformed table schemas and unknown scoring modes are configuration
    /// errors; everything else is scoped to the example that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SqlDecodeError::UnknownColumnType { .. } | SqlDecodeError::InvalidMode(_)
        )
    }
}

/// Result type for sqldecode operations.
pub type SDResult<T> = core::result::Result<T, SqlDecodeError>;
