//! Error types for binding resolution and row decoding.

use thiserror::Error;

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by fallible setters and external executors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for metadata resolution, decoding and the repository facade.
#[derive(Error, Debug)]
pub enum Error {
    /// Target type declares neither `entity()` nor `mapped_base()`.
    #[error("Type {type_name} is not marked as an entity or a mapped base")]
    MissingMarker { type_name: &'static str },

    /// A base in the chain of `target` is not marked as a mapped base.
    #[error("Base {base} of {target} is not marked as a mapped base")]
    UnmarkedBase {
        base: &'static str,
        target: &'static str,
    },

    /// Target type declares no zero-argument constructor.
    #[error("Type {type_name} declares no zero-argument constructor")]
    NoDefaultConstructor { type_name: &'static str },

    /// A level of the chain called `extends` more than once.
    #[error("Type {type_name} declares more than one base")]
    MultipleBases { type_name: &'static str },

    /// A type reappears in its own base chain.
    #[error("Type {type_name} appears twice in the base chain of {target}")]
    CyclicBase {
        type_name: &'static str,
        target: &'static str,
    },

    /// ARRAY column bound to a non-sequence target.
    #[error("ARRAY column {column} is bound to {binding} of non-sequence type {target}")]
    ArrayToScalarBinding {
        column: String,
        binding: &'static str,
        target: &'static str,
    },

    /// Required field binding received NULL.
    #[error("Row {row}: NULL in column {column} for required field {field}")]
    NullRequiredField {
        field: &'static str,
        column: String,
        row: u64,
    },

    /// Required setter parameter received NULL.
    #[error("Row {row}: NULL in column {column} for required parameter of {method}")]
    NullRequiredParameter {
        method: &'static str,
        column: String,
        row: u64,
    },

    /// Bound column reports a SQL type outside the conversion table.
    #[error("Unsupported SQL type {type_name} ({type_code}) in column {column}")]
    UnsupportedColumnType {
        column: String,
        type_code: i32,
        type_name: String,
    },

    /// Converted value cannot be assigned to the binding's target type.
    #[error("Cannot assign column {column} to {binding}: {message}")]
    ValueConversion {
        column: String,
        binding: &'static str,
        message: String,
    },

    /// Setter rejected the value.
    #[error("Setter {method} failed for column {column}: {source}")]
    Setter {
        method: &'static str,
        column: String,
        #[source]
        source: BoxError,
    },

    /// Column index out of bounds.
    #[error("Column index {index} out of bounds (columns: {count})")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    /// Row width does not match the column descriptors.
    #[error("Row has {actual} values but result has {expected} columns")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// Typed getter could not read the cell as the requested type.
    #[error("Type conversion error: {message}")]
    TypeConversion { message: String },

    /// Error reported by the query-execution layer.
    #[error("Driver error: {source}")]
    Driver {
        #[source]
        source: BoxError,
    },

    /// Cursor was read after it was closed.
    #[error("Cursor closed")]
    CursorClosed,

    /// Query expected at least one row but returned none.
    #[error("Query returned no rows")]
    EmptyResult,

    /// Positional and named parameters were mixed in one statement.
    #[error("Cannot add a {requested} parameter to {existing} parameters")]
    MixedParameters {
        existing: &'static str,
        requested: &'static str,
    },

    /// Decoding into `type_name` failed.
    #[error("Failed to map row{} into {type_name}: {source}", row.map(|r| format!(" {}", r)).unwrap_or_default())]
    RowMapping {
        type_name: &'static str,
        row: Option<u64>,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a type conversion error.
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// Wrap an error raised by the query-execution layer.
    pub fn driver(source: impl Into<BoxError>) -> Self {
        Self::Driver {
            source: source.into(),
        }
    }

    /// Whether this error comes from a mapping definition mistake rather than data.
    ///
    /// Definition errors fail the same way on every call.
    pub fn is_definition_error(&self) -> bool {
        match self {
            Error::MissingMarker { .. }
            | Error::UnmarkedBase { .. }
            | Error::NoDefaultConstructor { .. }
            | Error::MultipleBases { .. }
            | Error::CyclicBase { .. }
            | Error::ArrayToScalarBinding { .. } => true,
            Error::RowMapping { source, .. } => source.is_definition_error(),
            _ => false,
        }
    }

    /// The underlying error, looking through `RowMapping`.
    pub fn cause(&self) -> &Error {
        match self {
            Error::RowMapping { source, .. } => source.cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_mapping_display() {
        let err = Error::RowMapping {
            type_name: "app::User",
            row: Some(3),
            source: Box::new(Error::NullRequiredField {
                field: "id",
                column: "user_id".to_string(),
                row: 3,
            }),
        };
        assert_eq!(
            err.to_string(),
            "Failed to map row 3 into app::User: Row 3: NULL in column user_id for required field id"
        );

        let err = Error::RowMapping {
            type_name: "app::User",
            row: None,
            source: Box::new(Error::CursorClosed),
        };
        assert_eq!(err.to_string(), "Failed to map row into app::User: Cursor closed");
    }

    #[test]
    fn test_cause_and_classification() {
        let err = Error::RowMapping {
            type_name: "app::User",
            row: Some(1),
            source: Box::new(Error::ArrayToScalarBinding {
                column: "tags".to_string(),
                binding: "tags",
                target: "alloc::string::String",
            }),
        };
        assert!(err.is_definition_error());
        assert!(matches!(err.cause(), Error::ArrayToScalarBinding { .. }));

        assert!(!Error::EmptyResult.is_definition_error());
        assert!(matches!(Error::EmptyResult.cause(), Error::EmptyResult));
    }
}
