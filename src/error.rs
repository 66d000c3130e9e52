//! Error taxonomy shared by the mapper, the mock store, cursors and drivers.

use thiserror::Error;

use crate::row::{RowTypeId, ValidationError};
use crate::value::ValueError;

/// Boxed error produced by an underlying driver.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the typed layer.
///
/// Driver errors and validation errors are carried transparently so callers
/// see the original message and source chain.
#[derive(Error, Debug)]
pub enum Error {
    #[error("row type `{name}` is not supported for {operation}")]
    RowTypeNotSupported {
        name: &'static str,
        operation: &'static str,
    },

    #[error("row type mismatch: expected {}, found {}", type_label(.expected), type_label(.actual))]
    RowTypeMismatch {
        expected: Option<RowTypeId>,
        actual: Option<RowTypeId>,
    },

    #[error("row type `{name}` expects {expected} columns, found {found}")]
    ColumnCountMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("mock store has no queued response (call #{call})")]
    StoreDataNotFound { call: usize },

    #[error(
        "mock response type mismatch on call #{call}: expected {}, found {}",
        type_label(.expected),
        type_label(.actual)
    )]
    ResponseTypeMismatch {
        expected: Option<RowTypeId>,
        actual: Option<RowTypeId>,
        call: usize,
    },

    #[error("fetch is unexpected; call execute_map to establish the row type and result first")]
    UnexpectedFetch,

    #[error("the csv header option cannot be disabled for frame responses; column names come from the header")]
    CsvHeaderOptionRequired,

    #[error("{resource} is closed")]
    Closed { resource: &'static str },

    #[error("invalid identifier `{0}`")]
    InvalidIdentifier(String),

    #[error("query did not complete after {polls} status polls")]
    QueryTimeout { polls: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Driver(BoxError),
}

impl Error {
    /// Wrap an arbitrary driver error without altering its message.
    pub fn driver<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Driver(error.into())
    }
}

fn type_label(row_type: &Option<RowTypeId>) -> &'static str {
    row_type.map_or("<raw rows>", |t| t.name())
}
