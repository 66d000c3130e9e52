//! typed_sql library - typed rows over SQL drivers
//!
//! Wraps DB-API style driver cursors so that fetched rows come back as
//! declared Rust types, and provides a drop-in mock connection that replays
//! canned responses in FIFO order, a CSV recorder that captures real results
//! for later replay, and tag-based verification of write statements.

pub mod cli;
pub mod commands;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod db;
pub mod error;
pub mod frame;
pub mod mock;
pub mod output;
pub mod record;
pub mod row;
pub mod value;

#[cfg(feature = "async")]
pub mod aio;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod test_utils;

pub use connection::{connect, connect_from_env, Connection, LiveConnection};
pub use cursor::{Cursor, ExecuteCursor, FrameFetch, LiveCursor, MockCursor, RowCursor, SessionScoping};
pub use error::{Error, Result};
pub use frame::Frame;
pub use mock::MockConnection;
pub use record::{record_to_csv, RecordEnable, RecordOptions, RecordingCursor};
pub use row::{RowShapeKind, RowType};
pub use value::{RawRow, Value};

/// Everything needed to write typed queries and mock-backed tests.
pub mod prelude {
    pub use crate::connection::{connect, Connection};
    pub use crate::cursor::{ExecuteCursor, FrameFetch, RowCursor, SessionScoping};
    pub use crate::error::{Error, Result};
    pub use crate::frame::Frame;
    pub use crate::mock::{Delete, Insert, MockConnection, Update};
    pub use crate::params;
    pub use crate::record::{record_to_csv, RecordOptions};
    pub use crate::row::RowType;
    pub use crate::value::{RawRow, Value};
}
