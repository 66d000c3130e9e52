//! Mock substitution for tests.
//!
//! A [`MockConnection`] owns one [`MockStore`] of canned responses. Each
//! execute on one of its cursors consumes the head of the queue and checks
//! it against the row type (or write tag) being executed.

mod connection;
pub(crate) mod store;
mod tag;

pub use connection::MockConnection;
pub use store::{MockResponse, MockStore, SharedStore};
pub use tag::{Delete, Insert, Tag, Update, WriteKind};
