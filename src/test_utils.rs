//! Shared test utilities for unit tests.
//!
//! Row types used across modules plus filesystem helpers.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::row::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
}

crate::row_record!(Person { id, name });

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub balance: f64,
}

impl Account {
    fn check(&self) -> Result<(), ValidationError> {
        if self.balance < 0.0 {
            return Err(ValidationError::field("Account", "balance", "must not be negative"));
        }
        Ok(())
    }
}

crate::row_model!(Account { id, balance }, validator = Account::check);

/// Run `f` with the process working directory set to `dir`.
///
/// Callers must be `#[serial]`; the working directory is process-wide.
pub fn with_current_dir<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
    let old_dir = std::env::current_dir().expect("Failed to read current dir");
    std::env::set_current_dir(dir).expect("Failed to enter temp dir");
    let result = f();
    std::env::set_current_dir(old_dir).expect("Failed to restore current dir");
    result
}

/// Write `contents` to `data.csv` in a fresh temporary directory.
///
/// The directory is removed when the returned guard drops.
pub fn write_csv(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("data.csv");
    let mut file = std::fs::File::create(&path).expect("Failed to create csv file");
    file.write_all(contents.as_bytes()).expect("Failed to write csv file");
    (dir, path)
}
