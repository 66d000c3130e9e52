use std::error::Error;

use serde::Serialize;

use super::RecordCmd;
use crate::commands::{collect_rows, parse_param, Execute};
use crate::connection::{Connection, LiveConnection};
use crate::cursor::RowCursor;
use crate::db::DatabaseConfig;
use crate::record::{record_to_csv, RecordOptions};
use crate::value::Value;

/// Result of the record command execution
#[derive(Debug, Clone, Serialize)]
pub struct RecordResult {
    pub path: String,
    pub recorded: bool,
    pub fetched: usize,
    pub written: usize,
}

impl Execute for RecordCmd {
    type Output = RecordResult;

    fn execute(self, database: &DatabaseConfig) -> Result<Self::Output, Box<dyn Error>> {
        let params: Vec<Value> = self.params.iter().map(|p| parse_param(p)).collect();
        let options = RecordOptions {
            enable: self.enable.into(),
            limit: self.limit,
            header: !self.no_header,
        };

        let mut conn = LiveConnection::new(database.connect()?);
        let cursor = conn.execute(&self.sql, &params)?;
        let columns = cursor.description().unwrap_or_default();

        let mut recording = record_to_csv(&self.output, cursor, options)?.with_columns(columns);
        let rows = collect_rows(&mut recording)?;
        recording.close()?;
        conn.close()?;

        Ok(RecordResult {
            path: self.output.display().to_string(),
            recorded: recording.is_recording(),
            fetched: rows.rows.len(),
            written: recording.recorder().map_or(0, |r| r.written()),
        })
    }
}
