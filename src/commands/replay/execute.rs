use std::error::Error;

use super::ReplayCmd;
use crate::commands::{collect_rows, Execute};
use crate::connection::Connection;
use crate::cursor::{FrameFetch, RowCursor};
use crate::db::DatabaseConfig;
use crate::mock::MockConnection;
use crate::output::RowSet;
use crate::record::read_csv;

impl Execute for ReplayCmd {
    type Output = RowSet;

    fn execute(self, _database: &DatabaseConfig) -> Result<Self::Output, Box<dyn Error>> {
        let conn = MockConnection::new();
        let header = !self.no_header;

        if self.frame {
            conn.inject_frame_from_csv(&self.file, header)?;
            let mut cursor = conn.execute(&self.sql, &[])?;
            let rowcount = cursor.rowcount();
            let frame = cursor.fetch_frame()?;
            return Ok(RowSet {
                columns: frame.columns,
                rows: frame.rows,
                rowcount,
            });
        }

        let data = read_csv(&self.file, header)?;
        conn.inject_raw(data.rows);
        let mut cursor = conn.execute(&self.sql, &[])?;
        let mut rows = collect_rows(&mut cursor)?;
        if let Some(columns) = data.header {
            rows.columns = columns;
        }
        Ok(rows)
    }
}
