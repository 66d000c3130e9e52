use std::error::Error;

use super::QueryCmd;
use crate::commands::{collect_rows, parse_param, Execute};
use crate::connection::{Connection, LiveConnection};
use crate::cursor::RowCursor;
use crate::db::DatabaseConfig;
use crate::output::RowSet;
use crate::value::Value;

impl Execute for QueryCmd {
    type Output = RowSet;

    fn execute(self, database: &DatabaseConfig) -> Result<Self::Output, Box<dyn Error>> {
        let params: Vec<Value> = self.params.iter().map(|p| parse_param(p)).collect();
        let mut conn = LiveConnection::new(database.connect()?);

        let mut cursor = conn.execute(&self.sql, &params)?;
        let rows = collect_rows(&mut cursor)?;
        cursor.close()?;

        if self.commit {
            conn.commit()?;
        }
        conn.close()?;
        Ok(rows)
    }
}
