//! Output formatting for record command results.

use super::execute::RecordResult;
use crate::output::Outputable;

impl Outputable for RecordResult {
    fn to_table(&self) -> String {
        if !self.recorded {
            return format!("Recording disabled; fetched {} rows, {} untouched.", self.fetched, self.path);
        }
        if self.written < self.fetched {
            return format!(
                "Recorded {} of {} rows to {} (limit reached).",
                self.written, self.fetched, self.path
            );
        }
        format!("Recorded {} rows to {}.", self.written, self.path)
    }
}
