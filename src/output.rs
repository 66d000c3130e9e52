//! Output formatting for command results.
//!
//! Supports multiple output formats: table (human-readable), JSON, and toon.

use clap::ValueEnum;
use serde::Serialize;

use crate::value::{RawRow, Value};

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Token-efficient toon format
    Toon,
}

/// Trait for types that can be formatted for output
pub trait Outputable: Serialize {
    /// Format as a human-readable table
    fn to_table(&self) -> String;

    /// Format according to the specified output format
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => self.to_table(),
            OutputFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            OutputFormat::Toon => {
                let json_value = serde_json::to_value(self).unwrap_or_default();
                toon::encode(&json_value, None)
            }
        }
    }
}

/// Rows fetched by a command, with the column names the cursor reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
    pub rowcount: i64,
}

impl RowSet {
    /// Cell widths for aligned table output.
    fn widths(&self) -> Vec<usize> {
        let arity = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.columns.len()))
            .max()
            .unwrap_or(0);
        (0..arity)
            .map(|i| {
                let header = self.columns.get(i).map_or(0, |c| c.chars().count());
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|v| v.to_string().chars().count())
                    .fold(header, usize::max)
            })
            .collect()
    }
}

fn pad_line(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

impl Outputable for RowSet {
    fn to_table(&self) -> String {
        if self.rows.is_empty() {
            return format!("No rows (rowcount: {}).", self.rowcount);
        }

        let widths = self.widths();
        let mut lines = Vec::new();
        if !self.columns.is_empty() {
            lines.push(pad_line(self.columns.iter().cloned(), &widths));
            lines.push(
                widths
                    .iter()
                    .map(|w| "-".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("-+-"),
            );
        }
        for row in &self.rows {
            lines.push(pad_line(row.iter().map(Value::to_string), &widths));
        }
        lines.push(String::new());
        lines.push(format!("({} rows)", self.rows.len()));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample() -> RowSet {
        RowSet {
            columns: vec!["id".into(), "name".into()],
            rows: vec![
                vec![Value::Int(1), Value::Text("ada".into())],
                vec![Value::Int(20), Value::Null],
            ],
            rowcount: 2,
        }
    }

    #[rstest]
    fn test_table_alignment() {
        let expected = "\
id | name
---+-----
1  | ada
20 | NULL

(2 rows)";
        assert_eq!(sample().to_table(), expected);
    }

    #[rstest]
    fn test_empty_table() {
        let rows = RowSet {
            rowcount: 3,
            ..RowSet::default()
        };
        assert_eq!(rows.format(OutputFormat::Table), "No rows (rowcount: 3).");
    }

    #[rstest]
    fn test_json_output() {
        let json: serde_json::Value = serde_json::from_str(&sample().format(OutputFormat::Json)).unwrap();
        assert_eq!(json["columns"][1], "name");
        assert_eq!(json["rows"][0][0], 1);
        assert!(json["rows"][1][1].is_null());
        assert_eq!(json["rowcount"], 2);
    }

    #[rstest]
    fn test_toon_output_names_columns() {
        let output = sample().format(OutputFormat::Toon);
        assert!(output.contains("columns"));
        assert!(output.contains("ada"));
    }
}
