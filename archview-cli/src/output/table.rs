//! Table output formatting using the `tabled` crate

use super::{truncate, OutputConfig};
use tabled::{
    builder::Builder,
    settings::{object::Columns, style::Style, Alignment, Modify, Width},
};

/// Maximum cell width before truncation kicks in on a terminal
const MAX_CELL_WIDTH: usize = 40;

/// Table output formatter
pub struct TableOutput;

impl TableOutput {
    /// Create a table from a header row and rows of strings
    pub fn from_rows<S: AsRef<str>>(
        headers: &[S],
        rows: &[Vec<String>],
        config: &OutputConfig,
    ) -> String {
        if rows.is_empty() {
            return "(no results)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(headers.iter().map(|h| h.as_ref().to_string()));

        for row in rows {
            builder.push_record(row.iter().map(|cell| {
                if config.should_truncate() {
                    truncate(cell, MAX_CELL_WIDTH)
                } else {
                    cell.clone()
                }
            }));
        }

        let mut table = builder.build();
        table.with(Style::rounded());

        // Numbers read better right-aligned; the first column is usually a label.
        for (i, _) in headers.iter().enumerate().skip(1) {
            if rows.iter().all(|r| r.get(i).map_or(true, |c| is_numeric(c))) {
                table.with(Modify::new(Columns::single(i)).with(Alignment::right()));
            }
        }

        if config.should_truncate() {
            table.with(Width::wrap(config.effective_width()));
        }

        table.to_string()
    }
}

fn is_numeric(cell: &str) -> bool {
    cell.is_empty() || cell.parse::<f64>().is_ok()
}
