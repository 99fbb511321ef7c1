//! CSV output formatting for data export.

/// CSV output formatter
pub struct CsvOutput;

impl CsvOutput {
    /// Format a header row followed by data rows
    pub fn from_rows<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(
            headers
                .iter()
                .map(|h| Self::escape_value(h.as_ref()))
                .collect::<Vec<_>>()
                .join(","),
        );
        for row in rows {
            lines.push(
                row.iter()
                    .map(|v| Self::escape_value(v))
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        lines.join("\n")
    }

    /// Escape a string value for CSV
    ///
    /// Wraps in quotes if the value contains comma, newline, or quote.
    /// Doubles any existing quotes.
    pub fn escape_value(s: &str) -> String {
        if s.contains(',') || s.contains('\n') || s.contains('\r') || s.contains('"') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
