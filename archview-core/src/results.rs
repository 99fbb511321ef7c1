//! Loading and reshaping CSV result files written by lab runs.
//!
//! Every run writes one CSV with a header row (`function`, `IC`, `CPI`, `CT`,
//! `ET`, ...). These helpers stitch several of them together, then skip,
//! sort, group-average and project the combined table.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ArchviewError, Result};

/// A table of string cells with named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` among the columns.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ArchviewError::UnknownColumn {
                column: name.to_string(),
            })
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Numeric cells of one column. Cells that do not parse are skipped.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self
            .column(name)?
            .into_iter()
            .filter_map(parse_number)
            .collect())
    }

    /// Whether every non-empty cell in column `idx` is a number.
    fn is_numeric(&self, idx: usize) -> bool {
        let mut seen = false;
        for row in &self.rows {
            let cell = row[idx].as_str();
            if cell.is_empty() {
                continue;
            }
            if parse_number(cell).is_none() {
                return false;
            }
            seen = true;
        }
        seen
    }

    /// Append `other`'s rows, matching columns by name.
    ///
    /// Columns only `other` has are added at the end; cells missing on
    /// either side are left empty.
    pub fn append(&mut self, other: ResultTable) {
        for column in &other.columns {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.push(String::new());
                }
            }
        }

        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| other.columns.iter().position(|o| o == c))
            .collect();

        for row in other.rows {
            let merged = mapping
                .iter()
                .map(|m| m.and_then(|i| row.get(i).cloned()).unwrap_or_default())
                .collect();
            self.rows.push(merged);
        }
    }

    /// Drop the first `n` rows.
    pub fn skip(&mut self, n: usize) {
        let n = n.min(self.rows.len());
        self.rows.drain(..n);
    }

    /// Stable sort by one column.
    ///
    /// A column whose non-empty cells are all numbers sorts numerically with
    /// empty cells last; any other column sorts as text.
    pub fn sort_by(&mut self, column: &str) -> Result<()> {
        let idx = self.column_index(column)?;
        let numeric = self.is_numeric(idx);
        self.rows.sort_by(|a, b| compare_cells(&a[idx], &b[idx], numeric));
        Ok(())
    }

    /// Group rows by `column` and average every numeric column.
    ///
    /// The result has the key column first, then the numeric columns in
    /// their original order. Non-numeric columns are dropped. Groups are
    /// ordered by key.
    pub fn average_by(&self, column: &str) -> Result<ResultTable> {
        let key_idx = self.column_index(column)?;
        let numeric: Vec<usize> = (0..self.columns.len())
            .filter(|&i| i != key_idx && self.is_numeric(i))
            .collect();

        let mut keys: Vec<&str> = Vec::new();
        let mut groups: Vec<Vec<&Vec<String>>> = Vec::new();
        for row in &self.rows {
            let key = row[key_idx].as_str();
            match keys.iter().position(|k| *k == key) {
                Some(g) => groups[g].push(row),
                None => {
                    keys.push(key);
                    groups.push(vec![row]);
                }
            }
        }

        let numeric_keys = self.is_numeric(key_idx);
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| compare_cells(keys[a], keys[b], numeric_keys));

        let mut columns = vec![self.columns[key_idx].clone()];
        columns.extend(numeric.iter().map(|&i| self.columns[i].clone()));
        let mut table = ResultTable::new(columns);

        for g in order {
            let mut out = vec![keys[g].to_string()];
            for &i in &numeric {
                let values: Vec<f64> = groups[g]
                    .iter()
                    .filter_map(|r| parse_number(&r[i]))
                    .collect();
                out.push(mean(&values).map(format_number).unwrap_or_default());
            }
            table.rows.push(out);
        }
        Ok(table)
    }

    /// Keep only `columns`, in the given order.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<ResultTable> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(ResultTable {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    /// Rows as JSON objects, with numeric cells emitted as numbers.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| {
                        let value = parse_number(v)
                            .and_then(serde_json::Number::from_f64)
                            .map(serde_json::Value::Number)
                            .unwrap_or_else(|| serde_json::Value::String(v.clone()));
                        (c.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }
}

/// What to load and how to reshape it.
#[derive(Debug, Clone, Default)]
pub struct ResultsQuery {
    /// File paths or glob patterns, expanded in order.
    pub files: Vec<String>,
    /// Columns to keep, in order. Default: all.
    pub columns: Option<Vec<String>>,
    /// Column to sort by before grouping.
    pub sort_by: Option<String>,
    /// Column to group and average by.
    pub average_by: Option<String>,
    /// Leading rows to drop from the combined table.
    pub skip: usize,
}

impl ResultsQuery {
    pub fn new<S: Into<String>>(files: impl IntoIterator<Item = S>) -> Self {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn sort_by(mut self, column: impl Into<String>) -> Self {
        self.sort_by = Some(column.into());
        self
    }

    pub fn average_by(mut self, column: impl Into<String>) -> Self {
        self.average_by = Some(column.into());
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}

/// Expand paths and glob patterns into files. Matches are sorted per pattern.
pub fn expand_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matches: Vec<PathBuf> = glob::glob(pattern.as_ref())?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Skipping unreadable match: {}", e);
                    None
                }
            })
            .collect();
        matches.sort();
        files.extend(matches);
    }

    if files.is_empty() {
        return Err(ArchviewError::NoFiles {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
        });
    }
    Ok(files)
}

/// Read one CSV file with a header row.
pub fn read_csv(path: &Path) -> Result<ResultTable> {
    let csv_err = |source: csv::Error| ArchviewError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();
    let mut table = ResultTable::new(columns);

    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        table.rows.push(row);
    }

    tracing::debug!(path = %path.display(), rows = table.len(), "loaded results");
    Ok(table)
}

/// Load, combine and reshape result files.
pub fn load_results(query: &ResultsQuery) -> Result<ResultTable> {
    let files = expand_patterns(&query.files)?;

    let mut combined: Option<ResultTable> = None;
    for file in &files {
        let table = read_csv(file)?;
        match combined.as_mut() {
            Some(all) => all.append(table),
            None => combined = Some(table),
        }
    }
    let mut table = combined.unwrap_or_default();

    table.skip(query.skip);
    if let Some(column) = &query.sort_by {
        table.sort_by(column)?;
    }
    if let Some(column) = &query.average_by {
        table = table.average_by(column)?;
    }
    if let Some(columns) = &query.columns {
        table = table.select(columns)?;
    }
    Ok(table)
}

/// How a column is folded into a per-file summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Aggregate {
    Sum,
    Mean,
}

impl Aggregate {
    fn apply(self, values: &[f64]) -> Option<f64> {
        match self {
            Aggregate::Sum => (!values.is_empty()).then(|| values.iter().sum()),
            Aggregate::Mean => mean(values),
        }
    }
}

/// Summary columns used for the performance-equation labs.
pub fn default_aggregates() -> Vec<(String, Aggregate)> {
    [
        ("IC", Aggregate::Sum),
        ("CPI", Aggregate::Mean),
        ("CT", Aggregate::Mean),
        ("ET", Aggregate::Sum),
        ("cmdlineMHz", Aggregate::Mean),
        ("realMHz", Aggregate::Mean),
    ]
    .into_iter()
    .map(|(c, a)| (c.to_string(), a))
    .collect()
}

/// One summary row per file: the first `function` value plus each aggregate.
///
/// Aggregated columns a file does not have are left empty.
pub fn summarize(files: &[PathBuf], aggregates: &[(String, Aggregate)]) -> Result<ResultTable> {
    let mut columns = vec!["function".to_string()];
    columns.extend(aggregates.iter().map(|(c, _)| c.clone()));
    let mut summary = ResultTable::new(columns);

    for file in files {
        let table = read_csv(file)?;
        let function = table
            .column("function")
            .ok()
            .and_then(|cells| cells.first().map(|c| c.to_string()))
            .unwrap_or_default();

        let mut row = vec![function];
        for (column, aggregate) in aggregates {
            let cell = match table.numeric_column(column) {
                Ok(values) => aggregate.apply(&values).map(format_number),
                Err(_) => None,
            };
            row.push(cell.unwrap_or_default());
        }
        summary.rows.push(row);
    }
    Ok(summary)
}

/// Running mean: `out[i]` is the mean of `values[..=i]`.
pub fn incremental_average(values: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            total += v;
            total / (i + 1) as f64
        })
        .collect()
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Order two cells of the same column. Numeric columns put unparsable cells last.
fn compare_cells(a: &str, b: &str, numeric: bool) -> Ordering {
    if !numeric {
        return a.cmp(b);
    }
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn pattern(dir: &TempDir, glob: &str) -> String {
        dir.path().join(glob).display().to_string()
    }

    #[test]
    fn test_load_concatenates_matches_in_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "run_b.csv", "function,size,ET\nbar,2,0.5\n");
        write(&dir, "run_a.csv", "function,size,ET\nfoo,1,1.5\nfoo,4,2.5\n");

        let table = load_results(&ResultsQuery::new([pattern(&dir, "run_*.csv")])).unwrap();
        assert_eq!(table.columns, vec!["function", "size", "ET"]);
        assert_eq!(table.column("function").unwrap(), vec!["foo", "foo", "bar"]);
    }

    #[test]
    fn test_skip_sort_and_select() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "r.csv",
            "function,size,ET\nwarmup,0,9\nf,100,3\nf,20,1\nf,3,2\n",
        );

        let query = ResultsQuery::new([pattern(&dir, "r.csv")])
            .skip(1)
            .sort_by("size")
            .columns(vec!["ET".to_string(), "size".to_string()]);
        let table = load_results(&query).unwrap();

        assert_eq!(table.columns, vec!["ET", "size"]);
        assert_eq!(table.column("size").unwrap(), vec!["3", "20", "100"]);
        assert_eq!(table.column("ET").unwrap(), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_mixed_column_sorts_as_text() {
        let mut table = ResultTable::new(vec!["size".into()]);
        for cell in ["9", "1a", "10"] {
            table.rows.push(vec![cell.to_string()]);
        }
        table.sort_by("size").unwrap();
        assert_eq!(table.column("size").unwrap(), vec!["10", "1a", "9"]);
    }

    #[test]
    fn test_numeric_column_sorts_blanks_last() {
        let mut table = ResultTable::new(vec!["ET".into()]);
        for cell in ["10", "", "9", "-1.5"] {
            table.rows.push(vec![cell.to_string()]);
        }
        table.sort_by("ET").unwrap();
        assert_eq!(table.column("ET").unwrap(), vec!["-1.5", "9", "10", ""]);
    }

    #[test]
    fn test_average_by_mixed_keys_orders_as_text() {
        let mut table = ResultTable::new(vec!["size".into(), "ET".into()]);
        for (key, et) in [("9", "1"), ("1a", "2"), ("10", "3"), ("9", "5")] {
            table.rows.push(vec![key.to_string(), et.to_string()]);
        }
        let averaged = table.average_by("size").unwrap();
        assert_eq!(averaged.column("size").unwrap(), vec!["10", "1a", "9"]);
        assert_eq!(averaged.column("ET").unwrap(), vec!["3", "2", "3"]);
    }

    #[test]
    fn test_average_by_groups_numeric_columns() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "r.csv",
            "function,size,ET,note\nf,2,1.0,x\nf,1,3.0,y\ng,2,5.0,z\n",
        );

        let query = ResultsQuery::new([pattern(&dir, "r.csv")]).average_by("size");
        let table = load_results(&query).unwrap();

        assert_eq!(table.columns, vec!["size", "ET"]);
        assert_eq!(table.rows, vec![vec!["1", "3"], vec!["2", "3"]]);
    }

    #[test]
    fn test_append_unions_columns() {
        let mut a = ResultTable {
            columns: vec!["x".into(), "y".into()],
            rows: vec![vec!["1".into(), "2".into()]],
        };
        let b = ResultTable {
            columns: vec!["y".into(), "z".into()],
            rows: vec![vec!["3".into(), "4".into()]],
        };
        a.append(b);
        assert_eq!(a.columns, vec!["x", "y", "z"]);
        assert_eq!(a.rows, vec![vec!["1", "2", ""], vec!["", "3", "4"]]);
    }

    #[test]
    fn test_unknown_column() {
        let dir = TempDir::new().unwrap();
        write(&dir, "r.csv", "function,ET\nf,1\n");
        let query = ResultsQuery::new([pattern(&dir, "r.csv")]).sort_by("IC");
        let err = load_results(&query).unwrap_err();
        assert!(matches!(err, ArchviewError::UnknownColumn { .. }));
    }

    #[test]
    fn test_no_matching_files() {
        let dir = TempDir::new().unwrap();
        let err = load_results(&ResultsQuery::new([pattern(&dir, "*.csv")])).unwrap_err();
        assert!(matches!(err, ArchviewError::NoFiles { .. }));
    }

    #[test]
    fn test_summarize_per_file() {
        let dir = TempDir::new().unwrap();
        let a = write(
            &dir,
            "a.csv",
            "function,IC,CPI,CT,ET\nmm,100,1.0,0.5,10\nmm,300,2.0,0.5,30\n",
        );
        let b = write(&dir, "b.csv", "function,IC,CPI\nconv,50,4.0\n");

        let summary = summarize(&[a, b], &default_aggregates()).unwrap();
        assert_eq!(
            summary.columns,
            vec!["function", "IC", "CPI", "CT", "ET", "cmdlineMHz", "realMHz"]
        );
        assert_eq!(summary.rows[0], vec!["mm", "400", "1.5", "0.5", "40", "", ""]);
        assert_eq!(summary.rows[1], vec!["conv", "50", "4", "", "", "", ""]);
    }

    #[test]
    fn test_incremental_average() {
        assert_eq!(incremental_average(&[2.0, 4.0, 6.0]), vec![2.0, 3.0, 4.0]);
        assert!(incremental_average(&[]).is_empty());
    }

    #[test]
    fn test_records_emit_numbers() {
        let table = ResultTable {
            columns: vec!["function".into(), "IC".into()],
            rows: vec![vec!["mm".into(), "42".into()]],
        };
        let records = table.to_records();
        assert_eq!(records[0]["function"], serde_json::json!("mm"));
        assert_eq!(records[0]["IC"], serde_json::json!(42.0));
    }
}
