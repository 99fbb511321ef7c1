//! Results and summary commands - Combine and reshape CSV run results

use anyhow::{Context, Result};
use archview_core::results::{default_aggregates, expand_patterns, incremental_average, summarize};
use archview_core::{load_results, ResultTable, ResultsQuery};
use serde::Serialize;

use crate::output::{CsvOutput, JsonOutput, Output, OutputConfig, OutputFormat, Outputter, TableOutput};

/// A result table ready for display
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ResultsView(pub ResultTable);

/// Serializes a table as an array of row objects
struct Records<'a>(&'a ResultTable);

impl Serialize for Records<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.to_records().serialize(serializer)
    }
}

impl Outputter for ResultsView {
    fn to_table(&self, config: &OutputConfig) -> String {
        TableOutput::from_rows(&self.0.columns, &self.0.rows, config)
    }

    fn to_json(&self, _config: &OutputConfig) -> String {
        JsonOutput::format(&Records(&self.0))
    }

    fn to_csv(&self, _config: &OutputConfig) -> String {
        CsvOutput::from_rows(&self.0.columns, &self.0.rows)
    }

    fn to_raw(&self, config: &OutputConfig) -> String {
        self.to_csv(config)
    }
}

/// Arguments of `archview results`
#[derive(Debug, Clone, Default)]
pub struct ResultsArgs {
    pub patterns: Vec<String>,
    pub columns: Option<Vec<String>>,
    pub sort_by: Option<String>,
    pub average_by: Option<String>,
    pub skip: Option<usize>,
    /// Column to add a running mean for, as `<column>_running`
    pub running: Option<String>,
}

/// Build the query for `args`, using `default_skip` when `--skip` is absent
pub fn build_query(args: &ResultsArgs, default_skip: usize) -> ResultsQuery {
    let mut query = ResultsQuery::new(args.patterns.iter().cloned())
        .skip(args.skip.unwrap_or(default_skip));
    if let Some(columns) = &args.columns {
        query = query.columns(columns.clone());
    }
    if let Some(column) = &args.sort_by {
        query = query.sort_by(column.clone());
    }
    if let Some(column) = &args.average_by {
        query = query.average_by(column.clone());
    }
    query
}

/// Append `<column>_running` holding the running mean of `column`
pub fn add_running_average(table: &mut ResultTable, column: &str) -> Result<()> {
    let cells = table.column(column)?;
    let values = cells
        .iter()
        .map(|c| {
            c.trim()
                .parse::<f64>()
                .with_context(|| format!("Column {} has a non-numeric cell: {:?}", column, c))
        })
        .collect::<Result<Vec<f64>>>()?;

    let running = incremental_average(&values);
    table.columns.push(format!("{}_running", column));
    for (row, value) in table.rows.iter_mut().zip(running) {
        row.push(value.to_string());
    }
    Ok(())
}

/// Run the results command
pub async fn run_results(args: ResultsArgs, default_skip: usize, format: OutputFormat) -> Result<()> {
    let query = build_query(&args, default_skip);
    tracing::debug!(?query, "loading results");

    let mut table = load_results(&query)?;
    if let Some(column) = &args.running {
        add_running_average(&mut table, column)?;
    }

    tracing::info!(rows = table.len(), "results loaded");
    Output::new(ResultsView(table), format).render()
}

/// Run the summary command: one row per file
pub async fn run_summary(patterns: Vec<String>, format: OutputFormat) -> Result<()> {
    let files = expand_patterns(&patterns)?;
    let table = summarize(&files, &default_aggregates())?;
    Output::new(ResultsView(table), format).render()
}
