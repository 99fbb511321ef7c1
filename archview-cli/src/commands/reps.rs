//! Reps command - Source and assembly of each function, one after the other

use anyhow::{Context, Result};
use archview_core::{build_many, Representations, RepsOptions};
use colored::Colorize;
use serde::Serialize;

use crate::commands::show::{block_records, render_block, ROW_HEADERS};
use crate::config::RenderConfig;
use crate::output::{CsvOutput, Output, OutputConfig, OutputFormat, Outputter};

/// Views of several functions from one build
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct RepsView {
    pub reps: Vec<Representations>,
    #[serde(skip)]
    pub theme: String,
}

impl Outputter for RepsView {
    fn to_table(&self, config: &OutputConfig) -> String {
        let width = config.effective_width().min(80);
        self.reps
            .iter()
            .map(|r| {
                let title = format!("{:^width$}", r.function, width = width);
                format!(
                    "{}\n\n{}\n\n{}\n",
                    title.bold(),
                    render_block(&r.source, &self.theme, config),
                    render_block(&r.asm, &self.theme, config)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_csv(&self, _config: &OutputConfig) -> String {
        let rows: Vec<Vec<String>> = self
            .reps
            .iter()
            .flat_map(|r| block_records(&r.source).into_iter().chain(block_records(&r.asm)))
            .collect();
        CsvOutput::from_rows(&ROW_HEADERS, &rows)
    }

    fn to_raw(&self, _config: &OutputConfig) -> String {
        self.reps
            .iter()
            .map(|r| format!("{}\n\n{}", r.source.render(), r.asm.render()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Run the reps command
pub async fn run(
    source: &str,
    asm: &str,
    functions: &[String],
    no_demangle: bool,
    trim_ends: bool,
    render: &RenderConfig,
    format: OutputFormat,
) -> Result<()> {
    let options = RepsOptions {
        demangle: !no_demangle,
        demangler: render.demangler.clone(),
        trim_ends,
    };

    let reps = build_many(source, asm, functions, &options)
        .with_context(|| format!("Cannot render {} / {}", source, asm))?;

    tracing::info!(count = reps.len(), "rendered representations");
    Output::new(
        RepsView {
            reps,
            theme: render.theme.clone(),
        },
        format,
    )
    .render()
}
