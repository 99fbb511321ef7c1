//! Show command - Display one function, line range or whole file
//!
//! The region is picked by `archview_core::extract`; this module only turns
//! the resulting block into terminal, JSON, CSV or raw text.

use anyhow::{Context, Result};
use archview_core::{extract, CodeBlock, ExtractRequest, Language, Show};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::config::RenderConfig;
use crate::highlight::{format_with_line_numbers, highlight_code};
use crate::output::{CsvOutput, Output, OutputConfig, OutputFormat, Outputter};

/// Arguments of `archview show`
#[derive(Debug, Clone, Default)]
pub struct ShowArgs {
    pub file: String,
    /// Symbol, `START END` range or `START_REGEX END_REGEX`
    pub target: Vec<String>,
    /// Language tag; inferred from the extension when absent
    pub language: Option<String>,
    pub trim_ends: bool,
    /// `Some(true)` for --demangle, `Some(false)` for --no-demangle
    pub demangle: Option<bool>,
    pub demangler: Option<String>,
    pub no_line_numbers: bool,
}

/// A code block plus the settings needed to draw it
#[derive(Debug, Serialize)]
pub struct CodeView {
    #[serde(flatten)]
    pub block: CodeBlock,
    #[serde(skip)]
    pub theme: String,
}

impl CodeView {
    pub fn new(block: CodeBlock, theme: impl Into<String>) -> Self {
        Self {
            block,
            theme: theme.into(),
        }
    }
}

impl Outputter for CodeView {
    fn to_table(&self, config: &OutputConfig) -> String {
        render_block(&self.block, &self.theme, config)
    }

    fn to_csv(&self, _config: &OutputConfig) -> String {
        CsvOutput::from_rows(&ROW_HEADERS, &block_records(&self.block))
    }

    fn to_raw(&self, _config: &OutputConfig) -> String {
        self.block.render()
    }
}

/// Header, rule and (highlighted when colors are on) body of one block
pub(crate) fn render_block(block: &CodeBlock, theme: &str, config: &OutputConfig) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", block.header().cyan().bold()));
    output.push_str(&format!("{}\n", "-".repeat(config.effective_width().min(80))));

    let body = block.body();
    if config.use_colors() {
        match highlight_code(
            &body,
            &block.language,
            block.start_line,
            block.line_numbers,
            theme,
        ) {
            Ok(highlighted) => {
                output.push_str(&highlighted);
                return output;
            }
            Err(e) => tracing::warn!("Highlighting failed, showing plain text: {:#}", e),
        }
    }

    output.push_str(&format_with_line_numbers(
        &body,
        block.start_line,
        block.line_numbers,
    ));
    output
}

pub(crate) const ROW_HEADERS: [&str; 3] = ["path", "line", "text"];

/// One `path,line,text` record per line of the block
pub(crate) fn block_records(block: &CodeBlock) -> Vec<Vec<String>> {
    block
        .lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            vec![
                block.path.clone(),
                (block.start_line + i).to_string(),
                text.clone(),
            ]
        })
        .collect()
}

/// Turn CLI arguments and render settings into an extraction request
pub fn build_request(args: &ShowArgs, render: &RenderConfig) -> Result<ExtractRequest> {
    let show = Show::from_args(&args.target)?;
    let language = match &args.language {
        Some(tag) => Language::from(tag.as_str()),
        None => Language::from_path(Path::new(&args.file)),
    };

    Ok(ExtractRequest::new(&args.file)
        .language(language)
        .show(show)
        .trim_ends(args.trim_ends)
        .line_numbers(render.line_numbers && !args.no_line_numbers)
        .demangle(args.demangle)
        .demangler(
            args.demangler
                .clone()
                .unwrap_or_else(|| render.demangler.clone()),
        ))
}

/// Run the show command
pub async fn run(args: ShowArgs, render: &RenderConfig, format: OutputFormat) -> Result<()> {
    let request = build_request(&args, render)?;
    tracing::debug!(?request, "extracting");

    let block = extract(&request).with_context(|| format!("Cannot show {}", args.file))?;
    Output::new(CodeView::new(block, &render.theme), format).render()
}
