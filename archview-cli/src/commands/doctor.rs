//! Doctor command - Check that the tools archview shells out to are usable
//!
//! Checks:
//! - Which configuration file is in effect
//! - Whether the demangler runs and actually demangles
//! - Whether the highlighting theme exists

use colored::Colorize;
use serde::Serialize;

use archview_core::demangle::demangle;

use crate::config::ArchviewConfig;
use crate::highlight::theme_exists;
use crate::output::{CsvOutput, Output, OutputConfig, OutputFormat, Outputter};

/// A mangled name every Itanium-ABI demangler understands
const SAMPLE_SYMBOL: &str = "_Z3foov";

/// Status of a health check item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckStatus {
    fn colored_icon(&self) -> String {
        match self {
            CheckStatus::Ok => "[OK]".green().to_string(),
            CheckStatus::Warning => "[!!]".yellow().to_string(),
            CheckStatus::Error => "[!!]".red().to_string(),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Warning => "warn",
            CheckStatus::Error => "error",
        }
    }
}

/// A single health check item
#[derive(Debug, Clone, Serialize)]
pub struct CheckItem {
    pub status: CheckStatus,
    pub label: String,
    pub value: String,
}

impl CheckItem {
    fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            label: label.into(),
            value: value.into(),
        }
    }

    fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warning,
            label: label.into(),
            value: value.into(),
        }
    }

    fn error(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Result of health check
#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: Vec<CheckItem>,
    pub recommendations: Vec<String>,
}

impl DoctorResult {
    /// Whether any check failed outright
    pub fn has_errors(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Error)
    }
}

impl Outputter for DoctorResult {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", "archview Health Check".cyan().bold()));
        output.push_str(&format!(
            "{}\n",
            "\u{2500}".repeat(config.effective_width().min(40)).dimmed()
        ));

        for check in &self.checks {
            output.push_str(&format!(
                "{} {}: {}\n",
                check.status.colored_icon(),
                check.label,
                check.value
            ));
        }

        if !self.recommendations.is_empty() {
            output.push_str(&format!("\n{}\n", "Recommendations:".yellow().bold()));
            for rec in &self.recommendations {
                output.push_str(&format!("  - {}\n", rec));
            }
        }

        output
    }

    fn to_csv(&self, _config: &OutputConfig) -> String {
        let rows: Vec<Vec<String>> = self
            .checks
            .iter()
            .map(|c| {
                vec![
                    c.label.clone(),
                    c.status.as_str().to_string(),
                    c.value.clone(),
                ]
            })
            .collect();
        CsvOutput::from_rows(&["check", "status", "value"], &rows)
    }

    fn to_raw(&self, _config: &OutputConfig) -> String {
        let mut lines: Vec<String> = self
            .checks
            .iter()
            .map(|c| format!("{} [{}]: {}", c.label, c.status.as_str(), c.value))
            .collect();
        for rec in &self.recommendations {
            lines.push(format!("-> {}", rec));
        }
        lines.join("\n")
    }
}

/// Run the demangler on a sample symbol
fn check_demangler(command: &str) -> CheckItem {
    let sample = format!("{}\n", SAMPLE_SYMBOL);
    match demangle(command, &sample) {
        Ok(out) if out.trim() == SAMPLE_SYMBOL => CheckItem::warning(
            "Demangler",
            format!("{} runs but left {} unchanged", command, SAMPLE_SYMBOL),
        ),
        Ok(out) => CheckItem::ok("Demangler", format!("{} ({})", command, out.trim())),
        Err(e) => CheckItem::error("Demangler", e.to_string()),
    }
}

fn check_theme(theme: &str) -> CheckItem {
    if theme_exists(theme) {
        CheckItem::ok("Theme", theme)
    } else {
        CheckItem::warning("Theme", format!("{} not found, output will be plain", theme))
    }
}

/// Collect all checks for `config`
pub fn diagnose(config: &ArchviewConfig) -> DoctorResult {
    let mut checks = Vec::new();
    let mut recommendations = Vec::new();

    match &config.source {
        Some(path) => checks.push(CheckItem::ok("Config", path.display().to_string())),
        None => checks.push(CheckItem::ok("Config", "defaults (no config file found)")),
    }

    let demangler = check_demangler(&config.render.demangler);
    match demangler.status {
        CheckStatus::Ok => {}
        CheckStatus::Warning => recommendations
            .push("Set render.demangler to a filter that understands Itanium names".to_string()),
        CheckStatus::Error => recommendations.push(format!(
            "Install {} (binutils) or pass --no-demangle when showing assembly",
            config.render.demangler
        )),
    }
    checks.push(demangler);

    let theme = check_theme(&config.render.theme);
    if theme.status != CheckStatus::Ok {
        recommendations.push("Pick a bundled syntect theme, e.g. base16-ocean.dark".to_string());
    }
    checks.push(theme);

    DoctorResult {
        checks,
        recommendations,
    }
}

/// Run the doctor command
pub async fn run(config: &ArchviewConfig, format: OutputFormat) -> anyhow::Result<()> {
    let result = diagnose(config);
    let failed = result.has_errors();
    Output::new(result, format).render()?;

    if failed {
        anyhow::bail!("Some checks failed");
    }
    Ok(())
}
