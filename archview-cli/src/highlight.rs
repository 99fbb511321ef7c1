//! Terminal rendering of code blocks: syntect highlighting and line gutters.

use anyhow::{Context, Result};
use archview_core::Language;
use colored::Colorize;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

/// Pick a syntax for a language tag, falling back to plain text.
fn find_syntax<'a>(ps: &'a SyntaxSet, language: &Language) -> &'a SyntaxReference {
    let found = match language {
        Language::Cpp => ps.find_syntax_by_extension("cpp"),
        Language::Python => ps.find_syntax_by_extension("py"),
        // Plain text unless the syntax set carries an assembler grammar.
        Language::Gas => ps.find_syntax_by_extension("asm"),
        Language::Other(tag) => ps.find_syntax_by_token(tag),
    };
    found.unwrap_or_else(|| ps.find_syntax_plain_text())
}

/// Width of the line number gutter for a block ending at `last_line`.
fn gutter_width(last_line: usize) -> usize {
    4.max(last_line.to_string().len())
}

/// Highlight code using syntect
pub fn highlight_code(
    code: &str,
    language: &Language,
    line_start: usize,
    show_line_numbers: bool,
    theme: &str,
) -> Result<String> {
    let ps = SyntaxSet::load_defaults_newlines();
    let ts = ThemeSet::load_defaults();

    let syntax = find_syntax(&ps, language);
    let theme = ts
        .themes
        .get(theme)
        .with_context(|| format!("Unknown highlighting theme: {}", theme))?;
    let mut highlighter = HighlightLines::new(syntax, theme);

    let last_line = line_start + code.lines().count();
    let width = gutter_width(last_line);
    let mut output = String::new();
    let mut line_num = line_start;

    for line in LinesWithEndings::from(code) {
        let ranges: Vec<(Style, &str)> = highlighter
            .highlight_line(line, &ps)
            .context("Failed to highlight line")?;

        if show_line_numbers {
            output.push_str(&format!(
                "{} │ ",
                format!("{:>width$}", line_num, width = width).dimmed()
            ));
        }

        output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));

        // Only increment if the line actually had a newline
        if line.ends_with('\n') {
            line_num += 1;
        }
    }
    output.push_str("\x1b[0m");

    Ok(output)
}

/// Format code with line numbers (no syntax highlighting)
pub fn format_with_line_numbers(code: &str, line_start: usize, show_line_numbers: bool) -> String {
    if !show_line_numbers {
        return code.to_string();
    }

    let width = gutter_width(line_start + code.lines().count());
    code.lines()
        .enumerate()
        .map(|(i, line)| format!("{:>width$} │ {}", line_start + i, line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether `theme` names one of syntect's bundled themes.
pub fn theme_exists(theme: &str) -> bool {
    ThemeSet::load_defaults().themes.contains_key(theme)
}
