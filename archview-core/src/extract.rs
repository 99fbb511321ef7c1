//! Code block extraction: read a file, pick a region, tag it for display.
//!
//! ```no_run
//! use archview_core::extract::{extract, ExtractRequest};
//! use archview_core::{Language, Show};
//!
//! let block = extract(
//!     &ExtractRequest::new("matmul.s")
//!         .language(Language::Gas)
//!         .show(Show::Symbol("matmul(int)".into())),
//! )?;
//! println!("{}", block);
//! # Ok::<(), archview_core::ArchviewError>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::demangle::{demangle, DEFAULT_DEMANGLER};
use crate::dialect::Language;
use crate::error::{ArchviewError, Result};
use crate::region::{resolve, Region, Show};

/// Everything needed to extract one code block.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    /// File to read.
    pub path: PathBuf,
    /// Language tag; selects the dialect and the header comment marker.
    pub language: Language,
    /// Region selector. Default: whole file.
    pub show: Show,
    /// Drop the first and last line of the region.
    pub trim_ends: bool,
    /// Rendering hint for line number gutters. Does not change content.
    pub line_numbers: bool,
    /// Pipe the file through the demangler. `None` uses the language default.
    pub demangle: Option<bool>,
    /// Demangler command line. Default: `c++filt`.
    pub demangler: String,
}

impl ExtractRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            language: Language::default(),
            show: Show::default(),
            trim_ends: false,
            line_numbers: true,
            demangle: None,
            demangler: DEFAULT_DEMANGLER.to_string(),
        }
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn show(mut self, show: Show) -> Self {
        self.show = show;
        self
    }

    pub fn trim_ends(mut self, trim_ends: bool) -> Self {
        self.trim_ends = trim_ends;
        self
    }

    pub fn line_numbers(mut self, line_numbers: bool) -> Self {
        self.line_numbers = line_numbers;
        self
    }

    pub fn demangle(mut self, demangle: Option<bool>) -> Self {
        self.demangle = demangle;
        self
    }

    pub fn demangler(mut self, demangler: impl Into<String>) -> Self {
        self.demangler = demangler.into();
        self
    }

    /// Whether the demangler will run for this request.
    pub fn should_demangle(&self) -> bool {
        self.demangle
            .unwrap_or_else(|| self.language.demangles_by_default())
    }
}

/// A region of a file, tagged with where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct CodeBlock {
    pub path: String,
    pub language: Language,
    /// 1-based first line.
    pub start_line: usize,
    /// 1-based last line (inclusive).
    pub end_line: usize,
    pub line_count: usize,
    pub lines: Vec<String>,
    #[serde(skip)]
    pub line_numbers: bool,
}

impl CodeBlock {
    /// `<comment> <path>:<start>-<end> (<count> lines)`
    pub fn header(&self) -> String {
        format!(
            "{} {}:{}-{} ({} lines)",
            self.language.comment_marker(),
            self.path,
            self.start_line,
            self.end_line,
            self.line_count
        )
    }

    /// The selected lines joined with newlines.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    /// Header followed by body.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.header(), self.body())
    }
}

impl fmt::Display for CodeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Read the requested file and extract its region.
pub fn extract(request: &ExtractRequest) -> Result<CodeBlock> {
    let raw = read_text(&request.path)?;
    let text = if request.should_demangle() {
        demangle(&request.demangler, &raw)?
    } else {
        raw
    };
    extract_from_text(&request.path.display().to_string(), &text, request)
}

/// Extract a region from text that is already in memory.
///
/// `label` is the path reported in the header. The request's `path` and
/// demangling settings are ignored.
pub fn extract_from_text(label: &str, text: &str, request: &ExtractRequest) -> Result<CodeBlock> {
    let lines: Vec<&str> = text.lines().collect();

    let mut region = resolve(&lines, &request.show, &request.language)?;
    if request.trim_ends {
        region = region.trimmed();
    }

    tracing::debug!(
        path = label,
        start = region.start,
        end = region.end,
        "resolved region"
    );

    Ok(block_for(label, &lines, region, request))
}

fn block_for(label: &str, lines: &[&str], region: Region, request: &ExtractRequest) -> CodeBlock {
    CodeBlock {
        path: label.to_string(),
        language: request.language.clone(),
        start_line: region.start.saturating_add(1),
        end_line: region.end,
        line_count: region.len(),
        lines: region.apply(lines).iter().map(|l| l.to_string()).collect(),
        line_numbers: request.line_numbers,
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ArchviewError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SOURCE: &str = "int foo() {\n  return 1;\n}\nint bar() {\n  return 2;\n}\n";

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_huge_range_start_is_empty_block() {
        let huge = usize::MAX.to_string();
        let show = Show::from_args(&[huge.as_str(), "5"]).unwrap();

        let request = ExtractRequest::new("f.cpp").show(show);
        let block = extract_from_text("f.cpp", "a\nb\n", &request).unwrap();
        assert_eq!(block.start_line, usize::MAX);
        assert_eq!(block.line_count, 0);
        assert!(block.lines.is_empty());

        let trimmed = extract_from_text("f.cpp", "a\nb\n", &request.trim_ends(true)).unwrap();
        assert_eq!(trimmed.line_count, 0);
        assert!(trimmed.lines.is_empty());
    }

    #[test]
    fn test_extract_symbol_end_to_end() {
        let file = temp_file(SOURCE);
        let request = ExtractRequest::new(file.path()).show(Show::Symbol("foo".into()));
        let block = extract(&request).unwrap();

        assert_eq!(block.start_line, 1);
        assert_eq!(block.end_line, 3);
        assert_eq!(block.line_count, 3);
        assert_eq!(block.lines, vec!["int foo() {", "  return 1;", "}"]);
        assert_eq!(
            block.header(),
            format!("// {}:1-3 (3 lines)", file.path().display())
        );
    }

    #[test]
    fn test_whole_file_without_trailing_empty_line() {
        let file = temp_file(SOURCE);
        let block = extract(&ExtractRequest::new(file.path())).unwrap();
        assert_eq!(block.line_count, 6);
        assert_eq!(block.start_line, 1);
        assert_eq!(block.end_line, 6);
    }

    #[test]
    fn test_trim_ends() {
        let block = extract_from_text(
            "f.cpp",
            SOURCE,
            &ExtractRequest::new("f.cpp")
                .show(Show::Symbol("bar".into()))
                .trim_ends(true),
        )
        .unwrap();
        assert_eq!(block.lines, vec!["  return 2;"]);
        assert_eq!(block.header(), "// f.cpp:5-5 (1 lines)");
    }

    #[test]
    fn test_trim_single_line_range_is_empty() {
        let block = extract_from_text(
            "f.cpp",
            SOURCE,
            &ExtractRequest::new("f.cpp")
                .show(Show::Range { start: 2, end: 3 })
                .trim_ends(true),
        )
        .unwrap();
        assert!(block.lines.is_empty());
        assert_eq!(block.line_count, 0);
        assert_eq!(block.render(), "// f.cpp:4-2 (0 lines)\n");
    }

    #[test]
    fn test_missing_file() {
        let err = extract(&ExtractRequest::new("/nonexistent/archview/file.cpp")).unwrap_err();
        assert!(matches!(err, ArchviewError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/archview/file.cpp"));
    }

    #[test]
    fn test_demangle_defaults() {
        assert!(ExtractRequest::new("a.s")
            .language(Language::Gas)
            .should_demangle());
        assert!(!ExtractRequest::new("a.cpp").should_demangle());
        assert!(!ExtractRequest::new("a.s")
            .language(Language::Gas)
            .demangle(Some(false))
            .should_demangle());
        assert!(ExtractRequest::new("a.cpp")
            .demangle(Some(true))
            .should_demangle());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_through_filter() {
        let file = temp_file("_Z3foov:\n\t.cfi_startproc\n\tret\n\t.cfi_endproc\n");
        let request = ExtractRequest::new(file.path())
            .language(Language::Gas)
            .show(Show::Symbol("FOO".into()))
            .demangler("sed s/_Z3foov/FOO/");
        let block = extract(&request).unwrap();
        assert_eq!(block.lines.first().map(String::as_str), Some("FOO:"));
        assert_eq!(block.line_count, 4);
        assert!(block.header().starts_with("; "));
    }

    #[test]
    fn test_python_header_marker() {
        let block = extract_from_text(
            "x.py",
            "a = 1\nb = 2\n",
            &ExtractRequest::new("x.py").language(Language::Python),
        )
        .unwrap();
        assert_eq!(block.render(), "# x.py:1-2 (2 lines)\na = 1\nb = 2");
    }
}
