//! Language tags and the per-dialect boundary patterns used to find functions.
//!
//! A [`Dialect`] knows how a function starts and ends in one family of text:
//! C/C++ style source or GNU assembler output. Languages without a dialect can
//! still be displayed, they just cannot be searched by symbol.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{ArchviewError, Result};

static CLOSING_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\}\s*$").unwrap());
static CFI_ENDPROC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\.cfi_endproc\b").unwrap());

/// A language tag attached to a code block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Language {
    /// C, C++ and friends.
    #[default]
    Cpp,
    /// GNU assembler output.
    Gas,
    Python,
    /// Anything else, kept verbatim for the renderer.
    Other(String),
}

impl Language {
    /// The tag handed to syntax highlighters.
    pub fn tag(&self) -> &str {
        match self {
            Language::Cpp => "c++",
            Language::Gas => "gas",
            Language::Python => "python",
            Language::Other(tag) => tag,
        }
    }

    /// Guess the language from a file extension. Unknown extensions are C++.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("s" | "S" | "asm") => Language::Gas,
            Some("py") => Language::Python,
            _ => Language::Cpp,
        }
    }

    /// Line comment marker used in the block header.
    pub fn comment_marker(&self) -> &'static str {
        match self {
            Language::Python => "#",
            _ => self.dialect().map(|d| d.comment_marker()).unwrap_or("//"),
        }
    }

    /// Whether text in this language is piped through the demangler by default.
    pub fn demangles_by_default(&self) -> bool {
        matches!(self, Language::Gas)
    }

    /// The dialect used for symbol lookup, if this language has one.
    pub fn dialect(&self) -> Option<&'static dyn Dialect> {
        match self {
            Language::Cpp => Some(&GeneralPurpose),
            Language::Gas => Some(&AssemblyDialect),
            Language::Python | Language::Other(_) => None,
        }
    }

    /// Boundary patterns for `symbol`, or an error when no dialect applies.
    pub fn boundaries(&self, symbol: &str) -> Result<Boundaries> {
        let dialect = self
            .dialect()
            .ok_or_else(|| ArchviewError::UnsupportedLanguage {
                language: self.tag().to_string(),
            })?;
        tracing::debug!(dialect = dialect.name(), symbol, "looking up function");
        dialect.boundaries(symbol)
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "c++" | "cpp" | "cxx" | "cc" | "c" => Language::Cpp,
            "gas" | "asm" | "s" => Language::Gas,
            "python" | "py" => Language::Python,
            _ => Language::Other(s.to_string()),
        }
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Language::from(s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// Start and end line patterns bounding a function body.
#[derive(Debug, Clone)]
pub struct Boundaries {
    pub start: Regex,
    pub end: Regex,
}

impl Boundaries {
    /// Compile a pair of caller-supplied patterns.
    pub fn new(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: Regex::new(start)?,
            end: Regex::new(end)?,
        })
    }
}

/// How functions are recognised in one family of text.
pub trait Dialect: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Line comment marker for headers.
    fn comment_marker(&self) -> &'static str;

    /// Patterns matching the first and last line of `symbol`'s definition.
    fn boundaries(&self, symbol: &str) -> Result<Boundaries>;
}

/// C-like source: `name(` preceded by whitespace or `*`, closed by a lone `}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralPurpose;

impl Dialect for GeneralPurpose {
    fn name(&self) -> &'static str {
        "general-purpose"
    }

    fn comment_marker(&self) -> &'static str {
        "//"
    }

    fn boundaries(&self, symbol: &str) -> Result<Boundaries> {
        let start = Regex::new(&format!(r"[\s*]{}\s*\(", regex::escape(symbol)))?;
        Ok(Boundaries {
            start,
            end: CLOSING_BRACE.clone(),
        })
    }
}

/// Assembler listings: a `name:` label at column zero, closed by `.cfi_endproc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyDialect;

impl Dialect for AssemblyDialect {
    fn name(&self) -> &'static str {
        "assembly"
    }

    fn comment_marker(&self) -> &'static str {
        ";"
    }

    fn boundaries(&self, symbol: &str) -> Result<Boundaries> {
        let start = Regex::new(&format!(r"^{}:\s*$", regex::escape(symbol)))?;
        Ok(Boundaries {
            start,
            end: CFI_ENDPROC.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_aliases() {
        assert_eq!("cpp".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("C++".parse::<Language>().unwrap(), Language::Cpp);
        assert_eq!("asm".parse::<Language>().unwrap(), Language::Gas);
        assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!(
            "fortran".parse::<Language>().unwrap(),
            Language::Other("fortran".to_string())
        );
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path(Path::new("fiddle.s")), Language::Gas);
        assert_eq!(Language::from_path(Path::new("build/fiddle.S")), Language::Gas);
        assert_eq!(Language::from_path(Path::new("plot.py")), Language::Python);
        assert_eq!(Language::from_path(Path::new("fiddle.cpp")), Language::Cpp);
        assert_eq!(Language::from_path(Path::new("Makefile")), Language::Cpp);
    }

    #[test]
    fn test_comment_markers() {
        assert_eq!(Language::Cpp.comment_marker(), "//");
        assert_eq!(Language::Gas.comment_marker(), ";");
        assert_eq!(Language::Python.comment_marker(), "#");
        assert_eq!(Language::Other("x".into()).comment_marker(), "//");
    }

    #[test]
    fn test_general_purpose_start() {
        let b = GeneralPurpose.boundaries("foo").unwrap();
        assert!(b.start.is_match("int foo() {"));
        assert!(b.start.is_match("char *foo (int x)"));
        assert!(!b.start.is_match("int foobar() {"));
        assert!(!b.start.is_match("foo();"));
        assert!(b.end.is_match("}"));
        assert!(b.end.is_match("}   "));
        assert!(!b.end.is_match("  }"));
        assert!(!b.end.is_match("};"));
    }

    #[test]
    fn test_symbol_is_escaped() {
        let b = GeneralPurpose.boundaries("operator+").unwrap();
        assert!(b.start.is_match("int operator+(int a)"));
        assert!(!b.start.is_match("int operatorr(int a)"));
    }

    #[test]
    fn test_assembly_label_is_anchored() {
        let b = AssemblyDialect.boundaries("foo").unwrap();
        assert!(b.start.is_match("foo:"));
        assert!(b.start.is_match("foo:  \t"));
        assert!(!b.start.is_match("\tcall foo: bar"));
        assert!(!b.start.is_match("barfoo:"));
        assert!(!b.start.is_match("foo:bar"));
        assert!(b.end.is_match("\t.cfi_endproc"));
        assert!(!b.end.is_match("\t.cfi_startproc"));
    }

    #[test]
    fn test_unsupported_language_lookup() {
        let err = Language::Python.boundaries("foo").unwrap_err();
        assert!(matches!(err, ArchviewError::UnsupportedLanguage { .. }));
    }
}
