//! Region selection: turning a [`Show`] selector into a half-open line range.

use serde::Serialize;

use crate::dialect::{Boundaries, Language};
use crate::error::{ArchviewError, Result};

/// What part of a file to display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Show {
    /// The entire file.
    #[default]
    Whole,
    /// The definition of a named function, found through the language dialect.
    Symbol(String),
    /// Zero-based half-open line range, used verbatim.
    Range { start: usize, end: usize },
    /// Explicit start/end regexes, scanned the same way as a symbol.
    Patterns { start: String, end: String },
}

impl Show {
    /// Build a selector from loose arguments.
    ///
    /// No arguments selects the whole file, one names a symbol, and two are
    /// either a numeric range or a pair of regexes. Anything else is rejected.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        match args {
            [] => Ok(Show::Whole),
            [symbol] => Ok(Show::Symbol(symbol.as_ref().to_string())),
            [a, b] => {
                let (a, b) = (a.as_ref(), b.as_ref());
                match (a.parse::<usize>(), b.parse::<usize>()) {
                    (Ok(start), Ok(end)) => Ok(Show::Range { start, end }),
                    _ => Ok(Show::Patterns {
                        start: a.to_string(),
                        end: b.to_string(),
                    }),
                }
            }
            _ => Err(ArchviewError::BadShow {
                shape: format!(
                    "{:?}",
                    args.iter().map(|a| a.as_ref()).collect::<Vec<_>>()
                ),
            }),
        }
    }
}

/// Zero-based half-open line range `[start, end)`.
///
/// `end < start` is allowed and selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn whole(line_count: usize) -> Self {
        Self::new(0, line_count)
    }

    /// Number of lines selected; zero for inverted ranges.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the first and last line. Short regions become empty.
    pub fn trimmed(self) -> Self {
        Self::new(self.start.saturating_add(1), self.end.saturating_sub(1))
    }

    /// Clip to `lines.len()` and slice.
    pub fn apply<'a, T>(&self, lines: &'a [T]) -> &'a [T] {
        let end = self.end.min(lines.len());
        let start = self.start.min(end);
        &lines[start..end]
    }
}

/// Scan `lines` for the first start match and the first end match after it.
///
/// Without a start match the whole file is returned; without an end match the
/// region runs to the end of the file.
pub fn scan(lines: &[&str], boundaries: &Boundaries) -> Region {
    let mut region = Region::whole(lines.len());
    let mut started = false;

    for (n, line) in lines.iter().enumerate() {
        if !started {
            if boundaries.start.is_match(line) {
                region.start = n;
                started = true;
            }
        } else if boundaries.end.is_match(line) {
            region.end = n + 1;
            break;
        }
    }

    if !started {
        tracing::debug!(
            pattern = %boundaries.start,
            "start pattern never matched, using whole file"
        );
    }
    region
}

/// Resolve `show` against `lines`, using `language` for symbol lookup.
pub fn resolve(lines: &[&str], show: &Show, language: &Language) -> Result<Region> {
    match show {
        Show::Whole => Ok(Region::whole(lines.len())),
        Show::Symbol(symbol) => {
            let boundaries = language.boundaries(symbol)?;
            Ok(scan(lines, &boundaries))
        }
        Show::Patterns { start, end } => {
            let boundaries = Boundaries::new(start, end)?;
            Ok(scan(lines, &boundaries))
        }
        Show::Range { start, end } => Ok(Region::new(*start, *end)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FUNCS: &[&str] = &[
        "int foo() {",
        "  return 1;",
        "}",
        "int bar() {",
        "  return 2;",
        "}",
    ];

    #[test]
    fn test_from_args_shapes() {
        let none: [&str; 0] = [];
        assert_eq!(Show::from_args(&none).unwrap(), Show::Whole);
        assert_eq!(
            Show::from_args(&["foo"]).unwrap(),
            Show::Symbol("foo".to_string())
        );
        assert_eq!(
            Show::from_args(&["5", "10"]).unwrap(),
            Show::Range { start: 5, end: 10 }
        );
        assert_eq!(
            Show::from_args(&["^begin", "^end"]).unwrap(),
            Show::Patterns {
                start: "^begin".to_string(),
                end: "^end".to_string()
            }
        );
    }

    #[test]
    fn test_from_args_rejects_three() {
        let err = Show::from_args(&["a", "b", "c"]).unwrap_err();
        assert!(matches!(err, ArchviewError::BadShow { .. }));
        assert!(err.to_string().contains("not a good range"));
    }

    #[test]
    fn test_symbol_lookup_first_function() {
        let region = resolve(TWO_FUNCS, &Show::Symbol("foo".into()), &Language::Cpp).unwrap();
        assert_eq!(region, Region::new(0, 3));
        assert_eq!(region.len(), 3);
    }

    #[test]
    fn test_symbol_lookup_second_function() {
        let region = resolve(TWO_FUNCS, &Show::Symbol("bar".into()), &Language::Cpp).unwrap();
        assert_eq!(region, Region::new(3, 6));
        let selected = region.apply(TWO_FUNCS);
        assert!(selected[0].contains("bar"));
        assert_eq!(*selected.last().unwrap(), "}");
    }

    #[test]
    fn test_missing_end_runs_to_eof() {
        let lines = ["int foo() {", "  return 1;"];
        let region = resolve(&lines, &Show::Symbol("foo".into()), &Language::Cpp).unwrap();
        assert_eq!(region, Region::new(0, 2));
    }

    #[test]
    fn test_missing_symbol_is_whole_file() {
        let region = resolve(TWO_FUNCS, &Show::Symbol("baz".into()), &Language::Cpp).unwrap();
        assert_eq!(region, Region::whole(TWO_FUNCS.len()));
    }

    #[test]
    fn test_whole_file() {
        let region = resolve(TWO_FUNCS, &Show::Whole, &Language::Python).unwrap();
        assert_eq!(region, Region::new(0, 6));
    }

    #[test]
    fn test_explicit_range_ignores_content() {
        let lines: Vec<String> = (0..20).map(|i| format!("line {}", i)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let region = resolve(&refs, &Show::Range { start: 5, end: 10 }, &Language::Cpp).unwrap();
        let selected = region.apply(&refs);
        assert_eq!(selected.len(), 5);
        assert_eq!(selected[0], "line 5");
        assert_eq!(selected[4], "line 9");
    }

    #[test]
    fn test_range_clips_past_end() {
        let region = Region::new(4, 100);
        assert_eq!(region.apply(TWO_FUNCS), &TWO_FUNCS[4..]);
        let region = Region::new(50, 100);
        assert!(region.apply(TWO_FUNCS).is_empty());
    }

    #[test]
    fn test_trim_reduces_by_two() {
        let region = Region::new(0, 3).trimmed();
        assert_eq!(region, Region::new(1, 2));
        assert_eq!(region.apply(TWO_FUNCS), &["  return 1;"]);
    }

    #[test]
    fn test_trim_at_usize_max_saturates() {
        let region = Region::new(usize::MAX, 5).trimmed();
        assert_eq!(region, Region::new(usize::MAX, 4));
        assert!(region.is_empty());
        assert!(region.apply(TWO_FUNCS).is_empty());
    }

    #[test]
    fn test_trim_short_region_is_empty() {
        let region = Region::new(2, 3).trimmed();
        assert_eq!(region, Region::new(3, 2));
        assert!(region.is_empty());
        assert!(region.apply(TWO_FUNCS).is_empty());

        let region = Region::new(0, 0).trimmed();
        assert_eq!(region.len(), 0);
        assert!(region.apply(TWO_FUNCS).is_empty());
    }

    #[test]
    fn test_symbol_in_unsupported_language() {
        let err = resolve(TWO_FUNCS, &Show::Symbol("foo".into()), &Language::Python).unwrap_err();
        assert!(err.to_string().contains("python"));
    }

    #[test]
    fn test_assembly_lookup() {
        let asm = [
            "\t.globl\tfoo",
            "foo:",
            "\t.cfi_startproc",
            "\tcall foo: nope",
            "\tret",
            "\t.cfi_endproc",
            "bar:",
        ];
        let region = resolve(&asm, &Show::Symbol("foo".into()), &Language::Gas).unwrap();
        assert_eq!(region, Region::new(1, 6));
    }

    #[test]
    fn test_invalid_pattern() {
        let show = Show::Patterns {
            start: "(".to_string(),
            end: "x".to_string(),
        };
        let err = resolve(TWO_FUNCS, &show, &Language::Cpp).unwrap_err();
        assert!(matches!(err, ArchviewError::Pattern(_)));
    }
}
