//! Paired source and assembly views of the same functions.

use std::path::PathBuf;

use serde::Serialize;

use crate::demangle::DEFAULT_DEMANGLER;
use crate::dialect::Language;
use crate::error::Result;
use crate::extract::{extract, CodeBlock, ExtractRequest};
use crate::region::Show;

/// Options shared by every function rendered from one build.
#[derive(Debug, Clone)]
pub struct RepsOptions {
    /// Demangle the assembly listing. Default: `true`.
    pub demangle: bool,
    /// Demangler command line. Default: `c++filt`.
    pub demangler: String,
    /// Drop the signature and closing lines. Default: `false`.
    pub trim_ends: bool,
}

impl Default for RepsOptions {
    fn default() -> Self {
        Self {
            demangle: true,
            demangler: DEFAULT_DEMANGLER.to_string(),
            trim_ends: false,
        }
    }
}

/// Source and assembly for one function.
#[derive(Debug, Clone, Serialize)]
pub struct Representations {
    pub function: String,
    pub source: CodeBlock,
    pub asm: CodeBlock,
}

/// Build both views of `function`.
///
/// The assembly label is looked up by the same name, so demangling should
/// stay on for C++ symbols.
pub fn build_reps(
    source: impl Into<PathBuf>,
    asm: impl Into<PathBuf>,
    function: &str,
    options: &RepsOptions,
) -> Result<Representations> {
    let source_block = extract(
        &ExtractRequest::new(source)
            .language(Language::Cpp)
            .show(Show::Symbol(function.to_string()))
            .trim_ends(options.trim_ends),
    )?;

    let asm_block = extract(
        &ExtractRequest::new(asm)
            .language(Language::Gas)
            .show(Show::Symbol(function.to_string()))
            .trim_ends(options.trim_ends)
            .demangle(Some(options.demangle))
            .demangler(options.demangler.clone()),
    )?;

    Ok(Representations {
        function: function.to_string(),
        source: source_block,
        asm: asm_block,
    })
}

/// Build views for each of `functions`, in order. Stops at the first error.
pub fn build_many<S: AsRef<str>>(
    source: impl Into<PathBuf>,
    asm: impl Into<PathBuf>,
    functions: &[S],
    options: &RepsOptions,
) -> Result<Vec<Representations>> {
    let source = source.into();
    let asm = asm.into();
    functions
        .iter()
        .map(|f| build_reps(source.clone(), asm.clone(), f.as_ref(), options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("fiddle.cpp");
        let asm = dir.path().join("fiddle.s");
        fs::write(
            &src,
            "int square(int x) {\n  return x * x;\n}\n\nint twice(int x) {\n  return x + x;\n}\n",
        )
        .unwrap();
        fs::write(
            &asm,
            "\t.text\nsquare:\n\t.cfi_startproc\n\timull %edi, %edi\n\tret\n\t.cfi_endproc\n\
             twice:\n\t.cfi_startproc\n\tleal (%rdi,%rdi), %eax\n\tret\n\t.cfi_endproc\n",
        )
        .unwrap();
        (dir, src, asm)
    }

    fn no_demangle() -> RepsOptions {
        RepsOptions {
            demangle: false,
            ..RepsOptions::default()
        }
    }

    #[test]
    fn test_build_reps_pairs_views() {
        let (_dir, src, asm) = fixture();
        let reps = build_reps(&src, &asm, "twice", &no_demangle()).unwrap();

        assert_eq!(reps.function, "twice");
        assert_eq!(reps.source.start_line, 5);
        assert_eq!(reps.source.line_count, 3);
        assert_eq!(reps.asm.lines[0], "twice:");
        assert_eq!(reps.asm.lines.last().unwrap(), "\t.cfi_endproc");
        assert_eq!(reps.asm.language, Language::Gas);
    }

    #[test]
    fn test_build_many_keeps_order() {
        let (_dir, src, asm) = fixture();
        let reps = build_many(&src, &asm, &["twice", "square"], &no_demangle()).unwrap();
        let names: Vec<_> = reps.iter().map(|r| r.function.as_str()).collect();
        assert_eq!(names, vec!["twice", "square"]);
        assert_eq!(reps[1].source.start_line, 1);
    }

    #[test]
    fn test_build_many_stops_on_missing_file() {
        let (dir, src, _asm) = fixture();
        let missing = dir.path().join("missing.s");
        assert!(build_many(&src, &missing, &["square"], &no_demangle()).is_err());
    }
}
