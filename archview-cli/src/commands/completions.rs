//! Completions command - Shell completion scripts for `archview`
//!
//! Script generation and file names come from `clap_complete`; this module
//! only adds where each shell expects the script to live.

use std::io;

use clap::Command;
use clap_complete::{generate, Generator};
use colored::Colorize;
use serde::Serialize;

use crate::output::{CsvOutput, Output, OutputConfig, OutputFormat, Outputter};

pub use clap_complete::Shell;

const BIN_NAME: &str = "archview";

/// Where a generated script goes and how the shell picks it up
#[derive(Debug, Serialize)]
pub struct CompletionInstructions {
    pub shell: String,
    /// Suggested location of the script
    pub script: String,
    /// Commands to run once, in order
    pub steps: Vec<String>,
}

impl CompletionInstructions {
    pub fn for_shell(shell: Shell) -> Self {
        let file = shell.file_name(BIN_NAME);
        let (dir, activate) = match shell {
            Shell::Bash => ("~/.local/share/bash-completion/completions", None),
            Shell::Zsh => (
                "~/.zfunc",
                Some("echo 'fpath=(~/.zfunc $fpath)' >> ~/.zshrc  # before compinit".to_string()),
            ),
            Shell::Fish => ("~/.config/fish/completions", None),
            Shell::PowerShell => (
                "~/Documents/PowerShell",
                Some(format!("Add-Content $PROFILE \". ~/Documents/PowerShell/{}\"", file)),
            ),
            Shell::Elvish => (
                "~/.config/elvish/lib",
                Some(format!("echo 'use {}' >> ~/.config/elvish/rc.elv", BIN_NAME)),
            ),
            _ => (".", None),
        };

        let script = format!("{}/{}", dir, file);
        let mut steps = vec![
            format!("mkdir -p {}", dir),
            format!("{} completions {} > {}", BIN_NAME, shell, script),
        ];
        steps.extend(activate);

        Self {
            shell: shell.to_string(),
            script,
            steps,
        }
    }
}

impl Outputter for CompletionInstructions {
    fn to_table(&self, _config: &OutputConfig) -> String {
        let mut output = format!(
            "{} {} -> {}\n",
            "Completions".cyan().bold(),
            self.shell.yellow(),
            self.script
        );
        for (i, step) in self.steps.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, step));
        }
        output
    }

    fn to_csv(&self, _config: &OutputConfig) -> String {
        let rows: Vec<Vec<String>> = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| vec![self.shell.clone(), (i + 1).to_string(), step.clone()])
            .collect();
        CsvOutput::from_rows(&["shell", "step", "command"], &rows)
    }

    fn to_raw(&self, _config: &OutputConfig) -> String {
        self.steps.join("\n")
    }
}

/// Write the completion script for `shell` to stdout
pub fn generate_completions_with_cmd(shell: Shell, cmd: &mut Command) {
    generate(shell, cmd, BIN_NAME, &mut io::stdout());
}

/// Print installation steps for `shell`
pub fn run_instructions(shell: Shell, format: OutputFormat) -> anyhow::Result<()> {
    Output::new(CompletionInstructions::for_shell(shell), format).render()
}
