//! archview CLI - Show functions, their assembly and lab results
//!
//! Pulls one function (or a line range, or a whole file) out of C++ source or
//! assembler output and prints it with a `path:start-end` header, pairs source
//! and assembly for a list of functions, and tabulates CSV run results.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod highlight;
mod output;

use commands::*;
use config::ArchviewConfig;
use output::OutputFormat;

/// Look at the code you measure.
#[derive(Parser)]
#[command(name = "archview")]
#[command(author, version)]
#[command(about = "Show functions, their assembly and lab results")]
#[command(propagate_version = true)]
#[command(next_help_heading = "Options")]
#[command(after_help = "Examples:
  archview show fiddle.cpp bar          Show function bar
  archview show fiddle.cpp 10 20        Show lines 11 through 20
  archview show build/fiddle.s bar      Show bar's assembly, demangled
  archview reps fiddle.cpp build/fiddle.s foo bar
  archview results 'runs/*.csv' --average-by function")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a function, a line range or a whole file
    #[command(after_help = "TARGET is empty (whole file), a symbol, START END line numbers\n\
                            (0-based, end exclusive) or START_REGEX END_REGEX.")]
    Show {
        /// Source or assembly file
        file: String,

        /// What to show (put patterns starting with `-` after `--`)
        target: Vec<String>,

        /// Language (c++, gas, python, ...); inferred from the extension
        #[arg(short, long)]
        language: Option<String>,

        /// Drop the first and last line of the region
        #[arg(long)]
        trim_ends: bool,

        /// Pipe the file through the demangler first
        #[arg(long, conflicts_with = "no_demangle")]
        demangle: bool,

        /// Never demangle, even for assembly
        #[arg(long)]
        no_demangle: bool,

        /// Demangler command (overrides config)
        #[arg(long)]
        demangler: Option<String>,

        /// Hide the line number gutter
        #[arg(short = 'n', long)]
        no_line_numbers: bool,
    },

    /// Show source and assembly of each function
    Reps {
        /// C++ source file
        source: String,

        /// Assembly file built from it
        asm: String,

        /// Functions to show, in order
        #[arg(required = true)]
        functions: Vec<String>,

        /// Drop the first and last line of each region
        #[arg(long)]
        trim_ends: bool,

        /// Show mangled assembly
        #[arg(long)]
        no_demangle: bool,
    },

    /// Combine and reshape CSV result files
    Results {
        /// CSV files or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Columns to keep, comma separated
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Sort rows by this column
        #[arg(long)]
        sort_by: Option<String>,

        /// Average numeric columns per value of this column
        #[arg(long)]
        average_by: Option<String>,

        /// Leading rows to drop (overrides config)
        #[arg(long)]
        skip: Option<usize>,

        /// Add a running mean of this column
        #[arg(long)]
        running: Option<String>,
    },

    /// One summary row per result file
    Summary {
        /// CSV files or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Check the demangler, theme and configuration
    Doctor,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: completions::Shell,

        /// Show installation instructions instead of generating completions
        #[arg(long)]
        instructions: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = ArchviewConfig::load(std::path::Path::new("."));

    // CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Show {
            file,
            target,
            language,
            trim_ends,
            demangle,
            no_demangle,
            demangler,
            no_line_numbers,
        } => {
            let args = show::ShowArgs {
                file,
                target,
                language,
                trim_ends,
                demangle: match (demangle, no_demangle) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                demangler,
                no_line_numbers,
            };
            show::run(args, &config.render, format).await
        }
        Commands::Reps {
            source,
            asm,
            functions,
            trim_ends,
            no_demangle,
        } => {
            reps::run(
                &source,
                &asm,
                &functions,
                no_demangle,
                trim_ends,
                &config.render,
                format,
            )
            .await
        }
        Commands::Results {
            patterns,
            columns,
            sort_by,
            average_by,
            skip,
            running,
        } => {
            let args = results::ResultsArgs {
                patterns,
                columns,
                sort_by,
                average_by,
                skip,
                running,
            };
            results::run_results(args, config.results.skip, format).await
        }
        Commands::Summary { patterns } => results::run_summary(patterns, format).await,
        Commands::Doctor => doctor::run(&config, format).await,
        Commands::Completions {
            shell,
            instructions,
        } => {
            if instructions {
                completions::run_instructions(shell, format)
            } else {
                let mut cmd = Cli::command();
                completions::generate_completions_with_cmd(shell, &mut cmd);
                Ok(())
            }
        }
    }
}
