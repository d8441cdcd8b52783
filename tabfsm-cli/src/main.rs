//! tabfsm-cli - Command-line interface for tabfsm
//!
//! Validates, renders and exercises transition tables, either one-shot or
//! through an interactive REPL.

mod commands;
mod repl;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tabfsm_core::{Capitalization, CompileOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabfsm-cli")]
#[command(about = "Command-line interface for tabfsm transition tables")]
#[command(version)]
struct Cli {
    /// Reserved catch-all matcher token
    #[arg(long, global = true, env = "TABFSM_WILDCARD", default_value = "_")]
    wildcard: String,

    /// Label policy for notification names (first-letter or title-words)
    #[arg(
        long,
        global = true,
        env = "TABFSM_CAPITALIZATION",
        default_value = "first-letter"
    )]
    capitalization: Capitalization,

    /// Emit final/inFinal notifications around states without rules
    #[arg(
        long,
        global = true,
        env = "TABFSM_TERMINAL_SIGNALS",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    terminal_signals: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn compile_options(&self) -> CompileOptions {
        CompileOptions::new()
            .with_wildcard(self.wildcard.clone())
            .with_capitalization(self.capitalization)
            .with_terminal_signals(self.terminal_signals)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and compile a table
    Check {
        /// Table file (.json, .yaml or .yml)
        table: PathBuf,
    },

    /// Print the compiled dispatch logic
    Render {
        /// Table file (.json, .yaml or .yml)
        table: PathBuf,

        /// Print a JSON description instead of the text listing
        #[arg(long)]
        json: bool,
    },

    /// Feed inputs to a fresh machine and print each step
    Run {
        /// Table file (.json, .yaml or .yml)
        table: PathBuf,

        /// Input tokens, applied in order
        inputs: Vec<String>,

        /// Initial state (defaults to the first declared state)
        #[arg(short, long)]
        initial: Option<String>,

        /// Print notifications as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive session against a table
    Repl {
        /// Table file (.json, .yaml or .yml)
        table: PathBuf,

        /// Initial state (defaults to the first declared state)
        #[arg(short, long)]
        initial: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.compile_options();

    match cli.command {
        Commands::Repl { table, initial } => {
            let compiled = match commands::load_table(&table, options) {
                Ok(compiled) => compiled,
                Err(e) => {
                    eprintln!("{}: {}", "Error".red(), e);
                    std::process::exit(1);
                }
            };
            repl::run(compiled, initial)?;
        }
        cmd => match commands::execute(cmd, options) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test, since it mutates the process environment.
    #[test]
    fn test_terminal_signals_env_fallback() {
        let args = ["tabfsm-cli", "check", "t.json"];

        std::env::remove_var("TABFSM_TERMINAL_SIGNALS");
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(!cli.compile_options().terminal_signals);

        for (value, expected) in [("1", true), ("true", true), ("0", false), ("false", false)] {
            std::env::set_var("TABFSM_TERMINAL_SIGNALS", value);
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.compile_options().terminal_signals, expected, "value {:?}", value);
        }
        std::env::remove_var("TABFSM_TERMINAL_SIGNALS");

        let cli = Cli::try_parse_from(["tabfsm-cli", "--terminal-signals", "check", "t.json"]).unwrap();
        assert!(cli.terminal_signals);
    }

    #[test]
    fn test_capitalization_flag() {
        let cli =
            Cli::try_parse_from(["tabfsm-cli", "render", "t.json", "--capitalization", "title-words"])
                .unwrap();
        assert_eq!(cli.compile_options().capitalization, Capitalization::TitleWords);
        assert!(Cli::try_parse_from(["tabfsm-cli", "render", "t.json", "--capitalization", "upper"]).is_err());
    }
}
