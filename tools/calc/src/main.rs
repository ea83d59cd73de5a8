//! calc - arithmetic expression calculator
//!
//! Evaluates the expressions given on the command line, or starts an
//! interactive prompt when there are none.

use anyhow::{bail, Result};
use calc::config::{load_settings, Settings};
use calc::repl;
use clap::Parser;
use expr_calc::Calculator;
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calc")]
#[command(about = "Evaluate arithmetic expressions")]
#[command(long_about = "Evaluate arithmetic expressions

Operators:  = < > + - * / % ^ ! (factorial), unary + -
Brackets:   ( ) [ ] { }
Functions:  sin cos tan tg cot ctg lg ln log exp abs sqrt pow min max
Constants:  pi e

Examples:
  calc '2 + 3 * 4'
  calc 'pow(2, 10)' '5!'
  calc                      # interactive prompt, empty line quits")]
#[command(version)]
struct Cli {
    /// Expressions to evaluate (interactive prompt when omitted)
    expressions: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Config file (TOML or YAML, default: ./calc.toml if present)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Maximum nesting of brackets and function calls
    #[arg(long)]
    max_depth: Option<usize>,
}

fn init_logging(settings: &Settings, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        settings.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure colored output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(max_depth) = cli.max_depth {
        settings.max_depth = max_depth;
    }

    init_logging(&settings, cli.verbose);
    debug!(?settings, "settings loaded");

    let calc = Calculator::with_config(settings.evaluator_config());

    if cli.expressions.is_empty() {
        return repl::run(&calc, &settings);
    }

    let failed = repl::evaluate_all(
        &calc,
        &cli.expressions,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )?;
    if failed > 0 {
        bail!(
            "{} of {} expressions failed",
            failed,
            cli.expressions.len()
        );
    }

    Ok(())
}
