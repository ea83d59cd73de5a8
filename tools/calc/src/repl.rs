//! Read-eval-print loop and one-shot evaluation
//!
//! The loop reads one line, evaluates it, prints the result or the error,
//! and stops at end-of-input or on an empty line.

use anyhow::{Context, Result};
use colored::*;
use expr_calc::Calculator;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use tracing::{debug, warn};

use crate::config::Settings;

pub fn format_result(value: f64) -> String {
    format!("result: {}", value)
}

/// Evaluate each expression, writing results to `out` and errors to `err`
///
/// Returns the number of expressions that failed.
pub fn evaluate_all<O: Write, E: Write>(
    calc: &Calculator,
    expressions: &[String],
    out: &mut O,
    err: &mut E,
) -> io::Result<usize> {
    let mut failed = 0;

    for expr in expressions {
        match calc.evaluate(expr) {
            Ok(value) => writeln!(out, "{}", value)?,
            Err(e) => {
                failed += 1;
                writeln!(err, "{} {}: {}", "Error:".red(), expr, e)?;
            },
        }
    }

    Ok(failed)
}

/// Interactive REPL loop
pub fn run(calc: &Calculator, settings: &Settings) -> Result<()> {
    let config = rustyline::Config::builder()
        .auto_add_history(false)
        .build();
    let mut rl = DefaultEditor::with_config(config).context("Failed to initialize readline")?;

    println!("{}", "calc".bright_cyan().bold());
    println!(
        "Enter an expression, or an {} to quit\n",
        "empty line".bright_yellow()
    );

    loop {
        match rl.readline(&settings.prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    break;
                }

                if settings.history {
                    // Add to history (ignore errors)
                    let _ = rl.add_history_entry(line.as_str());
                }

                match calc.evaluate(&line) {
                    Ok(value) => println!("{}", format_result(value)),
                    Err(e) => eprintln!("{} {}", "Error:".red(), e),
                }
            },
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C - drop the line and keep going
                println!("^C");
                continue;
            },
            Err(ReadlineError::Eof) => {
                debug!("end of input");
                break;
            },
            Err(e) => {
                warn!(error = %e, "readline failed");
                eprintln!("{} {}", "Readline error:".red(), e);
                break;
            },
        }
    }

    Ok(())
}
