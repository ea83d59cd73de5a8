//! calc - command-line front end for expr-calc

pub mod config;
pub mod repl;
