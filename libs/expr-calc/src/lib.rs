//! expr-calc - arithmetic expression evaluator
//!
//! Evaluates one line of arithmetic text to an `f64`, or a [`CalcError`].
//!
//! # Features
//!
//! - **Operators**: `= < >` (comparison, yield 1 or 0), `+ -`, `* / %`,
//!   `^`, postfix factorial `!`, prefix `+x` / `-x`
//! - **Grouping**: `()`, `[]` and `{}`, interchangeable but matched per family
//! - **Functions**: `sin cos tan tg cot ctg lg ln log exp abs sqrt`,
//!   `pow min max`
//! - **Constants**: `pi`, `e` (case-insensitive)
//!
//! Every binary operator associates to the left, including `^`.
//!
//! # Example
//!
//! ```rust
//! use expr_calc::{evaluate, CalcError, Calculator, EvaluatorConfig};
//!
//! assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
//! assert_eq!(evaluate("pow(2, 3)").unwrap(), 8.0);
//! assert_eq!(evaluate("5!").unwrap(), 120.0);
//! assert!(matches!(evaluate("1/0"), Err(CalcError::DomainError(_))));
//!
//! // Bounded nesting
//! let calc = Calculator::with_config(EvaluatorConfig::default().with_max_depth(2));
//! assert_eq!(calc.evaluate("(((1)))"), Err(CalcError::NestingTooDeep(2)));
//! ```

pub mod builtin_functions;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod operations;
pub mod operators;
pub mod validate;

// Re-exports for convenience
pub use config::EvaluatorConfig;
pub use error::{CalcError, ErrorKind, Result};
pub use evaluator::Calculator;
pub use operations::{OperandStack, Operation, OperationRegistry};
pub use operators::Operator;

/// Evaluate `text` with a default [`Calculator`]
pub fn evaluate(text: &str) -> Result<f64> {
    Calculator::new().evaluate(text)
}
