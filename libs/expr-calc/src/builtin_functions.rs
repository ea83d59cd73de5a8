//! Built-in functions and constants
//!
//! | Function | Signature | Description |
//! |----------|-----------|-------------|
//! | `sin`, `cos` | `sin(x)` | Radians |
//! | `tan` / `tg` | `tan(x)` | Tangent |
//! | `cot` / `ctg` | `cot(x)` | 1 / tan(x); rejects tan(x) == 0 |
//! | `lg` | `lg(x)` | Base-10 logarithm, x > 0 |
//! | `ln` | `ln(x)` | Natural logarithm, x > 0 |
//! | `log` | `log(x)` | Binary exponent of x (C `logb`), x > 0 |
//! | `exp` | `exp(x)` | e^x |
//! | `abs` | `abs(x)` | Absolute value |
//! | `sqrt` | `sqrt(x)` | Square root, x > 0 |
//! | `pow` | `pow(a, b)` | a^b |
//! | `min`, `max` | `min(a, b)` | Smaller / larger of two |
//!
//! Note that `log` is not a conventional logarithm: `log(10)` is `3`.

use std::f64::consts;

use tracing::trace;

use crate::error::{CalcError, Result};

/// Named constants, matched case-insensitively
pub fn constant(name: &str) -> Option<f64> {
    match name.to_ascii_lowercase().as_str() {
        "pi" => Some(consts::PI),
        "e" => Some(consts::E),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryFunction {
    Sin,
    Cos,
    Tan,
    Cot,
    Lg,
    Ln,
    Log,
    Exp,
    Abs,
    Sqrt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFunction {
    Pow,
    Min,
    Max,
}

impl UnaryFunction {
    pub fn lookup(name: &str) -> Option<Self> {
        let f = match name.to_ascii_lowercase().as_str() {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" | "tg" => Self::Tan,
            "cot" | "ctg" => Self::Cot,
            "lg" => Self::Lg,
            "ln" => Self::Ln,
            "log" => Self::Log,
            "exp" => Self::Exp,
            "abs" => Self::Abs,
            "sqrt" => Self::Sqrt,
            _ => return None,
        };
        Some(f)
    }

    pub fn call(self, arg: f64) -> Result<f64> {
        trace!(function = ?self, arg, "call");
        match self {
            Self::Sin => Ok(arg.sin()),
            Self::Cos => Ok(arg.cos()),
            Self::Tan => Ok(arg.tan()),
            Self::Cot => cot(arg),
            Self::Lg => Ok(positive("lg", arg)?.log10()),
            Self::Ln => Ok(positive("ln", arg)?.ln()),
            Self::Log => Ok(binary_exponent(positive("log", arg)?)),
            Self::Exp => Ok(arg.exp()),
            Self::Abs => Ok(arg.abs()),
            Self::Sqrt => Ok(positive("sqrt", arg)?.sqrt()),
        }
    }
}

impl BinaryFunction {
    pub fn lookup(name: &str) -> Option<Self> {
        let f = match name.to_ascii_lowercase().as_str() {
            "pow" => Self::Pow,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => return None,
        };
        Some(f)
    }

    /// Call with the arguments in the order they were written
    pub fn call(self, first: f64, second: f64) -> Result<f64> {
        trace!(function = ?self, first, second, "call");
        let result = match self {
            Self::Pow => first.powf(second),
            Self::Min => first.min(second),
            Self::Max => first.max(second),
        };
        Ok(result)
    }
}

/// Unary or binary function resolved from a name and argument count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Unary(UnaryFunction),
    Binary(BinaryFunction),
}

impl Function {
    pub fn resolve(name: &str, arity: usize) -> Result<Self> {
        let found = match arity {
            1 => UnaryFunction::lookup(name).map(Self::Unary),
            2 => BinaryFunction::lookup(name).map(Self::Binary),
            _ => None,
        };
        found.ok_or_else(|| CalcError::unknown_function(name.to_ascii_lowercase()))
    }

    /// Whether `name` is a function of any arity
    pub fn exists(name: &str) -> bool {
        UnaryFunction::lookup(name).is_some() || BinaryFunction::lookup(name).is_some()
    }

    pub fn arity(self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }

    pub fn call(self, args: &[f64]) -> Result<f64> {
        match (self, args) {
            (Self::Unary(f), [x]) => f.call(*x),
            (Self::Binary(f), [a, b]) => f.call(*a, *b),
            _ => Err(CalcError::malformed(format!(
                "expected {} argument(s), got {}",
                self.arity(),
                args.len()
            ))),
        }
    }
}

fn positive(name: &str, arg: f64) -> Result<f64> {
    if arg <= 0.0 {
        return Err(CalcError::domain(format!(
            "{} requires a positive argument, got {}",
            name, arg
        )));
    }
    Ok(arg)
}

fn cot(arg: f64) -> Result<f64> {
    let tan = arg.tan();
    if tan == 0.0 {
        return Err(CalcError::domain(format!("cot undefined at {}", arg)));
    }
    Ok(1.0 / tan)
}

/// Unbiased exponent of a positive float, floor(log2(x)), read from its bits
fn binary_exponent(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let bits = x.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    if biased == 0 {
        // subnormal: value is mantissa * 2^-1074
        let mantissa = bits & 0x000f_ffff_ffff_ffff;
        f64::from(63 - mantissa.leading_zeros() as i32 - 1074)
    } else {
        f64::from(biased - 1023)
    }
}
