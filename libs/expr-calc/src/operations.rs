//! Operation registry
//!
//! Each operator maps to an [`Operation`] that pops its operands from an
//! [`OperandStack`] and pushes exactly one result. For binary operations
//! `arg1` is the top of the stack (the right operand) and `arg2` the value
//! below it (the left operand).

use std::collections::HashMap;

use tracing::trace;

use crate::error::{CalcError, Result};
use crate::operators::Operator;

/// Largest argument whose factorial is finite in `f64`
const MAX_FINITE_FACTORIAL: f64 = 170.0;

/// Operand stack shared by the scanner and the operations
#[derive(Debug, Default, Clone)]
pub struct OperandStack {
    values: Vec<f64>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Pop the top value; an empty stack means an operator had no operand
    pub fn pop(&mut self) -> Result<f64> {
        self.values
            .pop()
            .ok_or_else(|| CalcError::malformed("missing operand"))
    }

    /// Pop `(arg1, arg2)`: the top value, then the one beneath it
    pub fn pop_pair(&mut self) -> Result<(f64, f64)> {
        let arg1 = self.pop()?;
        let arg2 = self.pop()?;
        Ok((arg1, arg2))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the stack, requiring exactly one value
    pub fn into_result(mut self) -> Result<f64> {
        match self.values.len() {
            1 => self.pop(),
            0 => Err(CalcError::malformed("empty expression")),
            n => Err(CalcError::malformed(format!(
                "{} values left without an operator",
                n
            ))),
        }
    }
}

/// Apply one operator to the operand stack
pub type Operation = fn(&mut OperandStack) -> Result<()>;

/// Mapping from operator to its operation
///
/// Built once, explicitly, and read-only afterwards.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    operations: HashMap<Operator, Operation>,
}

impl OperationRegistry {
    /// Registry with nothing registered
    pub fn empty() -> Self {
        Self {
            operations: HashMap::new(),
        }
    }

    /// Registry with every operator of the table registered
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        registry.register(Operator::Equal, equal);
        registry.register(Operator::Less, less);
        registry.register(Operator::Greater, greater);
        registry.register(Operator::Add, add);
        registry.register(Operator::Subtract, subtract);
        registry.register(Operator::Multiply, multiply);
        registry.register(Operator::Divide, divide);
        registry.register(Operator::Modulo, modulo);
        registry.register(Operator::Power, power);
        registry.register(Operator::Factorial, factorial);
        registry.register(Operator::UnaryPlus, unary_plus);
        registry.register(Operator::UnaryMinus, unary_minus);

        registry
    }

    /// Install or replace the operation for `op`, returning the previous one
    pub fn register(&mut self, op: Operator, operation: Operation) -> Option<Operation> {
        self.operations.insert(op, operation)
    }

    pub fn contains(&self, op: Operator) -> bool {
        self.operations.contains_key(&op)
    }

    /// Look up the operation for `op` and run it against `stack`
    pub fn apply(&self, op: Operator, stack: &mut OperandStack) -> Result<()> {
        let operation = self
            .operations
            .get(&op)
            .ok_or(CalcError::UnknownOperator(op.glyph()))?;
        trace!(op = %op, depth = stack.len(), "reduce");
        operation(stack)
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn truth(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

pub fn equal(stack: &mut OperandStack) -> Result<()> {
    let (arg1, arg2) = stack.pop_pair()?;
    stack.push(truth(arg1 == arg2));
    Ok(())
}

pub fn less(stack: &mut OperandStack) -> Result<()> {
    let (arg1, arg2) = stack.pop_pair()?;
    stack.push(truth(arg2 < arg1));
    Ok(())
}

pub fn greater(stack: &mut OperandStack) -> Result<()> {
    let (arg1, arg2) = stack.pop_pair()?;
    stack.push(truth(arg2 > arg1));
    Ok(())
}

pub fn add(stack: &mut OperandStack) -> Result<()> {
    let (arg1, arg2) = stack.pop_pair()?;
    stack.push(arg2 + arg1);
    Ok(())
}

pub fn subtract(stack: &mut OperandStack) -> Result<()> {
    let (arg1, arg2) = stack.pop_pair()?;
    stack.push(arg2 - arg1);
    Ok(())
}

pub fn multiply(stack: &mut OperandStack) -> Result<()> {
    let (arg1, arg2) = stack.pop_pair()?;
    stack.push(arg2 * arg1);
    Ok(())
}

pub fn divide(stack: &mut OperandStack) -> Result<()> {
    let (arg1, arg2) = stack.pop_pair()?;
    if arg1 == 0.0 {
        return Err(CalcError::domain("division by zero"));
    }
    stack.push(arg2 / arg1);
    Ok(())
}

pub fn modulo(stack: &mut OperandStack) -> Result<()> {
    let (arg1, arg2) = stack.pop_pair()?;
    if arg1 == 0.0 {
        return Err(CalcError::domain("modulo by zero"));
    }
    // `%` on f64 truncates toward zero, like C's fmod
    stack.push(arg2 % arg1);
    Ok(())
}

pub fn power(stack: &mut OperandStack) -> Result<()> {
    let (arg1, arg2) = stack.pop_pair()?;
    stack.push(arg2.powf(arg1));
    Ok(())
}

pub fn factorial(stack: &mut OperandStack) -> Result<()> {
    let arg = stack.pop()?;
    stack.push(factorial_of(arg)?);
    Ok(())
}

/// n! for a non-negative integer n; 0! is 1
pub fn factorial_of(n: f64) -> Result<f64> {
    if n < 0.0 {
        return Err(CalcError::domain(format!(
            "factorial of negative number {}",
            n
        )));
    }
    if n.fract() != 0.0 {
        return Err(CalcError::domain(format!(
            "factorial of non-integer {}",
            n
        )));
    }
    if n > MAX_FINITE_FACTORIAL {
        return Ok(f64::INFINITY);
    }
    Ok((1..=n as u32).map(f64::from).product())
}

pub fn unary_plus(stack: &mut OperandStack) -> Result<()> {
    let arg = stack.pop()?;
    stack.push(arg);
    Ok(())
}

pub fn unary_minus(stack: &mut OperandStack) -> Result<()> {
    let arg = stack.pop()?;
    stack.push(-arg);
    Ok(())
}
