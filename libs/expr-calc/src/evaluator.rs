//! Calculator - operator-precedence expression evaluator
//!
//! Scans the expression once, left to right, keeping an operand stack and a
//! stack of pending operators and open-bracket markers. An incoming operator
//! first reduces every waiting operator of greater or equal precedence, so
//! all binary operators associate to the left (`2^3^2` is `(2^3)^2`).
//!
//! Function arguments are evaluated by recursing into the same pipeline
//! (validation included) over the text between the call's brackets.

use tracing::debug;

use crate::builtin_functions::{constant, Function};
use crate::config::EvaluatorConfig;
use crate::error::{CalcError, Result};
use crate::operations::{OperandStack, OperationRegistry};
use crate::operators::{Fixity, Operator};
use crate::validate::{check_brackets, check_characters, is_close_bracket, is_open_bracket};

/// Calculator - expression evaluation engine
///
/// # Example
/// ```
/// use expr_calc::Calculator;
///
/// let calc = Calculator::new();
/// assert_eq!(calc.evaluate("2 + 3 * 4").unwrap(), 14.0);
/// assert_eq!(calc.evaluate("max(3, 5)").unwrap(), 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct Calculator {
    registry: OperationRegistry,
    config: EvaluatorConfig,
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_config(EvaluatorConfig::default())
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self::with_registry(OperationRegistry::standard(), config)
    }

    /// Use a custom operation registry
    pub fn with_registry(registry: OperationRegistry, config: EvaluatorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate one expression to a single number
    pub fn evaluate(&self, text: &str) -> Result<f64> {
        let result = self.evaluate_nested(text, 0);
        match &result {
            Ok(value) => debug!(input = text, result = value, "evaluated"),
            Err(e) => debug!(input = text, error = %e, "evaluation failed"),
        }
        result
    }

    fn evaluate_nested(&self, text: &str, depth: usize) -> Result<f64> {
        if depth > self.config.max_depth {
            return Err(CalcError::NestingTooDeep(self.config.max_depth));
        }

        check_brackets(text)?;
        check_characters(text)?;

        let expr: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        Scanner::new(self, &expr, depth).run()
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry on the operator stack
#[derive(Debug, Clone, Copy)]
enum Pending {
    Operator(Operator),
    /// Open bracket, with the operand count at the moment it was opened
    Open { base: usize },
}

/// State of one pass over one (whitespace-free) expression
struct Scanner<'a> {
    calc: &'a Calculator,
    text: &'a str,
    pos: usize,
    depth: usize,
    open_groups: usize,
    operands: OperandStack,
    pending: Vec<Pending>,
    /// Whether the last token completed a value, which decides whether a
    /// sign is binary or prefix
    after_value: bool,
}

impl<'a> Scanner<'a> {
    fn new(calc: &'a Calculator, text: &'a str, depth: usize) -> Self {
        Self {
            calc,
            text,
            pos: 0,
            depth,
            open_groups: 0,
            operands: OperandStack::new(),
            pending: Vec::new(),
            after_value: false,
        }
    }

    fn run(mut self) -> Result<f64> {
        let text = self.text;
        let bytes = text.as_bytes();

        while self.pos < bytes.len() {
            let c = char::from(bytes[self.pos]);

            if is_open_bracket(c) {
                self.open_bracket()?;
            } else if is_close_bracket(c) {
                self.close_bracket()?;
            } else if c == ',' {
                self.comma()?;
            } else if Operator::is_glyph(c) {
                self.operator(c)?;
            } else if c.is_ascii_alphabetic() {
                self.identifier()?;
            } else {
                self.number(c)?;
            }
        }

        self.finish()
    }

    /// Nesting level a new bracket at the current position would reach
    fn next_level(&self) -> usize {
        self.depth + self.open_groups + 1
    }

    fn open_bracket(&mut self) -> Result<()> {
        if self.next_level() > self.calc.config.max_depth {
            return Err(CalcError::NestingTooDeep(self.calc.config.max_depth));
        }
        self.pending.push(Pending::Open {
            base: self.operands.len(),
        });
        self.open_groups += 1;
        self.after_value = false;
        self.pos += 1;
        Ok(())
    }

    fn close_bracket(&mut self) -> Result<()> {
        let base = self.reduce_to_open()?.ok_or(CalcError::MismatchedBracket)?;
        if self.operands.len() != base + 1 {
            return Err(CalcError::malformed("bracket group must hold one value"));
        }
        self.pending.pop();
        self.open_groups -= 1;
        self.after_value = true;
        self.pos += 1;
        Ok(())
    }

    fn comma(&mut self) -> Result<()> {
        if self.reduce_to_open()?.is_none() {
            return Err(CalcError::malformed("comma outside of brackets"));
        }
        self.after_value = false;
        self.pos += 1;
        Ok(())
    }

    fn operator(&mut self, glyph: char) -> Result<()> {
        let op = match (self.after_value, Operator::prefix(glyph)) {
            (false, Some(prefix)) => prefix,
            (false, None) => {
                return Err(CalcError::malformed(format!(
                    "operator '{}' is missing its left operand",
                    glyph
                )))
            },
            (true, _) => Operator::from_glyph(glyph).ok_or(CalcError::UnknownOperator(glyph))?,
        };

        // a prefix operator has nothing on its left to complete
        if op.fixity() != Fixity::Prefix {
            while let Some(Pending::Operator(top)) = self.pending.last().copied() {
                if top.precedence() < op.precedence() {
                    break;
                }
                self.pending.pop();
                self.reduce(top)?;
            }
        }

        self.pending.push(Pending::Operator(op));
        self.after_value = op.fixity() == Fixity::Postfix;
        self.pos += 1;
        Ok(())
    }

    fn identifier(&mut self) -> Result<()> {
        let text = self.text;
        let bytes = text.as_bytes();
        let start = self.pos;
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
            end += 1;
        }
        let name = &text[start..end];

        if let Some(value) = constant(name) {
            self.operands.push(value);
            self.after_value = true;
            self.pos = end;
            return Ok(());
        }

        if !bytes.get(end).is_some_and(|b| is_open_bracket(char::from(*b))) {
            return Err(if Function::exists(name) {
                CalcError::malformed(format!("function '{}' needs an argument list", name))
            } else {
                CalcError::unknown_symbol(name)
            });
        }

        let close = self.matching_close(end)?;
        let args = split_arguments(&text[end + 1..close]);
        if args.len() > 2 {
            return Err(CalcError::malformed(format!(
                "function '{}' takes at most two arguments, got {}",
                name,
                args.len()
            )));
        }
        let function = Function::resolve(name, args.len())?;

        let level = self.next_level();
        let values = args
            .iter()
            .map(|arg| self.calc.evaluate_nested(arg, level))
            .collect::<Result<Vec<f64>>>()?;

        self.operands.push(function.call(&values)?);
        self.after_value = true;
        self.pos = close + 1;
        Ok(())
    }

    fn number(&mut self, c: char) -> Result<()> {
        let text = self.text;
        let bytes = text.as_bytes();
        let start = self.pos;
        let mut end = start;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }
        if end == start {
            return Err(CalcError::InvalidCharacter(c));
        }

        let literal = &text[start..end];
        let value: f64 = literal
            .parse()
            .map_err(|_| CalcError::malformed(format!("invalid number '{}'", literal)))?;

        self.operands.push(value);
        self.after_value = true;
        self.pos = end;
        Ok(())
    }

    /// Reduce until an open-bracket marker is on top, returning its base
    /// operand count, or `None` if the operator stack ran out first
    fn reduce_to_open(&mut self) -> Result<Option<usize>> {
        loop {
            match self.pending.last().copied() {
                Some(Pending::Open { base }) => return Ok(Some(base)),
                Some(Pending::Operator(op)) => {
                    self.pending.pop();
                    self.reduce(op)?;
                },
                None => return Ok(None),
            }
        }
    }

    fn reduce(&mut self, op: Operator) -> Result<()> {
        self.calc.registry.apply(op, &mut self.operands)
    }

    /// Index of the bracket closing the one at `open`
    fn matching_close(&self, open: usize) -> Result<usize> {
        let mut level = 0usize;
        for (i, b) in self.text.bytes().enumerate().skip(open) {
            let c = char::from(b);
            if is_open_bracket(c) {
                level += 1;
            } else if is_close_bracket(c) {
                level -= 1;
                if level == 0 {
                    return Ok(i);
                }
            }
        }
        Err(CalcError::MismatchedBracket)
    }

    fn finish(mut self) -> Result<f64> {
        while let Some(pending) = self.pending.pop() {
            match pending {
                Pending::Operator(op) => self.reduce(op)?,
                Pending::Open { .. } => return Err(CalcError::MismatchedBracket),
            }
        }
        self.operands.into_result()
    }
}

/// Split an argument list at commas that are not nested in inner brackets
fn split_arguments(list: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut level = 0usize;
    let mut start = 0;

    for (i, b) in list.bytes().enumerate() {
        let c = char::from(b);
        if is_open_bracket(c) {
            level += 1;
        } else if is_close_bracket(c) {
            level = level.saturating_sub(1);
        } else if c == ',' && level == 0 {
            args.push(&list[start..i]);
            start = i + 1;
        }
    }
    args.push(&list[start..]);
    args
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::operations;
    use tracing_test::traced_test;

    fn eval(text: &str) -> f64 {
        Calculator::new()
            .evaluate(text)
            .unwrap_or_else(|e| panic!("'{}' failed: {}", text, e))
    }

    fn eval_err(text: &str) -> ErrorKind {
        match Calculator::new().evaluate(text) {
            Ok(v) => panic!("'{}' should fail, got {}", text, v),
            Err(e) => e.kind(),
        }
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(split_arguments("1"), vec!["1"]);
        assert_eq!(split_arguments("2,3"), vec!["2", "3"]);
        assert_eq!(split_arguments("max(1,2),3"), vec!["max(1,2)", "3"]);
        assert_eq!(split_arguments("[1,2]"), vec!["[1,2]"]);
        assert_eq!(split_arguments(""), vec![""]);
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(eval("2+3*4"), 14.0);
        assert_eq!(eval("(2+3)*4"), 20.0);
        assert_eq!(eval("2*3^2"), 18.0);
        assert_eq!(eval("10-4/2"), 8.0);
        assert_eq!(eval("7%4*2"), 6.0);
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(eval("2-3-4"), -5.0);
        assert_eq!(eval("2^3^2"), 64.0);
        assert_eq!(eval("64/4/2"), 8.0);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(eval("  1 +\t2 * ( 3 - 1 ) "), 5.0);
    }

    #[test]
    fn test_sign_handling() {
        assert_eq!(eval("-5"), -5.0);
        assert_eq!(eval("+5"), 5.0);
        assert_eq!(eval("3*-2"), -6.0);
        assert_eq!(eval("(-3)"), -3.0);
        assert_eq!(eval("2--3"), 5.0);
        assert_eq!(eval("-(2+3)"), -5.0);
        assert!((eval("3^-2") - 1.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_prefix_after_prefix() {
        assert_eq!(eval("--3"), 3.0);
        assert_eq!(eval("2*-+3"), -6.0);
    }

    #[test]
    fn test_binary_minus_after_value() {
        assert_eq!(eval("5!-1"), 119.0);
        assert_eq!(eval("(2)-1"), 1.0);
        assert_eq!(eval("1.5-1"), 0.5);
        assert!((eval("pi-1") - (std::f64::consts::PI - 1.0)).abs() < 1e-12);
        assert_eq!(eval("abs(-2)-1"), 1.0);
    }

    #[test]
    fn test_bracket_groups() {
        assert_eq!(eval("[1+2]*{3}"), 9.0);
        assert_eq!(eval("{[(1+1)*2]^2}"), 16.0);
        assert_eq!(eval_err("()"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("2()"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("(1,2)"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("1,2"), ErrorKind::MalformedExpression);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(eval("0!"), 1.0);
        assert_eq!(eval("5!"), 120.0);
        assert_eq!(eval("3!^2"), 36.0);
        assert_eq!(eval("2*3!"), 12.0);
        assert_eq!(eval("(1+2)!"), 6.0);
        assert_eq!(eval_err("-1!"), ErrorKind::DomainError);
        assert_eq!(eval_err("2.5!"), ErrorKind::DomainError);
        assert_eq!(eval_err("!3"), ErrorKind::MalformedExpression);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("1+1=2"), 1.0);
        assert_eq!(eval("2=3"), 0.0);
        assert_eq!(eval("3>2"), 1.0);
        assert_eq!(eval("2<1"), 0.0);
        assert_eq!(eval("(1<2)+(2<3)"), 2.0);
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("sin(0)"), 0.0);
        assert_eq!(eval("pow(2,3)"), 8.0);
        assert_eq!(eval("max(3,5)"), 5.0);
        assert_eq!(eval("min(3, 5)"), 3.0);
        assert_eq!(eval("SQRT(16)"), 4.0);
        assert_eq!(eval("max(min(1,2),pow(2,2))"), 4.0);
        assert_eq!(eval("pow[2, (1+2)]"), 8.0);
        assert_eq!(eval("abs(-3)*2"), 6.0);
        assert_eq!(eval("log(1024)"), 10.0);
        assert_eq!(eval("-abs(4)"), -4.0);
    }

    #[test]
    fn test_function_errors() {
        assert_eq!(eval_err("foo(1)"), ErrorKind::UnknownFunction);
        assert_eq!(eval_err("sin(1,2)"), ErrorKind::UnknownFunction);
        assert_eq!(eval_err("max(1)"), ErrorKind::UnknownFunction);
        assert_eq!(eval_err("max(1,2,3)"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("sin()"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("sin"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("foo"), ErrorKind::UnknownSymbol);
        assert_eq!(eval_err("sqrt(-1)"), ErrorKind::DomainError);
        assert_eq!(eval_err("ln(1-1)"), ErrorKind::DomainError);
    }

    #[test]
    fn test_errors_propagate_from_arguments() {
        assert_eq!(eval_err("max(1/0, 2)"), ErrorKind::DomainError);
        assert_eq!(eval_err("abs(2+)"), ErrorKind::MalformedExpression);
    }

    #[test]
    fn test_constants() {
        assert!((eval("pi") - std::f64::consts::PI).abs() < 1e-12);
        assert!((eval("2*e") - 2.0 * std::f64::consts::E).abs() < 1e-12);
        assert!((eval("PI/2") - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(eval("cos(pi)") + 1.0 < 1e-12);
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(eval_err("1/0"), ErrorKind::DomainError);
        assert_eq!(eval_err("5%0"), ErrorKind::DomainError);
        assert_eq!(eval_err("1/(2-2)"), ErrorKind::DomainError);
    }

    #[test]
    fn test_malformed() {
        assert_eq!(eval_err("2+"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("*2"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("2**3"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("1.2.3"), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("."), ErrorKind::MalformedExpression);
        assert_eq!(eval_err(""), ErrorKind::MalformedExpression);
        assert_eq!(eval_err("2 pi"), ErrorKind::MalformedExpression);
    }

    #[test]
    fn test_decimal_literals() {
        assert_eq!(eval("1.5*2"), 3.0);
        assert_eq!(eval(".5+.5"), 1.0);
        assert_eq!(eval("5."), 5.0);
    }

    #[test]
    fn test_validation_runs_first() {
        assert_eq!(eval_err("(1+2]"), ErrorKind::MismatchedBracket);
        assert_eq!(eval_err("(2+3"), ErrorKind::MismatchedBracket);
        assert_eq!(eval_err("2#3"), ErrorKind::InvalidCharacter);
        assert_eq!(eval_err("2@"), ErrorKind::InvalidCharacter);
        // bracket check wins over the character check
        assert_eq!(eval_err("(2#"), ErrorKind::MismatchedBracket);
    }

    #[test]
    fn test_nesting_limit() {
        let calc = Calculator::with_config(EvaluatorConfig::default().with_max_depth(3));
        assert_eq!(calc.evaluate("((1))").unwrap(), 1.0);
        assert_eq!(calc.evaluate("abs(abs(abs(1)))").unwrap(), 1.0);
        assert_eq!(
            calc.evaluate("((((1))))"),
            Err(CalcError::NestingTooDeep(3))
        );
        assert_eq!(
            calc.evaluate("abs(abs(abs(abs(1))))"),
            Err(CalcError::NestingTooDeep(3))
        );
        assert_eq!(
            calc.evaluate("(abs((abs(1))))"),
            Err(CalcError::NestingTooDeep(3))
        );
    }

    #[test]
    fn test_default_limit_stops_adversarial_input() {
        let text = format!("{}1{}", "sqrt(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(eval_err(&text), ErrorKind::NestingTooDeep);

        let text = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(eval_err(&text), ErrorKind::NestingTooDeep);
    }

    #[test]
    fn test_custom_registry() {
        let mut registry = OperationRegistry::standard();
        registry.register(Operator::Add, operations::multiply);
        let calc = Calculator::with_registry(registry, EvaluatorConfig::default());
        assert_eq!(calc.evaluate("3+4").unwrap(), 12.0);

        let calc = Calculator::with_registry(OperationRegistry::empty(), EvaluatorConfig::default());
        assert_eq!(calc.evaluate("3+4"), Err(CalcError::UnknownOperator('+')));
        assert_eq!(calc.evaluate("3").unwrap(), 3.0);
    }

    #[test]
    fn test_deterministic() {
        let calc = Calculator::new();
        let text = "sin(1.2)*pow(3,0.5)-ln(7)/lg(4)+5!%7";
        assert_eq!(calc.evaluate(text), calc.evaluate(text));
    }

    #[traced_test]
    #[test]
    fn test_failures_are_logged() {
        let _ = Calculator::new().evaluate("1/0");
        assert!(logs_contain("evaluation failed"));
        assert!(logs_contain("division by zero"));
    }
}
