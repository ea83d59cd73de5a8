//! Error types for expr-calc

use thiserror::Error;

/// Evaluation errors
///
/// Every variant aborts the evaluation that raised it, including any
/// enclosing function-argument evaluations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Mismatched bracket")]
    MismatchedBracket,

    #[error("Invalid character: '{0}'")]
    InvalidCharacter(char),

    #[error("Unknown operator: '{0}'")]
    UnknownOperator(char),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    #[error("Nesting too deep: limit is {0}")]
    NestingTooDeep(usize),
}

/// Fieldless error category, for callers that only branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MismatchedBracket,
    InvalidCharacter,
    UnknownOperator,
    UnknownFunction,
    UnknownSymbol,
    DomainError,
    MalformedExpression,
    NestingTooDeep,
}

impl CalcError {
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction(name.into())
    }

    pub fn unknown_symbol(name: impl Into<String>) -> Self {
        Self::UnknownSymbol(name.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::DomainError(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedExpression(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MismatchedBracket => ErrorKind::MismatchedBracket,
            Self::InvalidCharacter(_) => ErrorKind::InvalidCharacter,
            Self::UnknownOperator(_) => ErrorKind::UnknownOperator,
            Self::UnknownFunction(_) => ErrorKind::UnknownFunction,
            Self::UnknownSymbol(_) => ErrorKind::UnknownSymbol,
            Self::DomainError(_) => ErrorKind::DomainError,
            Self::MalformedExpression(_) => ErrorKind::MalformedExpression,
            Self::NestingTooDeep(_) => ErrorKind::NestingTooDeep,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
