//! Operator table
//!
//! Precedence levels, low to high:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | 0 | `=` `<` `>` |
//! | 1 | `+` `-` (binary) |
//! | 2 | `*` `/` `%` |
//! | 3 | `^` `!` |
//! | 4 | `+x` `-x` (unary) |

/// How an operator sits relative to its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Postfix,
    Infix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    Less,
    Greater,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Factorial,
    UnaryPlus,
    UnaryMinus,
}

impl Operator {
    /// Every operator, in precedence order
    pub const ALL: [Operator; 12] = [
        Operator::Equal,
        Operator::Less,
        Operator::Greater,
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::Modulo,
        Operator::Power,
        Operator::Factorial,
        Operator::UnaryPlus,
        Operator::UnaryMinus,
    ];

    /// Standard (non-prefix) form of a glyph
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '=' => Some(Self::Equal),
            '<' => Some(Self::Less),
            '>' => Some(Self::Greater),
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            '%' => Some(Self::Modulo),
            '^' => Some(Self::Power),
            '!' => Some(Self::Factorial),
            _ => None,
        }
    }

    /// Prefix form of a sign glyph
    pub fn prefix(glyph: char) -> Option<Self> {
        match glyph {
            '+' => Some(Self::UnaryPlus),
            '-' => Some(Self::UnaryMinus),
            _ => None,
        }
    }

    pub fn is_glyph(c: char) -> bool {
        Self::from_glyph(c).is_some()
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Equal => '=',
            Self::Less => '<',
            Self::Greater => '>',
            Self::Add | Self::UnaryPlus => '+',
            Self::Subtract | Self::UnaryMinus => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
            Self::Modulo => '%',
            Self::Power => '^',
            Self::Factorial => '!',
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Self::Equal | Self::Less | Self::Greater => 0,
            Self::Add | Self::Subtract => 1,
            Self::Multiply | Self::Divide | Self::Modulo => 2,
            Self::Power | Self::Factorial => 3,
            Self::UnaryPlus | Self::UnaryMinus => 4,
        }
    }

    pub fn fixity(self) -> Fixity {
        match self {
            Self::UnaryPlus | Self::UnaryMinus => Fixity::Prefix,
            Self::Factorial => Fixity::Postfix,
            _ => Fixity::Infix,
        }
    }

    /// Number of operand-stack values the operator consumes
    pub fn arity(self) -> usize {
        match self.fixity() {
            Fixity::Infix => 2,
            Fixity::Prefix | Fixity::Postfix => 1,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.fixity() {
            Fixity::Prefix => write!(f, "{}x", self.glyph()),
            _ => write!(f, "{}", self.glyph()),
        }
    }
}
