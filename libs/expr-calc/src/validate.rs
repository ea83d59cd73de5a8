//! Pre-scan checks run on every expression before it is evaluated

use tracing::debug;

use crate::error::{CalcError, Result};
use crate::operators::Operator;

pub fn is_open_bracket(c: char) -> bool {
    matches!(c, '(' | '[' | '{')
}

pub fn is_close_bracket(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

/// Open glyph paired with a close glyph
pub fn matching_open(close: char) -> Option<char> {
    match close {
        ')' => Some('('),
        ']' => Some('['),
        '}' => Some('{'),
        _ => None,
    }
}

/// Every close bracket must close the innermost open bracket of the same
/// family, and nothing may be left open.
pub fn check_brackets(text: &str) -> Result<()> {
    let mut open = Vec::new();

    for c in text.chars() {
        if is_open_bracket(c) {
            open.push(c);
        } else if let Some(expected) = matching_open(c) {
            if open.pop() != Some(expected) {
                debug!(input = text, close = %c, "unmatched close bracket");
                return Err(CalcError::MismatchedBracket);
            }
        }
    }

    if !open.is_empty() {
        debug!(input = text, unclosed = open.len(), "unclosed bracket");
        return Err(CalcError::MismatchedBracket);
    }
    Ok(())
}

pub fn is_allowed_char(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_digit()
        || c.is_ascii_alphabetic()
        || Operator::is_glyph(c)
        || is_open_bracket(c)
        || is_close_bracket(c)
        || c == '.'
        || c == ','
}

pub fn check_characters(text: &str) -> Result<()> {
    match text.chars().find(|c| !is_allowed_char(*c)) {
        Some(c) => {
            debug!(input = text, character = %c, "invalid character");
            Err(CalcError::InvalidCharacter(c))
        },
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_families() {
        assert!(check_brackets("(1+2)").is_ok());
        assert!(check_brackets("[1+2]").is_ok());
        assert!(check_brackets("{1+2}").is_ok());
        assert!(check_brackets("{[(1)]+(2)}").is_ok());
        assert!(check_brackets("no brackets").is_ok());
    }

    #[test]
    fn test_mismatched_families() {
        assert_eq!(check_brackets("(1+2]"), Err(CalcError::MismatchedBracket));
        assert_eq!(check_brackets("[1+2)"), Err(CalcError::MismatchedBracket));
        assert_eq!(check_brackets("([)]"), Err(CalcError::MismatchedBracket));
    }

    #[test]
    fn test_unclosed_and_stray() {
        assert_eq!(check_brackets("(2+3"), Err(CalcError::MismatchedBracket));
        assert_eq!(check_brackets("2+3)"), Err(CalcError::MismatchedBracket));
        assert_eq!(check_brackets(")("), Err(CalcError::MismatchedBracket));
    }

    #[test]
    fn test_character_classes() {
        assert!(check_characters(" 2 * sin(pi) + [3 % 2], 1.5 ! ^ = < >").is_ok());
        assert_eq!(
            check_characters("2#3"),
            Err(CalcError::InvalidCharacter('#'))
        );
        assert_eq!(check_characters("2@"), Err(CalcError::InvalidCharacter('@')));
        assert_eq!(
            check_characters("2 + π"),
            Err(CalcError::InvalidCharacter('π'))
        );
    }
}
