//! Small helpers for building `OxidbError::SyntaxError` with a consistent
//! message shape; the parser never constructs the variant by hand.

use crate::core::common::error::OxidbError;
use crate::core::query::sql::tokenizer::Spanned;

pub fn unexpected(found: &Spanned, expected: &str) -> OxidbError {
    OxidbError::SyntaxError {
        message: format!("expected {expected}, found {:?}", found.token),
        position: found.position,
    }
}

pub fn unexpected_eof(expected: &str, position: usize) -> OxidbError {
    OxidbError::SyntaxError { message: format!("expected {expected}, found end of input"), position }
}

pub fn unknown_keyword(found: &Spanned) -> OxidbError {
    OxidbError::SyntaxError {
        message: format!("unrecognized statement keyword {:?}", found.token),
        position: found.position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::sql::tokenizer::Token;

    #[test]
    fn unexpected_includes_position() {
        let spanned = Spanned { token: Token::Comma, position: 4 };
        let err = unexpected(&spanned, "identifier");
        assert!(matches!(err, OxidbError::SyntaxError { position: 4, .. }));
    }
}
