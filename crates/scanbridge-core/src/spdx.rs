//! SPDX license expression parsing and validation.
//!
//! Backends report license findings as SPDX expression strings, which may be
//! compound (`MIT OR Apache-2.0`, `GPL-2.0-only WITH Classpath-exception-2.0`,
//! parenthesized combinations). Findings whose expression does not parse are
//! dropped by the result parser, so validation here has to be strict about
//! grammar but must not panic on arbitrary backend input.

use crate::error::SpdxParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier grammar: SPDX idstrings are alphanumeric plus `-` and `.`,
/// optionally ending in `+`. `LicenseRef-` / `DocumentRef-` prefixes reuse
/// the same character set.
static IDSTRING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9.-]+\+?$").expect("valid regex"));

/// A parsed SPDX license expression.
///
/// `Display` renders the canonical form, with parentheses around nested
/// `AND`/`OR` groups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpdxExpression {
    /// Simple license identifier (e.g. `MIT`, `LicenseRef-scanner-foo`)
    Simple(String),
    /// License with exception (e.g. `GPL-2.0-only WITH Classpath-exception-2.0`)
    WithException {
        /// The base license identifier
        license: String,
        /// The exception identifier
        exception: String,
    },
    /// Conjunction, both sides must be satisfied
    And(Box<SpdxExpression>, Box<SpdxExpression>),
    /// Disjunction, either side may be chosen
    Or(Box<SpdxExpression>, Box<SpdxExpression>),
}

impl SpdxExpression {
    /// Parse an SPDX expression string.
    ///
    /// # Errors
    /// Returns [`SpdxParseError`] if the string is empty, contains a token
    /// outside the SPDX grammar, or is not a well-formed expression.
    pub fn parse(input: &str) -> Result<Self, SpdxParseError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(SpdxParseError::Empty);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_or()?;
        if parser.pos < parser.tokens.len() {
            return Err(SpdxParseError::TrailingTokens(
                parser.tokens[parser.pos..]
                    .iter()
                    .map(Token::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
            ));
        }
        Ok(expr)
    }

    /// Collect all simple license identifiers in the expression.
    #[must_use]
    pub fn licenses(&self) -> Vec<&str> {
        match self {
            Self::Simple(id) => vec![id.as_str()],
            Self::WithException { license, .. } => vec![license.as_str()],
            Self::And(a, b) | Self::Or(a, b) => {
                let mut out = a.licenses();
                out.extend(b.licenses());
                out
            }
        }
    }
}

impl fmt::Display for SpdxExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(id) => write!(f, "{id}"),
            Self::WithException { license, exception } => {
                write!(f, "{license} WITH {exception}")
            }
            Self::And(a, b) => write!(f, "({a} AND {b})"),
            Self::Or(a, b) => write!(f, "({a} OR {b})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Identifier(String),
    And,
    Or,
    With,
    LParen,
    RParen,
}

impl Token {
    fn as_str(&self) -> &str {
        match self {
            Self::Identifier(id) => id,
            Self::And => "AND",
            Self::Or => "OR",
            Self::With => "WITH",
            Self::LParen => "(",
            Self::RParen => ")",
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, SpdxParseError> {
    let mut tokens = Vec::new();
    // Make parens standalone words, then split on whitespace.
    let spaced = input.replace('(', " ( ").replace(')', " ) ");
    for word in spaced.split_whitespace() {
        let token = match word {
            "(" => Token::LParen,
            ")" => Token::RParen,
            "AND" => Token::And,
            "OR" => Token::Or,
            "WITH" => Token::With,
            id if IDSTRING_REGEX.is_match(id) => Token::Identifier(id.to_string()),
            other => return Err(SpdxParseError::InvalidToken(other.to_string())),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

/// Recursive-descent parser with `OR` binding weaker than `AND`, which in
/// turn binds weaker than `WITH`.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn parse_or(&mut self) -> Result<SpdxExpression, SpdxParseError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = SpdxExpression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<SpdxExpression, SpdxParseError> {
        let mut left = self.parse_primary()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.parse_primary()?;
            left = SpdxExpression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<SpdxExpression, SpdxParseError> {
        match self.peek().cloned() {
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(SpdxParseError::UnbalancedParens);
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(Token::Identifier(id)) => {
                self.pos += 1;
                if self.peek() == Some(&Token::With) {
                    self.pos += 1;
                    match self.peek().cloned() {
                        Some(Token::Identifier(exception)) => {
                            self.pos += 1;
                            Ok(SpdxExpression::WithException {
                                license: id,
                                exception,
                            })
                        }
                        other => Err(SpdxParseError::UnexpectedOperator(
                            other.map_or_else(|| "WITH".to_string(), |t| t.as_str().to_string()),
                        )),
                    }
                } else {
                    Ok(SpdxExpression::Simple(id))
                }
            }
            Some(token) => Err(SpdxParseError::UnexpectedOperator(
                token.as_str().to_string(),
            )),
            None => Err(SpdxParseError::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_identifier() {
        let expr = SpdxExpression::parse("MIT").expect("parse MIT");
        assert_eq!(expr, SpdxExpression::Simple("MIT".to_string()));
        assert_eq!(expr.to_string(), "MIT");
    }

    #[test]
    fn test_plus_suffix_and_license_ref() {
        assert!(SpdxExpression::parse("GPL-2.0+").is_ok());
        assert!(SpdxExpression::parse("LicenseRef-scancode-unknown").is_ok());
    }

    #[test]
    fn test_with_exception() {
        let expr = SpdxExpression::parse("GPL-2.0-only WITH Classpath-exception-2.0")
            .expect("parse WITH expression");
        assert_eq!(
            expr,
            SpdxExpression::WithException {
                license: "GPL-2.0-only".to_string(),
                exception: "Classpath-exception-2.0".to_string(),
            }
        );
    }

    #[test]
    fn test_precedence_or_weaker_than_and() {
        let expr = SpdxExpression::parse("MIT AND BSD-2-Clause OR Apache-2.0")
            .expect("parse compound expression");
        assert_eq!(expr.to_string(), "((MIT AND BSD-2-Clause) OR Apache-2.0)");
    }

    #[test]
    fn test_parenthesized() {
        let expr = SpdxExpression::parse("(MIT OR Apache-2.0) AND ISC")
            .expect("parse parenthesized expression");
        assert_eq!(expr.to_string(), "((MIT OR Apache-2.0) AND ISC)");
    }

    #[test]
    fn test_licenses_collection() {
        let expr = SpdxExpression::parse("MIT AND (Apache-2.0 OR GPL-3.0-only)")
            .expect("parse compound expression");
        assert_eq!(expr.licenses(), vec!["MIT", "Apache-2.0", "GPL-3.0-only"]);
    }

    #[test]
    fn test_invalid_expressions() {
        assert_eq!(SpdxExpression::parse(""), Err(SpdxParseError::Empty));
        assert_eq!(SpdxExpression::parse("   "), Err(SpdxParseError::Empty));
        assert!(matches!(
            SpdxExpression::parse("MIT AND"),
            Err(SpdxParseError::Empty)
        ));
        assert!(matches!(
            SpdxExpression::parse("AND MIT"),
            Err(SpdxParseError::UnexpectedOperator(_))
        ));
        assert!(matches!(
            SpdxExpression::parse("(MIT OR Apache-2.0"),
            Err(SpdxParseError::UnbalancedParens)
        ));
        assert!(matches!(
            SpdxExpression::parse("MIT Apache-2.0"),
            Err(SpdxParseError::TrailingTokens(_))
        ));
        assert!(matches!(
            SpdxExpression::parse("MIT;GPL"),
            Err(SpdxParseError::InvalidToken(_))
        ));
    }
}
