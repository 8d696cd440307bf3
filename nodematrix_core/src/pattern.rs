//! Slash-delimited pattern handling shared by the node and class registries
//!
//! A reference such as `/^role::/` is a regular expression; anything else,
//! including the single character `/`, is a literal name.

use crate::config::compile_time::pattern::{MAX_COMPILED_PATTERN_SIZE, MAX_PATTERN_LENGTH};
use regex::{Regex, RegexBuilder};

const DELIMITER: char = '/';

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("'{0}' is not a valid pattern")]
    NotAPattern(String),

    #[error("Pattern '{pattern}' failed to compile: {reason}")]
    InvalidExpression { pattern: String, reason: String },

    #[error("Pattern '{pattern}' is {length} characters long, limit is {limit}")]
    TooLong {
        pattern: String,
        length: usize,
        limit: usize,
    },
}

/// True iff `s` starts and ends with `/` and the two delimiters are distinct characters
pub fn is_pattern(s: &str) -> bool {
    s.len() >= 2 && s.starts_with(DELIMITER) && s.ends_with(DELIMITER)
}

/// Compile the expression between the delimiters
pub fn to_regex(s: &str) -> Result<Regex, PatternError> {
    if !is_pattern(s) {
        return Err(PatternError::NotAPattern(s.to_string()));
    }

    let expression = &s[1..s.len() - 1];
    if expression.len() > MAX_PATTERN_LENGTH {
        return Err(PatternError::TooLong {
            pattern: s.to_string(),
            length: expression.len(),
            limit: MAX_PATTERN_LENGTH,
        });
    }

    RegexBuilder::new(expression)
        .size_limit(MAX_COMPILED_PATTERN_SIZE)
        .build()
        .map_err(|e| PatternError::InvalidExpression {
            pattern: s.to_string(),
            reason: e.to_string(),
        })
}

/// A class or node reference as written in a test matrix
#[derive(Debug, Clone)]
pub enum Reference {
    Literal(String),
    Pattern { source: String, regex: Regex },
}

impl Reference {
    pub fn parse(s: &str) -> Result<Self, PatternError> {
        if is_pattern(s) {
            Ok(Reference::Pattern {
                source: s.to_string(),
                regex: to_regex(s)?,
            })
        } else {
            Ok(Reference::Literal(s.to_string()))
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Reference::Pattern { .. })
    }

    /// Literal references compare for equality; patterns search anywhere in `name`
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Reference::Literal(literal) => literal == name,
            Reference::Pattern { regex, .. } => regex.is_match(name),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Reference::Literal(literal) => literal,
            Reference::Pattern { source, .. } => source,
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_is_pattern() {
        assert!(is_pattern("/abc/"));
        assert!(is_pattern("/CentOS/"));
        assert!(!is_pattern("abc"));
        assert!(!is_pattern("CentOS-7.0-64"));
        assert!(!is_pattern("/a"));
        assert!(!is_pattern("a/"));
        assert!(!is_pattern(""));
    }

    #[test]
    fn test_single_slash_is_literal() {
        assert!(!is_pattern("/"));
        assert_matches!(Reference::parse("/"), Ok(Reference::Literal(s)) if s == "/");
        assert_matches!(to_regex("/"), Err(PatternError::NotAPattern(_)));
    }

    #[test]
    fn test_empty_expression_matches_everything() {
        assert!(is_pattern("//"));
        let regex = to_regex("//").unwrap();
        assert!(regex.is_match("anything"));
        assert!(regex.is_match(""));
    }

    #[test]
    fn test_to_regex_compiles_inner_expression() {
        let regex = to_regex("/CentOS/").unwrap();
        assert!(regex.is_match("CentOS-7.0-64"));
        assert!(!regex.is_match("Debian-8"));

        let anchored = to_regex("/^role::/").unwrap();
        assert!(anchored.is_match("role::webserver"));
        assert!(!anchored.is_match("profile::role::x"));
    }

    #[test]
    fn test_to_regex_rejects_non_patterns() {
        for input in ["CentOS", "/CentOS", "CentOS/", "", "/"] {
            assert_matches!(to_regex(input), Err(PatternError::NotAPattern(s)) if s == input);
        }
    }

    #[test]
    fn test_invalid_expression_is_reported() {
        assert_matches!(
            to_regex("/(unclosed/"),
            Err(PatternError::InvalidExpression { pattern, .. }) if pattern == "/(unclosed/"
        );
    }

    #[test]
    fn test_overlong_expression_is_rejected() {
        let long = format!("/{}/", "a".repeat(MAX_PATTERN_LENGTH + 1));
        assert_matches!(to_regex(&long), Err(PatternError::TooLong { .. }));
    }

    #[test]
    fn test_reference_matching() {
        let literal = Reference::parse("role::base").unwrap();
        assert!(!literal.is_pattern());
        assert!(literal.matches("role::base"));
        assert!(!literal.matches("role::base::extra"));

        let pattern = Reference::parse("/base/").unwrap();
        assert!(pattern.is_pattern());
        assert!(pattern.matches("role::base::extra"));
        assert_eq!(pattern.to_string(), "/base/");
    }
}
