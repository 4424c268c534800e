//! Offset resolution: where in an event a token's replacement goes.

use crate::error::TokenError;
use regex::Regex;
use std::ops::Range;
use token_core::{Token, TokenFormat};

/// Byte range of the first occurrence of `token` in `event`.
///
/// `template` tokens match their literal pattern. `regex` tokens match their
/// pattern and resolve to the first capture group when the pattern has one,
/// otherwise to the whole match.
pub fn replacement_offsets(event: &str, token: &Token) -> Result<Range<usize>, TokenError> {
    replacement_offsets_from(event, token, 0)
}

/// Like [`replacement_offsets`], but only considers matches starting at or
/// after byte offset `start`. Offsets are relative to the whole event.
pub fn replacement_offsets_from(
    event: &str,
    token: &Token,
    start: usize,
) -> Result<Range<usize>, TokenError> {
    let found = match token.format {
        TokenFormat::Template => event
            .get(start..)
            .and_then(|rest| rest.find(&token.pattern))
            .map(|pos| start + pos..start + pos + token.pattern.len()),
        TokenFormat::Regex => {
            let re = compile(token)?;
            if start > event.len() {
                None
            } else {
                regex_span(&re, event, start)
            }
        }
    };

    found.ok_or_else(|| TokenError::NotFound {
        token: token.name.clone(),
        field: token.field.clone(),
    })
}

fn compile(token: &Token) -> Result<Regex, TokenError> {
    Regex::new(&token.pattern).map_err(|source| TokenError::Pattern {
        token: token.name.clone(),
        source,
    })
}

fn regex_span(re: &Regex, event: &str, start: usize) -> Option<Range<usize>> {
    let caps = re.captures_at(event, start)?;
    // A declared group that did not take part in the match has nothing to replace
    let group = if re.captures_len() > 1 { 1 } else { 0 };
    caps.get(group).map(|m| m.range())
}

#[cfg(test)]
mod tests {
    use super::*;
    use token_core::TokenValue;

    fn static_value() -> TokenValue {
        TokenValue::Static {
            replacement: "X".to_string(),
        }
    }

    #[test]
    fn test_template_first_occurrence() {
        let token = Token::template("t", "%s%", static_value()).unwrap();
        assert_eq!(replacement_offsets("a=%s% b=%s%", &token).unwrap(), 2..5);
    }

    #[test]
    fn test_template_not_found() {
        let token = Token::template("t", "%missing%", static_value()).unwrap();
        let err = replacement_offsets("a=%s%", &token).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_template_from_offset() {
        let token = Token::template("t", "%s%", static_value()).unwrap();
        assert_eq!(
            replacement_offsets_from("a=%s% b=%s%", &token, 3).unwrap(),
            8..11
        );
        assert!(replacement_offsets_from("a=%s%", &token, 99)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_regex_capture_group_span() {
        let token = Token::regex("t", r"user=(\w+)", static_value()).unwrap();
        assert_eq!(
            replacement_offsets("id=1 user=bob end", &token).unwrap(),
            10..13
        );
    }

    #[test]
    fn test_regex_whole_match_without_group() {
        let token = Token::regex("t", r"\d{3}", static_value()).unwrap();
        assert_eq!(replacement_offsets("code 404 x", &token).unwrap(), 5..8);
    }

    #[test]
    fn test_regex_unparticipating_group_is_not_found() {
        let token = Token::regex("t", r"a(b)?c", static_value()).unwrap();
        assert!(replacement_offsets("xacx", &token).unwrap_err().is_not_found());
    }

    #[test]
    fn test_regex_compile_error_is_not_not_found() {
        let token = Token::regex("t", r"(unclosed", static_value()).unwrap();
        let err = replacement_offsets("(unclosed", &token).unwrap_err();
        assert!(matches!(err, TokenError::Pattern { .. }));
    }

    #[test]
    fn test_regex_no_match() {
        let token = Token::regex("t", r"\d+", static_value()).unwrap();
        assert!(replacement_offsets("no digits", &token)
            .unwrap_err()
            .is_not_found());
    }
}
