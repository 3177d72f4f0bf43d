//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They run before any
//! store access, so a rejected input never costs a round-trip.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Longest accepted message body, in characters.
pub const MAX_BODY_CHARS: usize = 280;

/// Check `value` against `^[a-z][a-z_.\-0-9]*$`.
pub(crate) fn validate_username(value: &str) -> ResultEngine<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_lowercase() => chars.all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')
        }),
        _ => false,
    };
    if !valid {
        return Err(EngineError::InvalidUsername(value.to_string()));
    }
    Ok(())
}

/// Trim a display name, rejecting it when nothing is left.
pub(crate) fn normalize_required_name(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Parse a UUID and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(label.to_string()))
}

/// Shape check for a message about to be sent. Every failing field is
/// reported in one `BadRequest`.
pub(crate) fn validate_message_shape(from: &str, to: &str, body: &str) -> ResultEngine<()> {
    let mut reasons = Vec::new();
    if to.is_empty() {
        reasons.push("empty recipient".to_string());
    }
    if from.is_empty() {
        reasons.push("empty sender".to_string());
    }
    if body.is_empty() {
        reasons.push("empty body".to_string());
    } else if body.chars().count() > MAX_BODY_CHARS {
        reasons.push(format!("body exceeds {MAX_BODY_CHARS} characters"));
    }
    if !reasons.is_empty() {
        return Err(EngineError::BadRequest(reasons.join(", ")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_usernames() {
        for username in ["orange", "a", "b.a-n_4na", "x0"] {
            assert_eq!(validate_username(username), Ok(()), "{username}");
        }
    }

    #[test]
    fn rejects_malformed_usernames() {
        for username in ["", "Orange", "0range", ".orange", "or ange", "orangé", "_x"] {
            assert_eq!(
                validate_username(username),
                Err(EngineError::InvalidUsername(username.to_string())),
                "{username}"
            );
        }
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(normalize_required_name("   "), Err(EngineError::BlankName));
        assert_eq!(normalize_required_name(" Orange "), Ok("Orange".to_string()));
    }

    #[test]
    fn invalid_ids_carry_their_label() {
        assert_eq!(
            parse_uuid("5a8d75057d9b53706595116a", "user"),
            Err(EngineError::InvalidId("user".to_string()))
        );
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string(), "user"), Ok(id));
    }

    #[test]
    fn body_length_counts_characters() {
        let body = "é".repeat(MAX_BODY_CHARS);
        assert_eq!(validate_message_shape("orange", "banana", &body), Ok(()));

        let body = "a".repeat(MAX_BODY_CHARS + 1);
        assert_eq!(
            validate_message_shape("orange", "banana", &body),
            Err(EngineError::BadRequest(
                "body exceeds 280 characters".to_string()
            ))
        );
    }

    #[test]
    fn every_missing_field_is_reported() {
        assert_eq!(
            validate_message_shape("", "", ""),
            Err(EngineError::BadRequest(
                "empty recipient, empty sender, empty body".to_string()
            ))
        );
    }
}
