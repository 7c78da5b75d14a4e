//! Nickname admission rules.

use crate::domain::foundation::ValidationError;

/// Minimum nickname length in characters.
pub const NICKNAME_MIN_CHARS: usize = 2;

/// Maximum nickname length in characters.
pub const NICKNAME_MAX_CHARS: usize = 20;

/// Trims `raw` and checks its length, counted in Unicode scalars.
///
/// Returns the trimmed nickname.
pub fn validate_nickname(raw: &str) -> Result<String, ValidationError> {
    let nickname = raw.trim();
    if nickname.is_empty() {
        return Err(ValidationError::empty_field("nickname"));
    }

    let chars = nickname.chars().count();
    if !(NICKNAME_MIN_CHARS..=NICKNAME_MAX_CHARS).contains(&chars) {
        return Err(ValidationError::length_out_of_range(
            "nickname",
            NICKNAME_MIN_CHARS,
            NICKNAME_MAX_CHARS,
            chars,
        ));
    }

    Ok(nickname.to_string())
}
