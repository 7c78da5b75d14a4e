//! Self-certifying reconnect tokens.
//!
//! A token binds a numeric user id to a nickname under the server secret:
//!
//! ```text
//! base64(HMAC-SHA256(key = secret, nickname || secret || id)) "uid" id
//! ```
//!
//! Any instance holding the same secret can verify a token minted by another,
//! so identity continuity needs no server-side session storage. Changing the
//! nickname invalidates the token.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::domain::foundation::UserId;

/// Literal separating the encoded tag from the decimal identifier.
///
/// The standard base64 alphabet can contain this sequence, the decimal
/// suffix cannot, so the *last* occurrence is always the delimiter.
pub const TOKEN_DELIMITER: &str = "uid";

/// Reasons a presented token is rejected.
///
/// Callers treat every variant the same way: as if no token was presented.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,

    #[error("token has no identifier delimiter")]
    MissingDelimiter,

    #[error("token tag is not valid base64")]
    InvalidEncoding,

    #[error("token identifier is not a decimal number")]
    InvalidIdentifier,

    #[error("token identifier is reserved")]
    ReservedIdentifier,

    #[error("token signature does not match")]
    SignatureMismatch,
}

/// Mints and verifies reconnect tokens with a server-held secret.
pub struct TokenCodec {
    secret: SecretString,
}

impl TokenCodec {
    /// Creates a codec bound to the given secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Mints the token for `user_id` under `nickname`.
    pub fn mint(&self, user_id: UserId, nickname: &str) -> String {
        let tag = self.compute_tag(nickname, user_id);
        format!("{}{}{}", STANDARD.encode(tag), TOKEN_DELIMITER, user_id)
    }

    /// Verifies `token` against `nickname` and returns the identifier it carries.
    ///
    /// # Verification Steps
    ///
    /// 1. Split at the last delimiter
    /// 2. Decode the tag and parse the identifier
    /// 3. Recompute the expected tag for (nickname, secret, identifier)
    /// 4. Compare tags in constant time
    ///
    /// Never panics, whatever the input.
    pub fn verify(&self, token: &str, nickname: &str) -> Result<UserId, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Empty);
        }

        let pos = token
            .rfind(TOKEN_DELIMITER)
            .ok_or(TokenError::MissingDelimiter)?;
        let (encoded_tag, rest) = token.split_at(pos);
        let id_part = &rest[TOKEN_DELIMITER.len()..];

        let presented_tag = STANDARD
            .decode(encoded_tag)
            .map_err(|_| TokenError::InvalidEncoding)?;

        let user_id: UserId = id_part.parse().map_err(|_| TokenError::InvalidIdentifier)?;
        if user_id.is_system() {
            return Err(TokenError::ReservedIdentifier);
        }

        let expected_tag = self.compute_tag(nickname, user_id);
        if !constant_time_compare(&expected_tag, &presented_tag) {
            return Err(TokenError::SignatureMismatch);
        }

        Ok(user_id)
    }

    /// Computes HMAC-SHA256 over `nickname || secret || id`.
    fn compute_tag(&self, nickname: &str, user_id: UserId) -> Vec<u8> {
        let secret = self.secret.expose_secret();
        let message = format!("{}{}{}", nickname, secret, user_id);

        let mut mac =
            Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(message.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
