//! Identity module - stateless reconnect tokens and identifier issuance.

mod issuer;
mod token;

pub use issuer::{Identity, IdentityIssuer};
pub use token::{TokenCodec, TokenError, TOKEN_DELIMITER};
