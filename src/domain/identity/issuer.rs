//! Identity issuance for new sessions.
//!
//! Owns the process-wide identifier counter. Sessions receive a handle
//! (`Arc<IdentityIssuer>`) instead of touching a global.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::foundation::UserId;

use super::token::TokenCodec;

/// Result of deriving an identity for a connecting client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    /// Token the client should present on its next connection.
    pub token: String,
    /// True when no valid token was presented and a new id was minted.
    pub is_new: bool,
}

/// Hands out user identities, recovering them from tokens when possible.
#[derive(Debug)]
pub struct IdentityIssuer {
    codec: TokenCodec,
    last_issued: AtomicU64,
}

impl IdentityIssuer {
    /// Creates an issuer whose first fresh identifier is `1`.
    pub fn new(codec: TokenCodec) -> Self {
        Self {
            codec,
            last_issued: AtomicU64::new(0),
        }
    }

    /// Derives the identity for `nickname`, reusing the one in `presented_token`
    /// if it verifies.
    ///
    /// An invalid token is never an error: it degrades to a fresh identity.
    pub fn issue(&self, presented_token: Option<&str>, nickname: &str) -> Identity {
        if let Some(token) = presented_token.filter(|t| !t.is_empty()) {
            match self.codec.verify(token, nickname) {
                Ok(user_id) => {
                    // Keep fresh ids clear of ids recovered from earlier processes.
                    self.last_issued.fetch_max(user_id.as_u64(), Ordering::SeqCst);
                    return Identity {
                        user_id,
                        token: token.to_string(),
                        is_new: false,
                    };
                }
                Err(reason) => {
                    tracing::debug!(nickname, %reason, "Presented token rejected, minting fresh identity");
                }
            }
        }

        let user_id = self.next_id();
        Identity {
            user_id,
            token: self.codec.mint(user_id, nickname),
            is_new: true,
        }
    }

    /// Returns the codec backing this issuer.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    fn next_id(&self) -> UserId {
        UserId::new(self.last_issued.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn issuer() -> IdentityIssuer {
        IdentityIssuer::new(TokenCodec::new(SecretString::new(
            "issuer_test_secret".to_string(),
        )))
    }

    #[test]
    fn reconnect_scenario_follows_token_and_nickname() {
        let issuer = issuer();

        let first = issuer.issue(None, "alice");
        assert!(first.is_new);
        assert_eq!(first.user_id, UserId::new(1));

        let again = issuer.issue(Some(&first.token), "alice");
        assert!(!again.is_new);
        assert_eq!(again.user_id, UserId::new(1));
        assert_eq!(again.token, first.token);

        let renamed = issuer.issue(Some(&first.token), "bob");
        assert!(renamed.is_new);
        assert_eq!(renamed.user_id, UserId::new(2));
    }

    #[test]
    fn empty_token_counts_as_absent() {
        let issuer = issuer();
        let identity = issuer.issue(Some(""), "alice");
        assert!(identity.is_new);
        assert_eq!(identity.user_id, UserId::new(1));
    }

    #[test]
    fn garbage_token_mints_fresh_identity() {
        let issuer = issuer();
        let identity = issuer.issue(Some("not-a-token"), "alice");
        assert!(identity.is_new);
        assert!(issuer.codec().verify(&identity.token, "alice").is_ok());
    }

    #[test]
    fn recovered_ids_are_never_reissued() {
        let issuer = issuer();
        let token = issuer.codec().mint(UserId::new(40), "carol");

        let recovered = issuer.issue(Some(&token), "carol");
        assert_eq!(recovered.user_id, UserId::new(40));

        let fresh = issuer.issue(None, "dave");
        assert_eq!(fresh.user_id, UserId::new(41));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_fresh_identities_are_unique() {
        let issuer = Arc::new(issuer());

        let handles: Vec<_> = (0..1000)
            .map(|i| {
                let issuer = issuer.clone();
                tokio::spawn(async move { issuer.issue(None, &format!("user{i}")).user_id })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 1000);
    }
}
