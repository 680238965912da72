//! Bearer token generation.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Minimum token entropy: 32 bytes = 256 bits.
pub const MIN_TOKEN_BYTES: usize = 32;

/// An opaque bearer credential. Only meaningful together with the origin
/// it was issued for.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Constant-time comparison against a presented token.
    pub fn matches(&self, presented: &str) -> bool {
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Mints tokens from the operating system CSPRNG.
#[derive(Debug, Clone, Copy)]
pub struct TokenIssuer {
    bytes: usize,
}

impl TokenIssuer {
    pub fn new() -> Self {
        Self {
            bytes: MIN_TOKEN_BYTES,
        }
    }

    /// Use `bytes` of randomness per token, never fewer than [`MIN_TOKEN_BYTES`].
    pub fn with_length(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(MIN_TOKEN_BYTES),
        }
    }

    /// Return a fresh base64-encoded token.
    pub fn issue(&self) -> SessionToken {
        let mut raw = vec![0u8; self.bytes];
        OsRng.fill_bytes(&mut raw);
        SessionToken(STANDARD.encode(raw))
    }
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_has_256_bits() {
        let token = TokenIssuer::new().issue();
        let decoded = STANDARD.decode(token.as_str()).unwrap();
        assert_eq!(decoded.len(), 32);
        assert_eq!(token.as_str().len(), 44);
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let issuer = TokenIssuer::new();
        let tokens: HashSet<String> = (0..1000).map(|_| issuer.issue().into_string()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_with_length_enforces_minimum() {
        let short = TokenIssuer::with_length(8).issue();
        assert_eq!(STANDARD.decode(short.as_str()).unwrap().len(), 32);

        let long = TokenIssuer::with_length(64).issue();
        assert_eq!(STANDARD.decode(long.as_str()).unwrap().len(), 64);
    }

    #[test]
    fn test_matches_and_redacted_debug() {
        let token = TokenIssuer::new().issue();
        let copy = token.as_str().to_string();

        assert!(token.matches(&copy));
        assert!(!token.matches(&copy[..copy.len() - 1]));
        assert!(!token.matches(""));
        assert!(!format!("{token:?}").contains(&copy));
    }
}
