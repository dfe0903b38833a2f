//! Token generation and identifier hashing helpers

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of generated invite link tokens
pub const INVITE_TOKEN_LEN: usize = 32;

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random alphanumeric token for link-based invites
pub fn generate_invite_token() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// SHA-256 hex digest of a login identifier (phone E.164 or email).
///
/// Raw identifiers are never stored; only these digests land in `user_logins`.
pub fn hash_identifier(identifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.trim().to_lowercase().as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_tokens_are_alphanumeric_and_sized() {
        let token = generate_invite_token();
        assert_eq!(token.len(), INVITE_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn invite_tokens_are_unique_enough() {
        assert_ne!(generate_invite_token(), generate_invite_token());
    }

    #[test]
    fn identifier_hashing_normalizes_case_and_whitespace() {
        assert_eq!(
            hash_identifier("User@Example.com"),
            hash_identifier("  user@example.com ")
        );
        assert_eq!(hash_identifier("a").len(), 64);
    }
}
