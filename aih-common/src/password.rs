//! Salted SHA-256 password hashing for operator accounts

use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Random alphanumeric salt
pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect()
}

/// Hex SHA-256 of salt followed by password (64 hex chars)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = hash_password("secret", "salt");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_salt_changes_hash() {
        assert_ne!(hash_password("secret", "a"), hash_password("secret", "b"));
    }

    #[test]
    fn test_verify() {
        let salt = generate_salt();
        assert_eq!(salt.len(), SALT_LEN);
        let hash = hash_password("secret", &salt);
        assert!(verify_password("secret", &salt, &hash));
        assert!(!verify_password("Secret", &salt, &hash));
    }
}
