//! # Delete Passwords
//!
//! Threads and replies carry a password that gates deletion. By default it is
//! stored as given and compared by exact string equality. `Argon2` stores a
//! PHC hash instead; records returned from `create`/`add_reply` then carry
//! the hash, so the scheme is opt-in.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordScheme {
    #[default]
    Plain,
    Argon2,
}

impl PasswordScheme {
    /// Turns a supplied password into its stored form.
    pub fn seal(&self, password: &str) -> Result<String> {
        match self {
            Self::Plain => Ok(password.to_string()),
            Self::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
            }
        }
    }

    /// Checks `supplied` against the stored form.
    pub fn verify(&self, supplied: &str, stored: &str) -> bool {
        match self {
            Self::Plain => supplied == stored,
            Self::Argon2 => {
                let parsed_hash = match PasswordHash::new(stored) {
                    Ok(p) => p,
                    Err(_) => return false,
                };
                Argon2::default()
                    .verify_password(supplied.as_bytes(), &parsed_hash)
                    .is_ok()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_is_exact_equality() {
        let scheme = PasswordScheme::Plain;
        let stored = scheme.seal("p1").unwrap();
        assert_eq!(stored, "p1");
        assert!(scheme.verify("p1", &stored));
        assert!(!scheme.verify("P1", &stored));
        assert!(!scheme.verify("p1 ", &stored));
    }

    #[test]
    fn argon2_hides_the_password() {
        let scheme = PasswordScheme::Argon2;
        let stored = scheme.seal("hunter2").unwrap();
        assert_ne!(stored, "hunter2");
        assert!(stored.starts_with("$argon2"));
        assert!(scheme.verify("hunter2", &stored));
        assert!(!scheme.verify("hunter3", &stored));
    }

    #[test]
    fn argon2_rejects_unparseable_hashes() {
        assert!(!PasswordScheme::Argon2.verify("p1", "p1"));
    }
}
