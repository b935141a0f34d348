use std::str::FromStr;

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand_core::OsRng;

/// How passwords are turned into the value stored in `users.password`.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// `Ok(false)` is a wrong password; `Err` means the stored value could
    /// not be interpreted.
    fn verify(&self, password: &str, stored: &str) -> Result<bool>;
}

/// Argon2id with a random salt, PHC string format.
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("password hashing failed: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        let parsed =
            PasswordHash::new(stored).map_err(|e| anyhow!("stored hash unreadable: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Stores the password as given. Only for databases that already hold
/// plaintext credentials.
pub struct PlaintextHasher;

impl CredentialHasher for PlaintextHasher {
    fn hash(&self, password: &str) -> Result<String> {
        Ok(password.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        Ok(password == stored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasherKind {
    Argon2,
    Plaintext,
}

impl HasherKind {
    pub fn build(self) -> Box<dyn CredentialHasher> {
        match self {
            Self::Argon2 => Box::new(Argon2Hasher),
            Self::Plaintext => Box::new(PlaintextHasher),
        }
    }
}

impl FromStr for HasherKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(Self::Argon2),
            "plaintext" | "plain" => Ok(Self::Plaintext),
            other => Err(anyhow!("unknown password hasher '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argon2_hash_verifies() {
        let hasher = Argon2Hasher;
        let stored = hasher.hash("correct horse").unwrap();
        assert_ne!(stored, "correct horse");
        assert!(stored.starts_with("$argon2"));

        assert!(hasher.verify("correct horse", &stored).unwrap());
        assert!(!hasher.verify("battery staple", &stored).unwrap());
    }

    #[test]
    fn argon2_rejects_unparseable_stored_value() {
        assert!(Argon2Hasher.verify("pw", "not-a-phc-string").is_err());
    }

    #[test]
    fn plaintext_compares_verbatim() {
        let stored = PlaintextHasher.hash("pass").unwrap();
        assert_eq!(stored, "pass");
        assert!(PlaintextHasher.verify("pass", &stored).unwrap());
        assert!(!PlaintextHasher.verify("Pass", &stored).unwrap());
    }

    #[test]
    fn hasher_kind_parses() {
        assert_eq!("Argon2".parse::<HasherKind>().unwrap(), HasherKind::Argon2);
        assert_eq!("plaintext".parse::<HasherKind>().unwrap(), HasherKind::Plaintext);
        assert!("md5".parse::<HasherKind>().is_err());
    }
}
