//! Credential handling: the legacy string-built user query, and the
//! parameterised lookup plus Argon2id verification that replaces it.
//!
//! Hashing parameters are centralized so every stored secret uses the same
//! memory, iteration, and parallelism settings.

use std::collections::HashMap;

use argon2::password_hash::SaltString;
use argon2::{password_hash, Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::debug;

/// Argon2id parameters shared by every hash this module produces.
/// - memory_cost: 19 MiB keeps GPU cracking expensive while remaining server friendly
/// - time_cost: 3 iterations for interactive latency without sacrificing safety
/// - parallelism: 1 thread to keep resource usage predictable on shared hosts
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 3;
const PARALLELISM: u32 = 1;

/// Verified against when the identifier is unknown, so a miss costs about
/// as much as a wrong secret.
const PLACEHOLDER_HASH: &str =
    "$argon2id$v=19$m=19456,t=3,p=1$bGVhZmtpdHNhbHRzYWx0$Nq7x3u2ZP0eSlc6QwV9m1tK3Yb8gq5Dv0HcJ2fA4L1A";

const LOOKUP_STATEMENT: &str = "SELECT password_hash FROM users WHERE username = ?1";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("secret hashing failed: {0}")]
    Hash(String),
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),
    #[error("secret does not match")]
    InvalidSecret,
}

impl From<password_hash::Error> for CredentialError {
    fn from(err: password_hash::Error) -> Self {
        CredentialError::Hash(format!("{err}"))
    }
}

/// Builds `SELECT * FROM users WHERE username='..' AND password='..'` with
/// both inputs pasted in verbatim.
///
/// This is the injection-prone pattern the rest of this module exists to
/// replace: nothing is escaped, and the result authenticates nobody. Use
/// [`CredentialQuery::lookup`] and [`verify_secret`] for anything real.
pub fn format_credential_query(identifier: &str, secret: &str) -> String {
    format!("SELECT * FROM users WHERE username='{identifier}' AND password='{secret}'")
}

/// A fixed statement with its bound parameters kept apart from the SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialQuery {
    statement: &'static str,
    params: Vec<String>,
}

impl CredentialQuery {
    /// Fetches the stored hash for `identifier`. The secret never goes into a
    /// query; it is compared against the returned hash with [`verify_secret`].
    pub fn lookup(identifier: &str) -> Self {
        Self {
            statement: LOOKUP_STATEMENT,
            params: vec![identifier.to_string()],
        }
    }

    pub fn statement(&self) -> &str {
        self.statement
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

fn argon2_config() -> Result<Argon2<'static>, password_hash::Error> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a secret with Argon2id and returns the PHC string, salt and
/// parameters included.
pub fn hash_secret(secret: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = argon2_config()?;
    Ok(argon2.hash_password(secret.as_bytes(), &salt)?.to_string())
}

/// Checks `secret` against a stored PHC hash. Unparseable hashes never match.
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(stored_hash) {
        Ok(hash) => hash,
        Err(_) => return false,
    };

    match argon2_config() {
        Ok(argon2) => argon2.verify_password(secret.as_bytes(), &parsed_hash).is_ok(),
        Err(_) => false,
    }
}

/// Anything that can answer "what hash is stored for this identifier".
pub trait CredentialStore {
    fn password_hash(&self, identifier: &str) -> Option<&str>;
}

/// Hash-only store held in memory. Plaintext secrets are never kept.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    hashes: HashMap<String, String>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes `secret` and stores it under `identifier`, replacing any
    /// previous entry.
    pub fn enroll(&mut self, identifier: &str, secret: &str) -> Result<(), CredentialError> {
        let hash = hash_secret(secret)?;
        self.hashes.insert(identifier.to_string(), hash);
        debug!(identifier, "enrolled credential");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn password_hash(&self, identifier: &str) -> Option<&str> {
        self.hashes.get(identifier).map(String::as_str)
    }
}

/// Looks `identifier` up in `store` and verifies `secret` against it.
pub fn authenticate<S: CredentialStore + ?Sized>(
    store: &S,
    identifier: &str,
    secret: &str,
) -> Result<(), CredentialError> {
    match store.password_hash(identifier) {
        Some(stored) => {
            if verify_secret(secret, stored) {
                debug!(identifier, "credential accepted");
                Ok(())
            } else {
                debug!(identifier, "credential rejected");
                Err(CredentialError::InvalidSecret)
            }
        }
        None => {
            let _ = verify_secret(secret, PLACEHOLDER_HASH);
            debug!(identifier, "credential lookup missed");
            Err(CredentialError::UnknownIdentifier(identifier.to_string()))
        }
    }
}
