//! # ab-keys-argon2
//!
//! Argon2-based implementation of `DeleteKeyHasher`.
//! Delete keys are stored as PHC strings (`$argon2id$v=19$...`), so the
//! parameters and salt travel with each hash.

use ab_core::traits::DeleteKeyHasher;
use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Salt length in bytes before base64 encoding.
const SALT_LEN: usize = 16;

pub struct Argon2KeyHasher {
    argon2: Argon2<'static>,
}

impl Argon2KeyHasher {
    /// Argon2id with the crate's recommended default cost.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Argon2id with explicit cost: memory in KiB, iterations, lanes.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> anyhow::Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2KeyHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl DeleteKeyHasher for Argon2KeyHasher {
    fn hash_key(&self, key: &str) -> anyhow::Result<String> {
        let mut salt = [0u8; SALT_LEN];
        getrandom::getrandom(&mut salt).map_err(|e| anyhow!("salt generation failed: {e}"))?;
        let salt = SaltString::encode_b64(&salt).map_err(|e| anyhow!("salt encoding failed: {e}"))?;

        let hash = self
            .argon2
            .hash_password(key.as_bytes(), &salt)
            .map_err(|e| anyhow!("hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies a candidate key against a stored Argon2 hash.
    /// Cost parameters are read from the hash itself.
    fn verify_key(&self, key: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(key.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
