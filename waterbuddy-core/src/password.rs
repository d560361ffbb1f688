//! Password hashing.
//!
//! New credentials are stored as
//! `argon2id$v=19$m=<kib>,t=<iters>,p=<lanes>$<salt>$<hash>` with base64
//! (no padding) salt and hash. Credentials written by the first releases are
//! bare lowercase hex SHA-256 digests; those still verify and are flagged by
//! [`needs_rehash`] so the store can upgrade them on the next sign-in.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::StoreError;

const SCHEME: &str = "argon2id";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub m_cost_kib: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost_kib: 19 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    /// Cheap parameters for tests.
    pub fn for_test() -> Self {
        Self {
            m_cost_kib: 1024,
            t_cost: 1,
            p_cost: 1,
        }
    }
}

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str, params: &KdfParams) -> Result<String, StoreError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill(&mut salt);

    let hash = derive(password, &salt, params)?;

    Ok(format!(
        "{}$v=19$m={},t={},p={}${}${}",
        SCHEME,
        params.m_cost_kib,
        params.t_cost,
        params.p_cost,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    ))
}

/// Checks a password against a stored credential.
///
/// Unrecognised or corrupt credentials never match.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, StoreError> {
    if is_legacy(stored) {
        let digest = legacy_digest(password);
        return Ok(constant_time_eq(digest.as_bytes(), stored.as_bytes()));
    }

    let Some((params, salt, expected)) = parse(stored) else {
        tracing::warn!("Stored credential has an unrecognised format");
        return Ok(false);
    };

    let actual = derive(password, &salt, &params)?;
    Ok(constant_time_eq(&actual, &expected))
}

/// Returns true if the credential uses the legacy unsalted digest.
pub fn needs_rehash(stored: &str) -> bool {
    is_legacy(stored)
}

fn derive(password: &str, salt: &[u8], params: &KdfParams) -> Result<Vec<u8>, StoreError> {
    let argon_params = Params::new(
        params.m_cost_kib,
        params.t_cost,
        params.p_cost,
        Some(HASH_LEN),
    )
    .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut output = vec![0u8; HASH_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    Ok(output)
}

fn parse(stored: &str) -> Option<(KdfParams, Vec<u8>, Vec<u8>)> {
    let mut parts = stored.split('$');
    if parts.next()? != SCHEME || parts.next()? != "v=19" {
        return None;
    }

    let mut params = KdfParams::default();
    for pair in parts.next()?.split(',') {
        let (key, value) = pair.split_once('=')?;
        let value: u32 = value.parse().ok()?;
        match key {
            "m" => params.m_cost_kib = value,
            "t" => params.t_cost = value,
            "p" => params.p_cost = value,
            _ => return None,
        }
    }

    let salt = STANDARD_NO_PAD.decode(parts.next()?).ok()?;
    let hash = STANDARD_NO_PAD.decode(parts.next()?).ok()?;
    if parts.next().is_some() || hash.len() != HASH_LEN {
        return None;
    }

    Some((params, salt, hash))
}

fn is_legacy(stored: &str) -> bool {
    stored.len() == 64
        && stored
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

fn legacy_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
