//! Password hashing and random code generation

use crate::error::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use chrono::Utc;
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

/// Argon2id cost parameters: (memory KiB, iterations, parallelism)
pub const PASSWORD_HASH_PARAMS: (u32, u32, u32) = (19_456, 2, 1);

/// Alphabet for join codes and reference suffixes
const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMERIC: &[u8] = b"0123456789";

pub const JOIN_CODE_LENGTH: usize = 6;
pub const VERIFICATION_CODE_LENGTH: usize = 6;

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

fn hasher() -> Result<Argon2<'static>> {
    let (memory, iterations, parallelism) = PASSWORD_HASH_PARAMS;
    let params = Params::new(memory, iterations, parallelism, None)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid argon2 params: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with a fresh salt
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; a hash that cannot be parsed is an internal error.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash: {}", e)))?;
    Ok(hasher()?
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

fn random_from(alphabet: &[u8], length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Six uppercase alphanumeric characters
pub fn generate_join_code() -> String {
    random_from(ALPHANUMERIC, JOIN_CODE_LENGTH)
}

/// Six decimal digits
pub fn generate_verification_code() -> String {
    random_from(NUMERIC, VERIFICATION_CODE_LENGTH)
}

/// `<PREFIX>-<base36 millis>-<6 alphanumerics>`
pub fn generate_reference(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!(
        "{}-{}-{}",
        prefix,
        to_base36(millis),
        random_from(ALPHANUMERIC, 6)
    )
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHANUMERIC[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Lowercase, then join ASCII alphanumeric runs with `-`
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}
