/// Password hashing module using Argon2id
///
/// Passwords are stored as PHC strings. The algorithm, version, cost
/// parameters and salt are all embedded in the string, so verification only
/// needs the stored hash and the candidate plaintext.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::password::{hash_password, verify_password, HashCost};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("secret1", HashCost::minimal())?;
///
/// assert!(verify_password("secret1", &hash)?);
/// assert!(!verify_password("secret2", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Minimum number of characters a password must contain
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Argon2id cost parameters used when producing new hashes
///
/// Existing hashes always verify with the parameters they were created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism
    pub lanes: u32,
}

impl Default for HashCost {
    /// 64 MiB, 3 passes, 4 lanes
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            lanes: 4,
        }
    }
}

impl HashCost {
    /// Smallest parameters Argon2 accepts. Only meant for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            lanes: 1,
        }
    }
}

/// Hashes a password using Argon2id
///
/// A fresh 16-byte salt is drawn from the OS RNG on every call, so hashing the
/// same password twice yields two different strings.
///
/// Example output:
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the parameters are rejected or
/// hashing fails
pub fn hash_password(password: &str, cost: HashCost) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(cost.memory_kib)
        .t_cost(cost.iterations)
        .p_cost(cost.lanes)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// The comparison is done by the Argon2 verifier, which compares in constant
/// time.
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters come from the hash itself
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Validates the password length rule
///
/// Length is counted in characters, so multi-byte characters count once.
///
/// ```
/// use taskdesk_shared::auth::password::validate_password;
///
/// assert!(validate_password("secret1").is_ok());
/// assert!(validate_password("short").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_default_cost() {
        let hash = hash_password("test_password_123", HashCost::default()).expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_never_equals_plaintext() {
        let hash = hash_password("secret1", HashCost::minimal()).unwrap();
        assert_ne!(hash, "secret1");
        assert!(!hash.contains("secret1"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password", HashCost::minimal()).unwrap();
        let hash2 = hash_password("same_password", HashCost::minimal()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password("correct_password", HashCost::minimal()).unwrap();

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_uses_embedded_parameters() {
        // Hashed with non-default cost, verified with a default verifier
        let hash = hash_password("secret1", HashCost::minimal()).unwrap();
        assert!(hash.contains("m=8,t=1,p=1"));
        assert!(verify_password("secret1", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "invalid_hash").is_err());
        assert!(verify_password("password", "").is_err());
    }

    #[test]
    fn test_hash_verify_roundtrip_unicode() {
        for password in ["with spaces", "unicode-密码-パスワード", "with-special-chars!@#$%"] {
            let hash = hash_password(password, HashCost::minimal()).unwrap();
            assert!(verify_password(password, &hash).unwrap(), "Password '{}' should verify", password);
        }
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("secret1").is_ok());

        let err = validate_password("12345").unwrap_err();
        assert!(err.contains("at least 6 characters"));

        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_password_counts_characters() {
        // Six characters, more than six bytes
        assert!(validate_password("密码密码密码").is_ok());
        // Five characters, fifteen bytes
        assert!(validate_password("密码密码密").is_err());
    }
}
