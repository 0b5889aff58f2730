use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::HashConfig;

/// Newtype for password to prevent accidental logging
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Newtype for password hash
#[derive(Debug, Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Credential hasher with process-wide cost parameters.
///
/// Cost is injected once at startup and immutable afterwards, so concurrent
/// use from parallel request handlers needs no locking.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new(config: &HashConfig) -> Result<Self, anyhow::Error> {
        let params = Params::new(
            config.memory_kib,
            config.time_cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid hash cost parameters: {}", e))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password.
    ///
    /// Salt is freshly generated per call and embedded in the PHC-format
    /// digest, so hashing the same password twice yields different digests.
    pub fn hash(&self, password: &Password) -> Result<PasswordHashString, anyhow::Error> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_str().as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        Ok(PasswordHashString::new(password_hash))
    }

    /// Verify a password against a stored digest.
    ///
    /// Total: a malformed digest verifies as `false` rather than surfacing a
    /// distinguishable error, so callers cannot tell "wrong password" apart
    /// from "bad digest". The digest's own embedded salt and cost parameters
    /// drive the recomputation; comparison inside `argon2` is constant-time.
    pub fn verify(&self, password: &Password, password_hash: &PasswordHashString) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(password_hash.as_str()) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_str().as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hasher() -> CredentialHasher {
        // Low cost keeps the test suite fast; production cost comes from env.
        CredentialHasher::new(&HashConfig {
            memory_kib: 8192,
            time_cost: 1,
        })
        .expect("Failed to create hasher")
    }

    #[test]
    fn test_hash_password() {
        let hasher = test_hasher();
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hasher.hash(&password).expect("Failed to hash password");

        // Hash should not be empty
        assert!(!hash.as_str().is_empty());

        // Hash should start with $argon2
        assert!(hash.as_str().starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password_correct() {
        let hasher = test_hasher();
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hasher.hash(&password).expect("Failed to hash password");

        assert!(hasher.verify(&password, &hash));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hasher = test_hasher();
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hasher.hash(&password).expect("Failed to hash password");

        let wrong_password = Password::new("wrongPassword".to_string());

        assert!(!hasher.verify(&wrong_password, &hash));
    }

    #[test]
    fn test_verify_password_is_idempotent() {
        let hasher = test_hasher();
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hasher.hash(&password).expect("Failed to hash password");

        assert_eq!(
            hasher.verify(&password, &hash),
            hasher.verify(&password, &hash)
        );
    }

    #[test]
    fn test_verify_malformed_digest_fails_closed() {
        let hasher = test_hasher();
        let password = Password::new("mySecurePassword123".to_string());

        let malformed = PasswordHashString::new("not-a-phc-digest".to_string());
        assert!(!hasher.verify(&password, &malformed));

        let empty = PasswordHashString::new(String::new());
        assert!(!hasher.verify(&password, &empty));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hasher = test_hasher();
        let password = Password::new("mySecurePassword123".to_string());
        let hash1 = hasher.hash(&password).expect("Failed to hash password");
        let hash2 = hasher.hash(&password).expect("Failed to hash password");

        // Same password should produce different hashes (due to random salt)
        assert_ne!(hash1.as_str(), hash2.as_str());

        // Both should verify correctly
        assert!(hasher.verify(&password, &hash1));
        assert!(hasher.verify(&password, &hash2));
    }

    #[test]
    fn test_verify_digest_hashed_at_different_cost() {
        // Cost parameters ride inside the digest, so a hasher configured
        // differently still verifies it.
        let writer = CredentialHasher::new(&HashConfig {
            memory_kib: 8192,
            time_cost: 1,
        })
        .unwrap();
        let reader = CredentialHasher::new(&HashConfig {
            memory_kib: 16384,
            time_cost: 2,
        })
        .unwrap();

        let password = Password::new("mySecurePassword123".to_string());
        let hash = writer.hash(&password).unwrap();
        assert!(reader.verify(&password, &hash));
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("topsecret".to_string());
        let rendered = format!("{:?}", password);
        assert!(!rendered.contains("topsecret"));
    }
}
