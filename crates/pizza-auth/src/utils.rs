//! Password hashing

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::{config::PasswordConfig, AuthError, AuthResult, PasswordHasher};

#[cfg(feature = "argon2")]
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
#[cfg(feature = "argon2")]
use rand::thread_rng;

/// Argon2id password hasher
#[cfg(feature = "argon2")]
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

#[cfg(feature = "argon2")]
impl Argon2Hasher {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Create an Argon2 hasher optimized for development (faster)
    pub fn development() -> Self {
        Self::new(4096, 2, 2)
    }

    fn argon2(&self) -> AuthResult<Argon2<'static>> {
        let params = argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| AuthError::crypto_error(e.to_string()))?;
        Ok(Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params))
    }
}

#[cfg(feature = "argon2")]
impl Default for Argon2Hasher {
    fn default() -> Self {
        // 64 MB, 3 iterations, 4 lanes
        Self::new(65536, 3, 4)
    }
}

#[cfg(feature = "argon2")]
impl PasswordHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut thread_rng());
        let password_hash = self.argon2()?.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed_hash = PasswordHash::new(hash)?;
        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn hasher_name(&self) -> &str {
        "argon2"
    }
}

/// bcrypt password hasher
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Lowest cost bcrypt accepts; for tests only
    pub fn development() -> Self {
        Self { cost: 4 }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self { cost: 10 }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        Ok(bcrypt::verify(password, hash)?)
    }

    fn hasher_name(&self) -> &str {
        "bcrypt"
    }
}

/// Password hasher factory for creating different hashers
pub struct PasswordHasherFactory;

impl PasswordHasherFactory {
    /// Create the hasher named by the password configuration
    pub fn from_config(config: &PasswordConfig) -> AuthResult<Arc<dyn PasswordHasher>> {
        match config.hash_algorithm.as_str() {
            "bcrypt" => Ok(Arc::new(BcryptHasher::new(config.bcrypt_cost))),
            #[cfg(feature = "argon2")]
            "argon2" => Ok(Arc::new(Argon2Hasher::default())),
            other => Err(AuthError::config_error(format!(
                "Unknown password hashing algorithm: {} (or feature not enabled)",
                other
            ))),
        }
    }
}

const DECOY_PASSWORD: &str = "pizza-auth-decoy-password";

/// Async front for a [`PasswordHasher`].
///
/// Hashing is CPU bound, so every call runs on the blocking pool instead of
/// stalling the runtime's worker threads.
#[derive(Clone)]
pub struct CredentialHasher {
    inner: Arc<dyn PasswordHasher>,
    decoy: Arc<OnceCell<String>>,
}

impl CredentialHasher {
    pub fn new(inner: Arc<dyn PasswordHasher>) -> Self {
        Self {
            inner,
            decoy: Arc::new(OnceCell::new()),
        }
    }

    pub fn from_config(config: &PasswordConfig) -> AuthResult<Self> {
        Ok(Self::new(PasswordHasherFactory::from_config(config)?))
    }

    pub fn algorithm(&self) -> &str {
        self.inner.hasher_name()
    }

    /// Produce a salted one-way hash of `password`
    pub async fn hash(&self, password: &str) -> AuthResult<String> {
        let inner = self.inner.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || inner.hash_password(&password)).await?
    }

    /// Check `password` against a stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let inner = self.inner.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || inner.verify_password(&password, &hash)).await?
    }

    /// Run a full verification against a throwaway hash and discard the result.
    ///
    /// Lookups that find no account call this so they cost as much as a
    /// wrong password. The decoy uses the same algorithm and cost as real
    /// hashes and is computed once.
    pub async fn verify_decoy(&self, password: &str) -> AuthResult<()> {
        let decoy = self
            .decoy
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))
            .await?;
        self.verify(password, decoy).await?;
        Ok(())
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("algorithm", &self.algorithm())
            .finish()
    }
}
