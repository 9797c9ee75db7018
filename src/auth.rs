use bcrypt::{DEFAULT_COST, hash, verify};
use tracing::warn;

use crate::core::{AppError, Result};

/// Password gate for the shell.
///
/// Holds only a bcrypt hash; the gate is constructed by whoever assembles the
/// application and injected into the shell, never looked up globally.
#[derive(Debug, Clone)]
pub struct AuthGate {
    password_hash: String,
}

impl AuthGate {
    pub fn new(password: &str) -> Result<Self> {
        Self::with_cost(password, DEFAULT_COST)
    }

    /// Lower costs are useful in tests; production callers should stick with
    /// [`AuthGate::new`].
    pub fn with_cost(password: &str, cost: u32) -> Result<Self> {
        let password_hash = hash(password, cost)
            .map_err(|err| AppError::Config(format!("failed to hash password: {err}")))?;
        Ok(Self { password_hash })
    }

    pub fn from_hash(password_hash: impl Into<String>) -> Self {
        Self {
            password_hash: password_hash.into(),
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        match verify(password, &self.password_hash) {
            Ok(matches) => matches,
            Err(err) => {
                warn!("password verification failed: {err}");
                false
            }
        }
    }
}
