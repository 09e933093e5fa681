use std::collections::HashMap;

use crate::error::{Result, ResultError};
use crate::storage::{Credentials, SecretResolver};

pub const DEFAULT_SECRET_PREFIX: &str = "IRONFLOW_SECRET_";

/// Resolves secrets from environment variables named `<prefix><NAME>`,
/// with the name upper-cased and `-` replaced by `_`.
#[derive(Debug, Clone)]
pub struct EnvSecretResolver {
    prefix: String,
}

impl Default for EnvSecretResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_PREFIX)
    }
}

impl EnvSecretResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name.to_ascii_uppercase().replace('-', "_"))
    }
}

impl SecretResolver for EnvSecretResolver {
    fn resolve(&self, name: &str) -> Result<Credentials> {
        std::env::var(self.var_name(name))
            .map(Credentials::new)
            .map_err(|_| ResultError::Secret {
                name: name.to_string(),
            })
    }
}

/// Fixed in-memory secrets.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretResolver {
    secrets: HashMap<String, Credentials>,
}

impl StaticSecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: impl Into<String>, secret: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), Credentials::new(secret));
        self
    }
}

impl SecretResolver for StaticSecretResolver {
    fn resolve(&self, name: &str) -> Result<Credentials> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| ResultError::Secret {
                name: name.to_string(),
            })
    }
}
