//! Collaborators remote results are bound to at I/O time: an object store
//! addressed by [`Locator`] and a resolver turning a secret name into
//! [`Credentials`].

pub mod fs_store;
pub mod memory_store;
pub mod secrets;

use std::fmt;

use crate::error::Result;

pub use fs_store::FsObjectStore;
pub use memory_store::MemoryObjectStore;
pub use secrets::{EnvSecretResolver, StaticSecretResolver};

/// Remote storage family a locator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Gcs,
    S3,
}

impl Backend {
    pub fn scheme(self) -> &'static str {
        match self {
            Backend::Gcs => "gs",
            Backend::S3 => "s3",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Gcs => write!(f, "gcs"),
            Backend::S3 => write!(f, "s3"),
        }
    }
}

/// Address of an object: backend, bucket and key. Carries no bytes and no
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub backend: Backend,
    pub bucket: String,
    pub filepath: String,
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.backend.scheme(), self.bucket, self.filepath)
    }
}

/// Resolved credentials. Never serialized, and redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(<redacted>)")
    }
}

/// Byte-level object storage.
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// Fetch the object at `locator`.
    fn get(&self, locator: &Locator, credentials: Option<&Credentials>) -> Result<Vec<u8>>;

    /// Store `data` at `locator`, replacing any existing object.
    fn put(&self, locator: &Locator, data: &[u8], credentials: Option<&Credentials>)
    -> Result<()>;

    /// Whether an object exists at `locator`.
    fn exists(&self, locator: &Locator, credentials: Option<&Credentials>) -> Result<bool>;
}

/// Turns a secret name into usable credentials.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Credentials>;
}
