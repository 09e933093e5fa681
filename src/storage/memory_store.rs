use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{Result, ResultError};
use crate::storage::{Credentials, Locator, ObjectStore};

/// In-memory object store. Holds objects only for the lifetime of the
/// store instance.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<Locator, Vec<u8>>>,
    required: Option<Credentials>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every call that does not present exactly `credentials`.
    pub fn with_required_credentials(mut self, credentials: Credentials) -> Self {
        self.required = Some(credentials);
        self
    }

    fn authorize(&self, locator: &Locator, credentials: Option<&Credentials>) -> Result<()> {
        match &self.required {
            Some(required) if credentials != Some(required) => Err(ResultError::Storage(
                format!("access denied to {}", locator),
            )),
            _ => Ok(()),
        }
    }

    fn objects(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Locator, Vec<u8>>>> {
        self.objects
            .lock()
            .map_err(|_| ResultError::Storage("memory store lock poisoned".to_string()))
    }

    /// Number of stored objects.
    pub fn len(&self) -> Result<usize> {
        Ok(self.objects()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.objects()?.is_empty())
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, locator: &Locator, credentials: Option<&Credentials>) -> Result<Vec<u8>> {
        self.authorize(locator, credentials)?;
        self.objects()?
            .get(locator)
            .cloned()
            .ok_or_else(|| ResultError::Storage(format!("object not found: {}", locator)))
    }

    fn put(
        &self,
        locator: &Locator,
        data: &[u8],
        credentials: Option<&Credentials>,
    ) -> Result<()> {
        self.authorize(locator, credentials)?;
        debug!(locator = %locator, bytes = data.len(), "Storing object in memory");
        self.objects()?.insert(locator.clone(), data.to_vec());
        Ok(())
    }

    fn exists(&self, locator: &Locator, credentials: Option<&Credentials>) -> Result<bool> {
        self.authorize(locator, credentials)?;
        Ok(self.objects()?.contains_key(locator))
    }
}
