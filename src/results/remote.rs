use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::interpolate::{has_placeholders, render};
use super::{Context, ResultKind, ResultOps, StateResult};
use crate::error::{Result, ResultError};
use crate::storage::{Backend, Credentials, Locator, ObjectStore, SecretResolver};

/// Compile-time marker selecting the bucket family of a [`RemoteResult`].
pub trait RemoteBackend:
    Copy + Default + fmt::Debug + PartialEq + Send + Sync + 'static
{
    const BACKEND: Backend;
    const KIND: ResultKind;

    fn wrap(result: RemoteResult<Self>) -> StateResult;

    fn project(result: &StateResult) -> Option<&RemoteResult<Self>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GcsBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct S3Backend;

impl RemoteBackend for GcsBackend {
    const BACKEND: Backend = Backend::Gcs;
    const KIND: ResultKind = ResultKind::Gcs;

    fn wrap(result: RemoteResult<Self>) -> StateResult {
        StateResult::Gcs(result)
    }

    fn project(result: &StateResult) -> Option<&RemoteResult<Self>> {
        match result {
            StateResult::Gcs(r) => Some(r),
            _ => None,
        }
    }
}

impl RemoteBackend for S3Backend {
    const BACKEND: Backend = Backend::S3;
    const KIND: ResultKind = ResultKind::S3;

    fn wrap(result: RemoteResult<Self>) -> StateResult {
        StateResult::S3(result)
    }

    fn project(result: &StateResult) -> Option<&RemoteResult<Self>> {
        match result {
            StateResult::S3(r) => Some(r),
            _ => None,
        }
    }
}

pub type GcsResult = RemoteResult<GcsBackend>;
pub type S3Result = RemoteResult<S3Backend>;

#[derive(Clone)]
struct Binding {
    store: Arc<dyn ObjectStore>,
    secrets: Arc<dyn SecretResolver>,
}

/// A value stored in a bucket, addressed by `(bucket, filepath)`.
///
/// Only the locator and the name of the credentials secret are part of the
/// result's identity; the value is a cache of what was last read or written
/// and the store binding is runtime-only.
#[derive(Clone)]
pub struct RemoteResult<B> {
    bucket: String,
    filepath: String,
    credentials_secret: Option<String>,
    value: Option<Value>,
    binding: Option<Binding>,
    backend: PhantomData<B>,
}

impl<B: RemoteBackend> RemoteResult<B> {
    pub fn new(bucket: impl Into<String>, filepath: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            filepath: filepath.into(),
            credentials_secret: None,
            value: None,
            binding: None,
            backend: PhantomData,
        }
    }

    pub fn with_credentials_secret(mut self, name: impl Into<String>) -> Self {
        self.credentials_secret = Some(name.into());
        self
    }

    /// Attach the store and secrets resolver used by read/write/exists.
    pub fn bind(mut self, store: Arc<dyn ObjectStore>, secrets: Arc<dyn SecretResolver>) -> Self {
        self.binding = Some(Binding { store, secrets });
        self
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn filepath(&self) -> &str {
        &self.filepath
    }

    pub fn credentials_secret(&self) -> Option<&str> {
        self.credentials_secret.as_deref()
    }

    pub fn locator(&self, filepath: &str) -> Locator {
        Locator {
            backend: B::BACKEND,
            bucket: self.bucket.clone(),
            filepath: filepath.to_string(),
        }
    }

    /// Render `${ctx.*}` placeholders in the filepath.
    pub fn format(&self, ctx: &Context) -> Cow<'_, Self> {
        if !has_placeholders(&self.filepath) {
            return Cow::Borrowed(self);
        }
        Cow::Owned(self.sibling(render(&self.filepath, ctx), self.value.clone()))
    }

    fn sibling(&self, filepath: String, value: Option<Value>) -> Self {
        Self {
            filepath,
            value,
            ..self.clone()
        }
    }

    fn binding(&self) -> Result<&Binding> {
        self.binding
            .as_ref()
            .ok_or(ResultError::BackendUnavailable(B::KIND))
    }

    /// Credentials are looked up on every call, never cached on the result.
    fn credentials(&self, binding: &Binding) -> Result<Option<Credentials>> {
        self.credentials_secret
            .as_deref()
            .map(|name| binding.secrets.resolve(name))
            .transpose()
    }
}

impl<B: RemoteBackend> ResultOps for RemoteResult<B> {
    fn kind(&self) -> ResultKind {
        B::KIND
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn location(&self) -> &str {
        &self.filepath
    }

    fn read(&self, location: &str) -> Result<Cow<'_, Self>> {
        let binding = self.binding()?;
        let credentials = self.credentials(binding)?;
        let locator = self.locator(location);

        debug!(locator = %locator, "Reading result");
        let bytes = binding.store.get(&locator, credentials.as_ref())?;
        let value: Value = serde_json::from_slice(&bytes)?;

        Ok(Cow::Owned(self.sibling(location.to_string(), Some(value))))
    }

    fn write(&self, value: Value) -> Result<Cow<'_, Self>> {
        let binding = self.binding()?;
        let credentials = self.credentials(binding)?;
        let filepath = if self.filepath.is_empty() {
            format!("ironflow-result-{}", Uuid::new_v4())
        } else {
            self.filepath.clone()
        };
        let locator = self.locator(&filepath);

        let bytes = serde_json::to_vec(&value)?;
        debug!(locator = %locator, bytes = bytes.len(), "Writing result");
        binding.store.put(&locator, &bytes, credentials.as_ref())?;

        Ok(Cow::Owned(self.sibling(filepath, Some(value))))
    }

    fn exists(&self, location: &str) -> bool {
        let Ok(binding) = self.binding() else {
            return false;
        };
        let locator = self.locator(location);
        let checked = self
            .credentials(binding)
            .and_then(|creds| binding.store.exists(&locator, creds.as_ref()));

        checked.unwrap_or_else(|e| {
            warn!(locator = %locator, error = %e, "Existence check failed");
            false
        })
    }
}

impl<B> PartialEq for RemoteResult<B> {
    fn eq(&self, other: &Self) -> bool {
        self.bucket == other.bucket
            && self.filepath == other.filepath
            && self.credentials_secret == other.credentials_secret
            && self.value == other.value
    }
}

impl<B: RemoteBackend> fmt::Debug for RemoteResult<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(B::KIND.tag())
            .field("bucket", &self.bucket)
            .field("filepath", &self.filepath)
            .field("credentials_secret", &self.credentials_secret)
            .field("value", &self.value)
            .field("bound", &self.binding.is_some())
            .finish()
    }
}
