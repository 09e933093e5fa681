use crate::results::ResultKind;

/// Crate-wide result alias.
pub type Result<T, E = ResultError> = std::result::Result<T, E>;

/// Errors raised while reading, writing or (de)serializing results.
#[derive(Debug, thiserror::Error)]
pub enum ResultError {
    /// The wire object carried a `type` tag outside the registry.
    #[error("unknown result type: {tag}")]
    UnknownVariant { tag: String },

    /// A field was missing, mistyped, unexpected, or not JSON-compatible.
    #[error("schema validation failed: {0}")]
    Schema(String),

    /// A constant result was asked to store a different value.
    #[error("cannot write a new value to an immutable result")]
    ImmutableWrite,

    /// Stored content did not parse as JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A remote result was used for I/O before being bound to a store.
    #[error("{0} is not bound to an object store")]
    BackendUnavailable(ResultKind),

    /// A credentials reference could not be resolved.
    #[error("secret not found: {name}")]
    Secret { name: String },

    /// The object store rejected or failed an operation.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResultError {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        ResultError::Schema(msg.into())
    }
}
