pub mod base;
pub mod constant;
pub mod interpolate;
pub mod native;
pub mod remote;

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::storage::{ObjectStore, SecretResolver};

pub use base::{BaseResult, NoResult, SafeResult};
pub use constant::ConstantResult;
pub use native::NativeResult;
pub use remote::{GcsBackend, GcsResult, RemoteBackend, RemoteResult, S3Backend, S3Result};

/// Template context used to render result locations: JSON values keyed by name.
pub type Context = HashMap<String, Value>;

/// The closed set of result variants, one per wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Base,
    Safe,
    NoResult,
    Gcs,
    Native,
    S3,
    Constant,
}

impl ResultKind {
    pub const ALL: [ResultKind; 7] = [
        ResultKind::Base,
        ResultKind::Safe,
        ResultKind::NoResult,
        ResultKind::Gcs,
        ResultKind::Native,
        ResultKind::S3,
        ResultKind::Constant,
    ];

    /// Wire tag written to the `type` field.
    pub fn tag(self) -> &'static str {
        match self {
            ResultKind::Base => "Result",
            ResultKind::Safe => "SafeResult",
            ResultKind::NoResult => "NoResultType",
            ResultKind::Gcs => "GCSResult",
            ResultKind::Native => "PrefectResult",
            ResultKind::S3 => "S3Result",
            ResultKind::Constant => "ConstantResult",
        }
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Behaviour shared by every result variant.
///
/// Results are immutable. `read` and `write` hand back either the receiver
/// itself (`Cow::Borrowed`) when nothing changes, or a new sibling
/// (`Cow::Owned`) carrying the loaded/stored value.
pub trait ResultOps: Clone {
    fn kind(&self) -> ResultKind;

    /// The in-memory value, if one has been produced or loaded.
    fn value(&self) -> Option<&Value>;

    /// Backend-specific locator; empty when the variant has none.
    fn location(&self) -> &str;

    /// Load the value addressed by `location`.
    fn read(&self, location: &str) -> Result<Cow<'_, Self>>;

    /// Persist `value` and return a result pointing at it.
    fn write(&self, value: Value) -> Result<Cow<'_, Self>>;

    /// Whether a value is present at `location`. Never fails; malformed
    /// input or backend errors report `false`.
    fn exists(&self, location: &str) -> bool;

    /// Whether the wire form is plain JSON.
    fn is_safe(&self) -> bool {
        false
    }
}

/// A task result of any variant.
#[derive(Debug, Clone, PartialEq)]
pub enum StateResult {
    Base(BaseResult),
    Safe(SafeResult),
    NoResult(NoResult),
    Gcs(GcsResult),
    Native(NativeResult),
    S3(S3Result),
    Constant(ConstantResult),
}

impl StateResult {
    /// Wrap a computed value as a wire-safe result.
    pub fn from_value(value: Value) -> Self {
        StateResult::Safe(SafeResult::new(value))
    }

    /// Bind remote variants to the collaborators used for I/O. Other
    /// variants come back unchanged.
    pub fn bind(self, store: Arc<dyn ObjectStore>, secrets: Arc<dyn SecretResolver>) -> Self {
        match self {
            StateResult::Gcs(r) => StateResult::Gcs(r.bind(store, secrets)),
            StateResult::S3(r) => StateResult::S3(r.bind(store, secrets)),
            other => other,
        }
    }

    /// Render `${ctx.*}` placeholders in the location. Variants without a
    /// templated location are returned as-is.
    pub fn format(&self, ctx: &Context) -> Cow<'_, Self> {
        match self {
            StateResult::Base(r) => lift(self, r.format(ctx), StateResult::Base),
            StateResult::Gcs(r) => lift(self, r.format(ctx), StateResult::Gcs),
            StateResult::S3(r) => lift(self, r.format(ctx), StateResult::S3),
            StateResult::Safe(_)
            | StateResult::NoResult(_)
            | StateResult::Native(_)
            | StateResult::Constant(_) => Cow::Borrowed(self),
        }
    }
}

/// Re-wrap a variant-level `Cow`, keeping identity when the variant returned itself.
fn lift<'a, T: Clone>(
    this: &'a StateResult,
    inner: Cow<'_, T>,
    wrap: fn(T) -> StateResult,
) -> Cow<'a, StateResult> {
    match inner {
        Cow::Borrowed(_) => Cow::Borrowed(this),
        Cow::Owned(r) => Cow::Owned(wrap(r)),
    }
}

impl ResultOps for StateResult {
    fn kind(&self) -> ResultKind {
        match self {
            StateResult::Base(_) => ResultKind::Base,
            StateResult::Safe(_) => ResultKind::Safe,
            StateResult::NoResult(_) => ResultKind::NoResult,
            StateResult::Gcs(_) => ResultKind::Gcs,
            StateResult::Native(_) => ResultKind::Native,
            StateResult::S3(_) => ResultKind::S3,
            StateResult::Constant(_) => ResultKind::Constant,
        }
    }

    fn value(&self) -> Option<&Value> {
        match self {
            StateResult::Base(r) => r.value(),
            StateResult::Safe(r) => r.value(),
            StateResult::NoResult(r) => r.value(),
            StateResult::Gcs(r) => r.value(),
            StateResult::Native(r) => r.value(),
            StateResult::S3(r) => r.value(),
            StateResult::Constant(r) => r.value(),
        }
    }

    fn location(&self) -> &str {
        match self {
            StateResult::Base(r) => r.location(),
            StateResult::Safe(r) => r.location(),
            StateResult::NoResult(r) => r.location(),
            StateResult::Gcs(r) => r.location(),
            StateResult::Native(r) => r.location(),
            StateResult::S3(r) => r.location(),
            StateResult::Constant(r) => r.location(),
        }
    }

    fn read(&self, location: &str) -> Result<Cow<'_, Self>> {
        Ok(match self {
            StateResult::Base(r) => lift(self, r.read(location)?, StateResult::Base),
            StateResult::Safe(r) => lift(self, r.read(location)?, StateResult::Safe),
            StateResult::NoResult(r) => lift(self, r.read(location)?, StateResult::NoResult),
            StateResult::Gcs(r) => lift(self, r.read(location)?, StateResult::Gcs),
            StateResult::Native(r) => lift(self, r.read(location)?, StateResult::Native),
            StateResult::S3(r) => lift(self, r.read(location)?, StateResult::S3),
            StateResult::Constant(r) => lift(self, r.read(location)?, StateResult::Constant),
        })
    }

    fn write(&self, value: Value) -> Result<Cow<'_, Self>> {
        Ok(match self {
            StateResult::Base(r) => lift(self, r.write(value)?, StateResult::Base),
            StateResult::Safe(r) => lift(self, r.write(value)?, StateResult::Safe),
            StateResult::NoResult(r) => lift(self, r.write(value)?, StateResult::NoResult),
            StateResult::Gcs(r) => lift(self, r.write(value)?, StateResult::Gcs),
            StateResult::Native(r) => lift(self, r.write(value)?, StateResult::Native),
            StateResult::S3(r) => lift(self, r.write(value)?, StateResult::S3),
            StateResult::Constant(r) => lift(self, r.write(value)?, StateResult::Constant),
        })
    }

    fn exists(&self, location: &str) -> bool {
        match self {
            StateResult::Base(r) => r.exists(location),
            StateResult::Safe(r) => r.exists(location),
            StateResult::NoResult(r) => r.exists(location),
            StateResult::Gcs(r) => r.exists(location),
            StateResult::Native(r) => r.exists(location),
            StateResult::S3(r) => r.exists(location),
            StateResult::Constant(r) => r.exists(location),
        }
    }

    fn is_safe(&self) -> bool {
        match self {
            StateResult::Base(r) => r.is_safe(),
            StateResult::Safe(r) => r.is_safe(),
            StateResult::NoResult(r) => r.is_safe(),
            StateResult::Gcs(r) => r.is_safe(),
            StateResult::Native(r) => r.is_safe(),
            StateResult::S3(r) => r.is_safe(),
            StateResult::Constant(r) => r.is_safe(),
        }
    }
}

impl From<BaseResult> for StateResult {
    fn from(r: BaseResult) -> Self {
        StateResult::Base(r)
    }
}

impl From<SafeResult> for StateResult {
    fn from(r: SafeResult) -> Self {
        StateResult::Safe(r)
    }
}

impl From<NoResult> for StateResult {
    fn from(r: NoResult) -> Self {
        StateResult::NoResult(r)
    }
}

impl From<GcsResult> for StateResult {
    fn from(r: GcsResult) -> Self {
        StateResult::Gcs(r)
    }
}

impl From<NativeResult> for StateResult {
    fn from(r: NativeResult) -> Self {
        StateResult::Native(r)
    }
}

impl From<S3Result> for StateResult {
    fn from(r: S3Result) -> Self {
        StateResult::S3(r)
    }
}

impl From<ConstantResult> for StateResult {
    fn from(r: ConstantResult) -> Self {
        StateResult::Constant(r)
    }
}
