//! Tagged wire form of [`StateResult`].
//!
//! Every result encodes to a JSON object whose `type` field names its
//! variant:
//!
//! ```json
//! {"type": "S3Result", "__version__": "1.10.0", "bucket": "artifacts",
//!  "filepath": "runs/42.json", "credentials_secret": "AWS_CREDENTIALS"}
//! ```
//!
//! [`CodecRegistry`] maps each tag to the codec for its variant. The set of
//! tags is closed: decoding an unregistered tag is an error, never a
//! fallback to some default variant.

pub mod codecs;
pub mod json;
pub mod schema;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, ResultError};
use crate::results::{GcsBackend, ResultKind, ResultOps, S3Backend, StateResult};
use codecs::{
    BaseCodec, ConstantCodec, NativeCodec, NoResultCodec, RemoteCodec, ResultCodec, SafeCodec,
};
use schema::{TYPE_FIELD, VERSION_FIELD};

static REGISTRY: LazyLock<CodecRegistry> = LazyLock::new(CodecRegistry::with_builtins);

/// The process-wide registry holding every built-in codec.
pub fn registry() -> &'static CodecRegistry {
    &REGISTRY
}

/// Closed map from wire tag to codec.
pub struct CodecRegistry {
    codecs: HashMap<&'static str, Arc<dyn ResultCodec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl CodecRegistry {
    /// A registry with one codec per [`ResultKind`].
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            codecs: HashMap::with_capacity(ResultKind::ALL.len()),
        };
        for kind in ResultKind::ALL {
            registry.register(builtin_codec(kind));
        }
        registry
    }

    fn register(&mut self, codec: Arc<dyn ResultCodec>) {
        self.codecs.insert(codec.kind().tag(), codec);
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = self.codecs.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    fn codec(&self, tag: &str) -> Result<&Arc<dyn ResultCodec>> {
        self.codecs
            .get(tag)
            .ok_or_else(|| ResultError::UnknownVariant {
                tag: tag.to_string(),
            })
    }

    /// Encode `result` as `{type, __version__, ...fields}`.
    pub fn encode(&self, result: &StateResult) -> Result<Value> {
        let tag = result.kind().tag();
        let codec = self.codec(tag)?;

        let mut out = Map::new();
        out.insert(TYPE_FIELD.into(), tag.into());
        out.insert(VERSION_FIELD.into(), env!("CARGO_PKG_VERSION").into());
        codec.encode(result, &mut out)?;

        debug!(tag, "Encoded result");
        Ok(Value::Object(out))
    }

    /// Decode a tagged wire object into its concrete variant.
    pub fn decode(&self, wire: &Value) -> Result<StateResult> {
        let object = wire
            .as_object()
            .ok_or_else(|| ResultError::schema("result must be a JSON object"))?;
        let tag = match object.get(TYPE_FIELD) {
            Some(Value::String(tag)) => tag.as_str(),
            Some(_) => return Err(ResultError::schema("'type' must be a string")),
            None => return Err(ResultError::schema("missing required field 'type'")),
        };

        let codec = self.codec(tag)?;
        let fields = schema::validate(codec.kind(), codec.fields(), object)?;
        let result = codec.decode(fields)?;

        debug!(tag, "Decoded result");
        Ok(result)
    }

    /// Decode from YAML, rejecting content JSON cannot represent.
    pub fn decode_yaml(&self, wire: &serde_yml::Value) -> Result<StateResult> {
        self.decode(&json::from_yaml(wire)?)
    }

    /// Decode from JSON text.
    pub fn decode_str(&self, text: &str) -> Result<StateResult> {
        let wire: Value = serde_json::from_str(text)?;
        self.decode(&wire)
    }

    /// Encode to JSON text.
    pub fn encode_string(&self, result: &StateResult) -> Result<String> {
        Ok(serde_json::to_string(&self.encode(result)?)?)
    }
}

fn builtin_codec(kind: ResultKind) -> Arc<dyn ResultCodec> {
    match kind {
        ResultKind::Base => Arc::new(BaseCodec),
        ResultKind::Safe => Arc::new(SafeCodec),
        ResultKind::NoResult => Arc::new(NoResultCodec),
        ResultKind::Gcs => Arc::new(RemoteCodec::<GcsBackend>::default()),
        ResultKind::Native => Arc::new(NativeCodec),
        ResultKind::S3 => Arc::new(RemoteCodec::<S3Backend>::default()),
        ResultKind::Constant => Arc::new(ConstantCodec),
    }
}

impl Serialize for StateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        registry()
            .encode(self)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StateResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = Value::deserialize(deserializer)?;
        registry().decode(&wire).map_err(D::Error::custom)
    }
}
