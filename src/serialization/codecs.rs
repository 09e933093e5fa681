use std::marker::PhantomData;

use serde_json::{Map, Value};

use super::schema::{FieldSpec, Fields};
use crate::error::{Result, ResultError};
use crate::results::{
    BaseResult, ConstantResult, NativeResult, NoResult, RemoteBackend, RemoteResult, ResultKind,
    ResultOps, SafeResult, StateResult,
};

/// Converts one result variant to and from its wire fields.
///
/// The dispatcher writes the `type` tag and validates incoming fields
/// against [`ResultCodec::fields`] before calling `decode`.
pub trait ResultCodec: Send + Sync {
    fn kind(&self) -> ResultKind;

    fn fields(&self) -> &'static [FieldSpec];

    /// Emit the variant's fields into `out`.
    fn encode(&self, result: &StateResult, out: &mut Map<String, Value>) -> Result<()>;

    fn decode(&self, fields: Fields<'_>) -> Result<StateResult>;
}

fn mismatch(codec: ResultKind, result: &StateResult) -> ResultError {
    ResultError::schema(format!(
        "{} codec cannot encode a {}",
        codec,
        result.kind()
    ))
}

const REMOTE_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("filepath"),
    FieldSpec::string("bucket"),
    FieldSpec::string("credentials_secret").nullable(),
];

/// Locator triple for GCS and S3 results. The cached value and any
/// resolved credentials never reach the wire.
pub struct RemoteCodec<B>(PhantomData<B>);

impl<B> Default for RemoteCodec<B> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<B: RemoteBackend> ResultCodec for RemoteCodec<B> {
    fn kind(&self) -> ResultKind {
        B::KIND
    }

    fn fields(&self) -> &'static [FieldSpec] {
        REMOTE_FIELDS
    }

    fn encode(&self, result: &StateResult, out: &mut Map<String, Value>) -> Result<()> {
        let remote = B::project(result).ok_or_else(|| mismatch(B::KIND, result))?;
        out.insert("filepath".into(), remote.filepath().into());
        out.insert("bucket".into(), remote.bucket().into());
        out.insert(
            "credentials_secret".into(),
            remote.credentials_secret().map_or(Value::Null, Value::from),
        );
        Ok(())
    }

    fn decode(&self, fields: Fields<'_>) -> Result<StateResult> {
        let (Some(bucket), Some(filepath)) = (fields.str("bucket"), fields.str("filepath")) else {
            return Err(ResultError::schema(format!(
                "{}: bucket and filepath are required",
                B::KIND
            )));
        };
        let mut result = RemoteResult::<B>::new(bucket, filepath);
        if let Some(secret) = fields.str("credentials_secret") {
            result = result.with_credentials_secret(secret);
        }
        Ok(B::wrap(result))
    }
}

/// The wire `value` is the already-encoded JSON text, i.e. the location.
/// Encoded text is copied verbatim in both directions and never parsed.
pub struct NativeCodec;

impl ResultCodec for NativeCodec {
    fn kind(&self) -> ResultKind {
        ResultKind::Native
    }

    fn fields(&self) -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[FieldSpec::string("value").nullable()];
        FIELDS
    }

    fn encode(&self, result: &StateResult, out: &mut Map<String, Value>) -> Result<()> {
        let StateResult::Native(native) = result else {
            return Err(mismatch(ResultKind::Native, result));
        };
        // An unwritten result carries the text `write` would produce.
        let value = match (native.location(), native.value()) {
            ("", Some(value)) => Value::from(serde_json::to_string(value)?),
            ("", None) => Value::Null,
            (encoded, _) => Value::from(encoded),
        };
        out.insert("value".into(), value);
        Ok(())
    }

    fn decode(&self, fields: Fields<'_>) -> Result<StateResult> {
        Ok(StateResult::Native(match fields.str("value") {
            Some(encoded) => NativeResult::from_location(encoded),
            None => NativeResult::default(),
        }))
    }
}

pub struct SafeCodec;

impl ResultCodec for SafeCodec {
    fn kind(&self) -> ResultKind {
        ResultKind::Safe
    }

    fn fields(&self) -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[FieldSpec::json("value")];
        FIELDS
    }

    fn encode(&self, result: &StateResult, out: &mut Map<String, Value>) -> Result<()> {
        let StateResult::Safe(safe) = result else {
            return Err(mismatch(ResultKind::Safe, result));
        };
        if let Some(value) = safe.value() {
            out.insert("value".into(), value.clone());
        }
        Ok(())
    }

    fn decode(&self, fields: Fields<'_>) -> Result<StateResult> {
        Ok(StateResult::Safe(SafeResult::from_optional(
            fields.value("value").cloned(),
        )))
    }
}

/// The constant itself is never written to the wire; decoding yields a
/// constant holding `null`.
pub struct ConstantCodec;

impl ResultCodec for ConstantCodec {
    fn kind(&self) -> ResultKind {
        ResultKind::Constant
    }

    fn fields(&self) -> &'static [FieldSpec] {
        &[]
    }

    fn encode(&self, result: &StateResult, _out: &mut Map<String, Value>) -> Result<()> {
        match result {
            StateResult::Constant(_) => Ok(()),
            other => Err(mismatch(ResultKind::Constant, other)),
        }
    }

    fn decode(&self, _fields: Fields<'_>) -> Result<StateResult> {
        Ok(StateResult::Constant(ConstantResult::default()))
    }
}

pub struct NoResultCodec;

impl ResultCodec for NoResultCodec {
    fn kind(&self) -> ResultKind {
        ResultKind::NoResult
    }

    fn fields(&self) -> &'static [FieldSpec] {
        &[]
    }

    fn encode(&self, result: &StateResult, _out: &mut Map<String, Value>) -> Result<()> {
        match result {
            StateResult::NoResult(_) => Ok(()),
            other => Err(mismatch(ResultKind::NoResult, other)),
        }
    }

    fn decode(&self, _fields: Fields<'_>) -> Result<StateResult> {
        Ok(StateResult::NoResult(NoResult))
    }
}

pub struct BaseCodec;

impl ResultCodec for BaseCodec {
    fn kind(&self) -> ResultKind {
        ResultKind::Base
    }

    fn fields(&self) -> &'static [FieldSpec] {
        &[]
    }

    fn encode(&self, result: &StateResult, _out: &mut Map<String, Value>) -> Result<()> {
        match result {
            StateResult::Base(_) => Ok(()),
            other => Err(mismatch(ResultKind::Base, other)),
        }
    }

    fn decode(&self, _fields: Fields<'_>) -> Result<StateResult> {
        Ok(StateResult::Base(BaseResult::new()))
    }
}
