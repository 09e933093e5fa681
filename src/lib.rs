//! Result carriers for ironflow task outputs.
//!
//! A task's output is wrapped in one of a closed set of [`StateResult`]
//! variants describing where the value lives: held as a constant, encoded
//! into its own location as JSON text, or addressed in a GCS/S3 bucket.
//! The [`serialization`] module converts results to and from a tagged wire
//! object (`{"type": "S3Result", ...}`) with per-variant schema checks.

pub mod config;
pub mod error;
pub mod results;
pub mod serialization;
pub mod storage;

pub use error::{Result, ResultError};
pub use results::{
    BaseResult, ConstantResult, Context, GcsResult, NativeResult, NoResult, ResultKind,
    ResultOps, S3Result, SafeResult, StateResult,
};
pub use serialization::{CodecRegistry, registry};
