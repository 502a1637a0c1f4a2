//! Recording adapters: delegate to an inner port and capture each call.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod search;

use std::sync::PoisonError;

use serde::Serialize;
use serde_json::{json, Value};

use crate::cassette::session::SharedRecorder;

pub use clock::RecordingClock;
pub use filesystem::RecordingFileSystem;
pub use id_gen::RecordingIdGenerator;
pub use search::RecordingSearchProvider;

/// Records a call whose return value is not a `Result`.
pub(crate) fn record_interaction<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize + ?Sized,
    O: Serialize + ?Sized,
{
    let input = serde_json::to_value(input).unwrap_or(Value::Null);
    let output = serde_json::to_value(output).unwrap_or(Value::Null);
    recorder.lock().unwrap_or_else(PoisonError::into_inner).record(port, method, input, output);
}

/// Records a `Result` call as `{"ok": value}` or `{"err": message}`.
pub(crate) fn record_result<T, E, I>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize + ?Sized,
{
    let output = match result {
        Ok(value) => json!({ "ok": serde_json::to_value(value).unwrap_or(Value::Null) }),
        Err(e) => json!({ "err": e.to_string() }),
    };
    let input = serde_json::to_value(input).unwrap_or(Value::Null);
    recorder.lock().unwrap_or_else(PoisonError::into_inner).record(port, method, input, output);
}
