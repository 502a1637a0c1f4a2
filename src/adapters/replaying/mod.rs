//! Replaying adapters: serve port calls from a cassette.
//!
//! A replay that diverges from its recording (asks for a call that was not
//! recorded, or finds a malformed value) panics with a descriptive message.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod search;

use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::PortError;

pub use clock::ReplayingClock;
pub use filesystem::ReplayingFileSystem;
pub use id_gen::ReplayingIdGenerator;
pub use search::ReplayingSearchProvider;

/// Takes the next recorded output for `port::method`.
pub(crate) fn next_output(replayer: &Mutex<CassetteReplayer>, port: &str, method: &str) -> Value {
    replayer.lock().unwrap_or_else(PoisonError::into_inner).next_interaction(port, method).output
}

/// Decodes a `{"ok": v}` / `{"err": msg}` output into a `Result`.
///
/// A bare value without either key is treated as `ok`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: &Value,
    context: &str,
) -> Result<T, PortError> {
    if let Some(err) = output.get("err") {
        return Err(err.as_str().unwrap_or("unknown error").to_string().into());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("{context}: failed to deserialize recorded output: {e}").into())
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replay_result_decodes_ok_err_and_bare_values() {
        let ok: Vec<String> = replay_result(&json!({"ok": ["a"]}), "t").unwrap();
        assert_eq!(ok, vec!["a"]);
        let bare: String = replay_result(&json!("plain"), "t").unwrap();
        assert_eq!(bare, "plain");
        let err = replay_result::<String>(&json!({"err": "boom"}), "t").unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
