//! JSON persistence for skeletons, poses and clips.
//!
//! Persisted layouts carry only authored state: a pose stores its skeleton
//! and local transforms and rederives globals and the matrix palette on
//! load; a clip stores its channels and recomputes its max time. Malformed
//! or semantically invalid data surfaces as a hard error, since a partially
//! restored hierarchy only moves the failure somewhere harder to diagnose.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::Result;

/// Encode a persistable value to pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Decode a persistable value from JSON.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}
