//! Tolerant field decoding for stored and imported entities.
//!
//! # Invariants
//! - A missing, null or mistyped field decodes to the field type's default
//!   instead of failing the whole entity.
//! - Only field values go through here; an entity that is not a JSON object
//!   still fails to decode.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes `T` from the field value, falling back to `T::default()`.
///
/// Pair with `#[serde(default)]` so absent fields take the same path.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
