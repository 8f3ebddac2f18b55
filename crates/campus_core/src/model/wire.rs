//! Lenient serde helpers used at the persistence boundary.
//!
//! Documents written by older clients may carry `null` where a collection is
//! expected, or a store-specific timestamp object. These helpers fold such
//! values into defaults instead of rejecting the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads an epoch-millisecond timestamp, ignoring any other representation.
pub(crate) fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|raw| raw.as_i64()))
}
