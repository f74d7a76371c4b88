//! Serde helper for upstream documents that send `null` in place of a value.

use serde::{Deserialize, Deserializer};

/// Decode `null` as `T::default()`.
///
/// Combine with a container-level `#[serde(default)]` so missing keys and
/// `null` values end up the same.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
