use serde::{Deserialize, Deserializer};

pub mod component;
pub mod job;
pub mod profile;

/// Reads `null` the same as a missing key. Model output uses both.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
