//! Tri-state field for partial updates
//!
//! A JSON body can leave a field out, set it to `null`, or give it a value.
//! `Option<T>` collapses the first two; [`Patch`] keeps them apart so that
//! `0`, `""` and `false` are applied as real values and an omitted field is
//! left untouched.
//!
//! Fields must carry `#[serde(default)]` so that omission maps to
//! [`Patch::Missing`].

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    /// Field absent from the body
    #[default]
    Missing,
    /// Field present and explicitly `null`
    Null,
    /// Field present with a value
    Value(T),
}

impl<T> Patch<T> {
    /// Convert the value, keeping `Missing` and `Null` as they are
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Missing => Patch::Missing,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)?),
        })
    }

    /// Apply to a nullable slot: `Null` clears it, `Missing` leaves it.
    pub fn apply_to_option(self, slot: &mut Option<T>) {
        match self {
            Patch::Missing => {}
            Patch::Null => *slot = None,
            Patch::Value(v) => *slot = Some(v),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}
