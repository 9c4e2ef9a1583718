/// Shared types used across the codebase

use serde::{Deserialize, Deserializer};

/// One field of a partial update.
///
/// Absent or `null` in the request body means `Unchanged`; any other value
/// replaces the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Unchanged,
    SetTo(T),
}

impl<T> Patch<T> {
    pub fn apply_to(self, target: &mut T) {
        if let Patch::SetTo(value) = self {
            *target = value;
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::SetTo(value),
            None => Patch::Unchanged,
        })
    }
}
