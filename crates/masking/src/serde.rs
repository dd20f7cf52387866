//!
//! Serde-related.
//!

use serde::{de, Deserialize};
use zeroize::Zeroize;

use crate::{Secret, Strategy};

// Secrets are only read from configuration, so there is no `Serialize` impl.
impl<'de, T, I> Deserialize<'de> for Secret<T, I>
where
    T: de::DeserializeOwned + Zeroize,
    I: Strategy<T>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Self::new)
    }
}
