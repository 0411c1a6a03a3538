//! Server response envelope.
//!
//! The API may answer with the payload itself or wrapped as `{ "data": ... }`.
//! Both shapes decode into `Envelope<T>`; callers only ever see the inner `T`.
//! An object with a `data` member is always treated as wrapped, whatever
//! other members sit next to it.
//!
//! `#[serde(untagged)]` is not used here: a derived struct variant also
//! accepts a one-element JSON array, which would unwrap `[x]` to `x`.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if let Value::Object(mut map) = value {
            if let Some(data) = map.remove("data") {
                return T::deserialize(data)
                    .map(|data| Envelope::Wrapped { data })
                    .map_err(D::Error::custom);
            }
            return T::deserialize(Value::Object(map))
                .map(Envelope::Bare)
                .map_err(D::Error::custom);
        }
        T::deserialize(value).map(Envelope::Bare).map_err(D::Error::custom)
    }
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, Envelope::Wrapped { .. })
    }
}
