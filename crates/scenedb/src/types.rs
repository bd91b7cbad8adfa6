use derive_more::{Deref, Display};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use ulid::Ulid;

// Ulid-backed identity newtypes. All three serialize as their canonical
// 26-character string form so they survive any generic document serializer.
macro_rules! ulid_newtype {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(Clone, Copy, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[repr(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Mint a fresh identity from the current timestamp and randomness.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// The all-zero identity.
            #[must_use]
            pub const fn nil() -> Self {
                Self(Ulid::nil())
            }

            /// Construct a deterministic identity from raw parts.
            #[must_use]
            pub const fn from_parts(timestamp_ms: u64, random: u128) -> Self {
                Self(Ulid::from_parts(timestamp_ms, random))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                Ulid::from_string(text).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                Ulid::from_string(&text).map(Self).map_err(serde::de::Error::custom)
            }
        }
    };
}

ulid_newtype!(
    ///
    /// SampleId
    ///
    /// Primary identity of one sample in a collection.
    ///
    SampleId
);

ulid_newtype!(
    ///
    /// GroupId
    ///
    /// Logical identity shared by every element of one group.
    ///
    GroupId
);

ulid_newtype!(
    ///
    /// ObjectId
    ///
    /// Identity of an embedded document (e.g. an individual label).
    ///
    ObjectId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_strings() {
        let id = SampleId::from_parts(1_700_000_000_000, 42);
        let text = id.to_string();
        let parsed: SampleId = text.parse().unwrap();

        assert_eq!(parsed, id);
    }

    #[test]
    fn ids_serialize_as_strings() {
        let id = GroupId::from_parts(1_700_000_000_000, 7);
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, format!("\"{id}\""));
        assert_eq!(serde_json::from_str::<GroupId>(&json).unwrap(), id);
    }
}
