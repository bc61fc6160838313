//! Strongly typed identifier wrappers around document-store id strings.
//!
//! Every entity the simulator loads is keyed by a string `_id` assigned by the
//! external store.  Wrapping those strings keeps a truck id from being used
//! where a route id belongs.  All IDs are `Clone + Ord + Hash` so they can be
//! used as map keys without ceremony, and `#[serde(transparent)]` so they
//! (de)serialize as plain strings in document payloads.

use std::fmt;

/// Generate a typed ID wrapper around a store id string.
macro_rules! doc_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw store id string.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

doc_id! {
    /// Id of a simulation record (one running scenario).
    pub struct SimulationId;
}

doc_id! {
    /// Id of a stored route document.
    pub struct RouteId;
}

doc_id! {
    /// Id of a persisted truck record.
    pub struct TruckId;
}
