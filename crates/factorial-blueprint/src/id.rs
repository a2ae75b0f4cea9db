use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

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
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Identifies a node (machine group) in a blueprint. Unique per blueprint.
    NodeId
}

string_id! {
    /// Identifies an edge (rated connection) in a blueprint.
    EdgeId
}

string_id! {
    /// An opaque resource/material identifier such as `copper_plate`.
    Item
}

/// Composite ledger key for a node port: `(node, item)`.
///
/// Kept as a pair rather than a joined string so an item containing any
/// separator character can never collide with another port.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowKey {
    pub node: NodeId,
    pub item: Item,
}

impl FlowKey {
    pub fn new(node: NodeId, item: Item) -> Self {
        Self { node, item }
    }
}
