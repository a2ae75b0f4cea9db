//! Serde structs for the on-disk blueprint document.
//!
//! The document format is loosely typed: any field may be missing or hold the
//! wrong kind of value. These structs accept all of that. A field that does
//! not have the expected shape deserializes as [`Lenient::Invalid`] rather
//! than failing the whole document, and [`crate::normalize`] later resolves
//! everything into a [`crate::blueprint::Blueprint`].
//!
//! Only the fields the balance engine reads (plus display and layout fields
//! that are round-tripped) are modelled. Unknown fields are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::IgnoredAny;

// ===========================================================================
// Lenient values
// ===========================================================================

/// A value that either has the expected shape or is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T> Lenient<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Lenient::Valid(v) => Some(v),
            Lenient::Invalid(_) => None,
        }
    }
}

/// The usable value of an optional lenient field, if any.
pub fn valid<T>(field: &Option<Lenient<T>>) -> Option<&T> {
    field.as_ref().and_then(Lenient::valid)
}

/// A numeric field: a number, or a string holding one.
///
/// JSON number literals that do not fit in an `f64` arrive as
/// [`RawNumber::Literal`] and resolve to an infinity.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Literal(serde_json::Number),
    Text(String),
}

impl RawNumber {
    /// The numeric value, or `None` if a string does not parse. The result may
    /// still be non-finite; callers decide what they accept.
    pub fn value(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Literal(n) => literal_value(n),
            RawNumber::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    s.parse().ok()
                }
            }
        }
    }
}

fn literal_value(n: &serde_json::Number) -> Option<f64> {
    n.as_str().parse().ok()
}

/// An identifier field: a string, or a number used as one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawText {
    Text(String),
    Number(f64),
    Literal(serde_json::Number),
}

impl RawText {
    /// The identifier as a string, or `None` if it is empty.
    pub fn text(&self) -> Option<String> {
        let number = match self {
            RawText::Text(s) => return (!s.is_empty()).then(|| s.clone()),
            RawText::Number(n) => Some(*n),
            RawText::Literal(n) => literal_value(n),
        };
        number.filter(|n| n.is_finite()).map(|n| n.to_string())
    }
}

// ===========================================================================
// Document
// ===========================================================================

/// Top-level blueprint document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub meta: Option<Lenient<RawMeta>>,
    #[serde(default)]
    pub items: Option<Lenient<Vec<Lenient<RawText>>>>,
    #[serde(default)]
    pub nodes: Option<Lenient<Vec<Lenient<RawNode>>>>,
    #[serde(default)]
    pub edges: Option<Lenient<Vec<Lenient<RawEdge>>>>,
}

/// Display metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMeta {
    #[serde(default)]
    pub name: Option<Lenient<String>>,
    #[serde(default)]
    pub tick: Option<Lenient<String>>,
}

// ===========================================================================
// Nodes
// ===========================================================================

/// Item -> rate map as written in the document.
pub type RawRates = BTreeMap<String, Lenient<RawNumber>>;

/// A node entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNode {
    #[serde(default)]
    pub id: Option<Lenient<RawText>>,
    #[serde(default)]
    pub label: Option<Lenient<String>>,
    #[serde(default, rename = "type")]
    pub kind: Option<Lenient<String>>,
    #[serde(default)]
    pub tier: Option<Lenient<String>>,
    #[serde(default)]
    pub machines: Option<Lenient<RawNumber>>,
    #[serde(default)]
    pub pos: Option<Lenient<RawPosition>>,
    #[serde(default)]
    pub inputs: Option<Lenient<RawRates>>,
    #[serde(default)]
    pub outputs: Option<Lenient<RawRates>>,
}

/// Canvas position. Both coordinates must resolve to finite numbers.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPosition {
    pub x: RawNumber,
    pub y: RawNumber,
}

// ===========================================================================
// Edges
// ===========================================================================

/// An edge entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEdge {
    #[serde(default)]
    pub id: Option<Lenient<RawText>>,
    #[serde(default)]
    pub from: Option<Lenient<RawPort>>,
    #[serde(default)]
    pub to: Option<Lenient<RawPort>>,
    #[serde(default)]
    pub rate: Option<Lenient<RawNumber>>,
    #[serde(default)]
    pub label: Option<Lenient<String>>,
}

/// One end of an edge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPort {
    #[serde(default)]
    pub node: Option<Lenient<RawText>>,
    #[serde(default)]
    pub item: Option<Lenient<RawText>>,
}
