//! Resolved blueprint model.
//!
//! These are the values the scale transform and balance engine operate on.
//! They are produced from on-disk documents by [`crate::normalize`], which
//! applies every default, so nothing here needs to re-check optional fields.
//! Serializing a [`Blueprint`] yields the same document schema it was loaded
//! from.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::id::{EdgeId, Item, NodeId};

/// Name used when a document has no usable `meta.name`.
pub const DEFAULT_NAME: &str = "Untitled Blueprint";

/// Time-unit label used when a document has no usable `meta.tick`.
pub const DEFAULT_TICK: &str = "per_min";

/// Type tag reported for nodes without one.
pub const DEFAULT_KIND: &str = "custom";

/// Per-item rates. Ordered so rows and ledgers come out in item order.
pub type RateMap = BTreeMap<Item, f64>;

/// Whether `rate` may take part in rate arithmetic.
pub fn is_usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate >= 0.0
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

/// Display metadata for a blueprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintMeta {
    pub name: String,
    /// Time-unit label for every rate, e.g. `per_min`. Display only.
    pub tick: String,
}

impl Default for BlueprintMeta {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            tick: DEFAULT_TICK.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Canvas position of a node. Carried through for round-tripping only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A production unit: a group of `machines` identical machines that together
/// consume `inputs` and produce `outputs` per time unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Machine-count multiplier. Always positive and finite.
    pub machines: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<Position>,
    pub inputs: RateMap,
    pub outputs: RateMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

impl Node {
    /// A node with one machine and no inputs or outputs.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            label: None,
            machines: 1.0,
            pos: None,
            inputs: RateMap::new(),
            outputs: RateMap::new(),
            tier: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// Set the machine count. Non-positive or non-finite counts reset to 1.
    pub fn with_machines(mut self, machines: f64) -> Self {
        self.machines = resolve_machines(Some(machines));
        self
    }

    pub fn with_input(mut self, item: impl Into<Item>, rate: f64) -> Self {
        self.inputs.insert(item.into(), rate);
        self
    }

    pub fn with_output(mut self, item: impl Into<Item>, rate: f64) -> Self {
        self.outputs.insert(item.into(), rate);
        self
    }

    /// Label for display, falling back to the id.
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => self.id.as_str(),
        }
    }

    /// Type tag for display, falling back to [`DEFAULT_KIND`].
    pub fn display_kind(&self) -> &str {
        match self.kind.as_deref() {
            Some(kind) if !kind.is_empty() => kind,
            _ => DEFAULT_KIND,
        }
    }

    pub fn display_tier(&self) -> &str {
        self.tier.as_deref().unwrap_or("")
    }
}

/// Machine count with the positive default applied.
pub fn resolve_machines(machines: Option<f64>) -> f64 {
    match machines {
        Some(m) if m.is_finite() && m > 0.0 => m,
        _ => 1.0,
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// One end of an edge: an item port on a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PortRef {
    pub node: NodeId,
    pub item: Item,
}

impl PortRef {
    pub fn new(node: impl Into<NodeId>, item: impl Into<Item>) -> Self {
        Self {
            node: node.into(),
            item: item.into(),
        }
    }
}

/// A directed, rated connection from an output port to an input port.
///
/// Endpoints and rate stay optional so that incomplete edges survive a
/// load/export round trip; the balance engine skips them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<PortRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<PortRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// A fully specified edge.
    pub fn new(id: impl Into<EdgeId>, from: PortRef, to: PortRef, rate: f64) -> Self {
        Self {
            id: id.into(),
            from: Some(from),
            to: Some(to),
            rate: Some(rate),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Blueprint
// ---------------------------------------------------------------------------

/// A production graph: nodes connected by rated edges.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Blueprint {
    pub meta: BlueprintMeta,
    /// Declared items. Only used to surface items nothing produces or consumes.
    pub items: Vec<Item>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: BlueprintMeta {
                name: name.into(),
                ..BlueprintMeta::default()
            },
            ..Self::default()
        }
    }

    pub fn with_tick(mut self, tick: impl Into<String>) -> Self {
        self.meta.tick = tick.into();
        self
    }

    pub fn with_item(mut self, item: impl Into<Item>) -> Self {
        self.items.push(item.into());
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    /// Look up an edge by id. Returns the first match if ids repeat.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id.as_str() == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }
}
