//! Steady-state flow balance of a blueprint.
//!
//! One pass over the edges aggregates the flow bound to every node port, one
//! pass over the nodes compares those flows against declared rates, and the
//! item ledger sums declared rates across the whole blueprint. There is no
//! graph traversal: the report describes declared rate mismatches, not
//! reachability or capacity-constrained flow.
//!
//! # Example
//!
//! ```
//! use factorial_blueprint::balance::{NodeStatus, compute_balance};
//! use factorial_blueprint::blueprint::{Blueprint, Edge, Node, PortRef};
//!
//! let bp = Blueprint::new("pair")
//!     .with_node(Node::new("m1").with_output("ore", 60.0))
//!     .with_node(Node::new("s1").with_input("ore", 60.0))
//!     .with_edge(Edge::new("e1", PortRef::new("m1", "ore"), PortRef::new("s1", "ore"), 40.0));
//!
//! let report = compute_balance(&bp);
//! assert_eq!(report.node_checks[0].status(), NodeStatus::UnderRouted);
//! assert_eq!(report.node_checks[1].status(), NodeStatus::Starving);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::blueprint::{Blueprint, Node, RateMap, is_usable_rate};
use crate::diagnostics::{Diagnostic, EdgeEnd, RateSide};
use crate::id::{FlowKey, Item, NodeId};

/// Tolerance below which a shortfall is treated as floating-point noise.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Upper clamp for utilization ratios.
pub const DEFAULT_MAX_UTILIZATION: f64 = 10.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the balance computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceConfig {
    /// Shortfalls no larger than this are not reported.
    pub epsilon: f64,
    /// Utilization ratios are clamped to `[0, max_utilization]`.
    pub max_utilization: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_utilization: DEFAULT_MAX_UTILIZATION,
        }
    }
}

impl BalanceConfig {
    /// Replace out-of-range values with the defaults.
    fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            epsilon: if self.epsilon.is_finite() && self.epsilon >= 0.0 {
                self.epsilon
            } else {
                defaults.epsilon
            },
            max_utilization: if self.max_utilization.is_finite() && self.max_utilization > 0.0 {
                self.max_utilization
            } else {
                defaults.max_utilization
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Health of a single input port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputRow {
    pub item: Item,
    /// Declared requirement.
    pub need: f64,
    /// Total rate of edges delivering into this port.
    pub got: f64,
    pub utilization: f64,
}

impl InputRow {
    pub fn is_short(&self, epsilon: f64) -> bool {
        self.got + epsilon < self.need
    }
}

/// Health of a single output port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub item: Item,
    /// Declared production.
    pub prod: f64,
    /// Total rate of edges leaving this port.
    pub sent: f64,
    pub utilization: f64,
}

impl OutputRow {
    pub fn is_short(&self, epsilon: f64) -> bool {
        self.sent + epsilon < self.prod
    }
}

/// Status shown for a node. Exactly one applies, checked in declaration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeStatus {
    #[serde(rename = "STARVING")]
    Starving,
    #[serde(rename = "UNDER-ROUTED")]
    UnderRouted,
    #[serde(rename = "OK")]
    Ok,
}

impl NodeStatus {
    pub fn label(self) -> &'static str {
        match self {
            NodeStatus::Starving => "STARVING",
            NodeStatus::UnderRouted => "UNDER-ROUTED",
            NodeStatus::Ok => "OK",
        }
    }

    /// One-line explanation for inspectors.
    pub fn summary(self) -> &'static str {
        match self {
            NodeStatus::Starving => "Input-starved: not enough incoming flow.",
            NodeStatus::UnderRouted => "Not fully utilized: outputs not fully routed.",
            NodeStatus::Ok => "Looks balanced from the JSON rates.",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-node comparison of declared rates against routed flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCheck {
    pub id: NodeId,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub tier: String,
    pub machines: f64,
    pub input_rows: Vec<InputRow>,
    pub output_rows: Vec<OutputRow>,
    /// Some input receives less than it needs.
    pub starving: bool,
    /// Some output sends less than it produces.
    pub under_routed: bool,
}

impl NodeCheck {
    pub fn status(&self) -> NodeStatus {
        if self.starving {
            NodeStatus::Starving
        } else if self.under_routed {
            NodeStatus::UnderRouted
        } else {
            NodeStatus::Ok
        }
    }

    pub fn input(&self, item: &str) -> Option<&InputRow> {
        self.input_rows.iter().find(|r| r.item.as_str() == item)
    }

    pub fn output(&self, item: &str) -> Option<&OutputRow> {
        self.output_rows.iter().find(|r| r.item.as_str() == item)
    }
}

/// Blueprint-wide totals for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemBalance {
    pub item: Item,
    /// Sum of every node's declared output of this item.
    pub produced: f64,
    /// Sum of every node's declared input of this item.
    pub consumed: f64,
    /// `produced - consumed`.
    pub net: f64,
}

/// Result of [`compute_balance`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BalanceReport {
    /// One check per node, in blueprint order.
    pub node_checks: Vec<NodeCheck>,
    /// One entry per item, sorted by item.
    pub item_balance: Vec<ItemBalance>,
    /// Entries the computation ignored.
    pub diagnostics: Vec<Diagnostic>,
}

impl BalanceReport {
    pub fn node_check(&self, id: &str) -> Option<&NodeCheck> {
        self.node_checks.iter().find(|c| c.id.as_str() == id)
    }

    pub fn item(&self, item: &str) -> Option<&ItemBalance> {
        self.item_balance.iter().find(|b| b.item.as_str() == item)
    }

    /// Number of nodes with the given status.
    pub fn count(&self, status: NodeStatus) -> usize {
        self.node_checks
            .iter()
            .filter(|c| c.status() == status)
            .count()
    }

    /// Whether every node reports [`NodeStatus::Ok`].
    pub fn is_balanced(&self) -> bool {
        self.node_checks.iter().all(|c| c.status() == NodeStatus::Ok)
    }
}

// ---------------------------------------------------------------------------
// Flow aggregation
// ---------------------------------------------------------------------------

/// Routed flow per node port.
#[derive(Debug, Clone, Default)]
pub struct FlowLedger {
    incoming: HashMap<FlowKey, f64>,
    outgoing: HashMap<FlowKey, f64>,
}

impl FlowLedger {
    /// Aggregate the flow of every usable edge. Skipped edges and dangling
    /// endpoints are appended to `diagnostics`.
    pub fn build(blueprint: &Blueprint, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let known: HashSet<&str> = blueprint.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut ledger = Self::default();

        for edge in &blueprint.edges {
            let (Some(from), Some(to)) = (&edge.from, &edge.to) else {
                for (end, port) in [(EdgeEnd::From, &edge.from), (EdgeEnd::To, &edge.to)] {
                    if port.is_none() {
                        diagnostics.push(Diagnostic::EdgeMissingEndpoint {
                            edge: edge.id.clone(),
                            end,
                        });
                    }
                }
                tracing::debug!(edge = %edge.id, "skipping edge with missing endpoint");
                continue;
            };
            let Some(rate) = edge.rate.filter(|r| is_usable_rate(*r)) else {
                diagnostics.push(Diagnostic::UnusableEdgeRate {
                    edge: edge.id.clone(),
                });
                tracing::debug!(edge = %edge.id, rate = ?edge.rate, "skipping edge with unusable rate");
                continue;
            };

            for (end, port) in [(EdgeEnd::From, from), (EdgeEnd::To, to)] {
                if !known.contains(port.node.as_str()) {
                    diagnostics.push(Diagnostic::DanglingEndpoint {
                        edge: edge.id.clone(),
                        end,
                        node: port.node.clone(),
                    });
                }
            }

            *ledger
                .outgoing
                .entry(FlowKey::new(from.node.clone(), from.item.clone()))
                .or_default() += rate;
            *ledger
                .incoming
                .entry(FlowKey::new(to.node.clone(), to.item.clone()))
                .or_default() += rate;
        }

        ledger
    }

    /// Total rate delivered into `(node, item)`.
    pub fn incoming(&self, node: &NodeId, item: &Item) -> f64 {
        self.lookup(&self.incoming, node, item)
    }

    /// Total rate sent from `(node, item)`.
    pub fn outgoing(&self, node: &NodeId, item: &Item) -> f64 {
        self.lookup(&self.outgoing, node, item)
    }

    fn lookup(&self, map: &HashMap<FlowKey, f64>, node: &NodeId, item: &Item) -> f64 {
        map.get(&FlowKey::new(node.clone(), item.clone()))
            .copied()
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute the balance report with the default configuration.
pub fn compute_balance(blueprint: &Blueprint) -> BalanceReport {
    compute_balance_with(blueprint, &BalanceConfig::default())
}

/// Compute the balance report. Never fails: anything unusable is skipped and
/// listed in [`BalanceReport::diagnostics`].
pub fn compute_balance_with(blueprint: &Blueprint, config: &BalanceConfig) -> BalanceReport {
    let config = config.sanitized();
    let _span = tracing::trace_span!(
        "compute_balance",
        nodes = blueprint.nodes.len(),
        edges = blueprint.edges.len()
    )
    .entered();

    let mut diagnostics = Vec::new();
    let ledger = FlowLedger::build(blueprint, &mut diagnostics);

    let mut totals: BTreeMap<Item, (f64, f64)> = blueprint
        .items
        .iter()
        .map(|item| (item.clone(), (0.0, 0.0)))
        .collect();

    let mut node_checks = Vec::with_capacity(blueprint.nodes.len());
    for node in &blueprint.nodes {
        let inputs = usable_rates(node, RateSide::Input, &node.inputs, &mut diagnostics);
        let outputs = usable_rates(node, RateSide::Output, &node.outputs, &mut diagnostics);

        for &(item, need) in &inputs {
            totals.entry(item.clone()).or_default().1 += need;
        }
        for &(item, prod) in &outputs {
            totals.entry(item.clone()).or_default().0 += prod;
        }

        node_checks.push(check_node(node, &inputs, &outputs, &ledger, &config));
    }

    let item_balance = totals
        .into_iter()
        .map(|(item, (produced, consumed))| ItemBalance {
            item,
            produced,
            consumed,
            net: produced - consumed,
        })
        .collect();

    if !diagnostics.is_empty() {
        tracing::debug!(count = diagnostics.len(), "balance ignored some entries");
    }

    BalanceReport {
        node_checks,
        item_balance,
        diagnostics,
    }
}

fn usable_rates<'a>(
    node: &Node,
    side: RateSide,
    rates: &'a RateMap,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<(&'a Item, f64)> {
    let mut usable = Vec::with_capacity(rates.len());
    for (item, &rate) in rates {
        if is_usable_rate(rate) {
            usable.push((item, rate));
        } else {
            diagnostics.push(Diagnostic::UnusableNodeRate {
                node: node.id.clone(),
                side,
                item: item.clone(),
            });
        }
    }
    usable
}

fn utilization(actual: f64, declared: f64, config: &BalanceConfig) -> f64 {
    if declared > 0.0 {
        (actual / declared).clamp(0.0, config.max_utilization)
    } else {
        1.0
    }
}

fn check_node(
    node: &Node,
    inputs: &[(&Item, f64)],
    outputs: &[(&Item, f64)],
    ledger: &FlowLedger,
    config: &BalanceConfig,
) -> NodeCheck {
    let input_rows: Vec<InputRow> = inputs
        .iter()
        .map(|&(item, need)| {
            let got = ledger.incoming(&node.id, item);
            InputRow {
                item: item.clone(),
                need,
                got,
                utilization: utilization(got, need, config),
            }
        })
        .collect();

    let output_rows: Vec<OutputRow> = outputs
        .iter()
        .map(|&(item, prod)| {
            let sent = ledger.outgoing(&node.id, item);
            OutputRow {
                item: item.clone(),
                prod,
                sent,
                utilization: utilization(sent, prod, config),
            }
        })
        .collect();

    let starving = input_rows.iter().any(|r| r.is_short(config.epsilon));
    let under_routed = output_rows.iter().any(|r| r.is_short(config.epsilon));

    NodeCheck {
        id: node.id.clone(),
        label: node.display_label().to_string(),
        kind: node.display_kind().to_string(),
        tier: node.display_tier().to_string(),
        machines: node.machines,
        input_rows,
        output_rows,
        starving,
        under_routed,
    }
}
