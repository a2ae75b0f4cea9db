//! Read-only lookups over blueprints and balance reports.
//!
//! Used by inspectors to narrow the node list and to find the check behind a
//! selected node. All functions borrow; nothing is copied out.

use crate::balance::{BalanceReport, NodeCheck, NodeStatus};
use crate::blueprint::{Blueprint, Node};

/// Whether `node` matches a search query.
///
/// Matches when the id, label, type or tier contains the query, compared
/// case-insensitively. The query is trimmed; an empty query matches
/// everything.
pub fn node_matches(node: &Node, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [
        Some(node.id.as_str()),
        node.label.as_deref(),
        node.kind.as_deref(),
        node.tier.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&query))
}

/// Nodes matching `query`, in blueprint order.
pub fn filter_nodes<'a>(blueprint: &'a Blueprint, query: &str) -> Vec<&'a Node> {
    blueprint
        .nodes
        .iter()
        .filter(|n| node_matches(n, query))
        .collect()
}

/// The check for node `id`, if the report has one.
pub fn find_check<'a>(report: &'a BalanceReport, id: &str) -> Option<&'a NodeCheck> {
    report.node_check(id)
}

/// Checks with the given status, in blueprint order.
pub fn checks_with_status(report: &BalanceReport, status: NodeStatus) -> Vec<&NodeCheck> {
    report
        .node_checks
        .iter()
        .filter(|c| c.status() == status)
        .collect()
}
