//! Non-fatal findings collected while normalizing and balancing a blueprint.
//!
//! Nothing in this crate fails on a semantically incomplete document. Entries
//! that cannot take part in rate arithmetic are ignored, and each one is
//! reported here for callers that want stricter validation.

use std::fmt;

use serde::Serialize;

use crate::id::{EdgeId, Item, NodeId};

/// Which end of an edge a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeEnd {
    From,
    To,
}

impl fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeEnd::From => f.write_str("from"),
            EdgeEnd::To => f.write_str("to"),
        }
    }
}

/// Whether a node rate belongs to its inputs or outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSide {
    Input,
    Output,
}

impl fmt::Display for RateSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSide::Input => f.write_str("input"),
            RateSide::Output => f.write_str("output"),
        }
    }
}

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A node entry had no usable id and was dropped.
    NodeWithoutId { index: usize },
    /// A node repeated an earlier id and was dropped.
    DuplicateNodeId { index: usize, node: NodeId },
    /// A node rate was not a finite, non-negative number and was dropped.
    UnusableNodeRate {
        node: NodeId,
        side: RateSide,
        item: Item,
    },
    /// An edge entry had no usable id; one was assigned.
    EdgeWithoutId { index: usize, assigned: EdgeId },
    /// An edge repeated an earlier id. It is kept.
    DuplicateEdgeId { index: usize, edge: EdgeId },
    /// An edge end lacks a node or an item. The edge carries no flow.
    EdgeMissingEndpoint { edge: EdgeId, end: EdgeEnd },
    /// An edge rate is missing, non-numeric, non-finite or negative. The edge
    /// carries no flow.
    UnusableEdgeRate { edge: EdgeId },
    /// An edge end names a node that is not in the blueprint.
    DanglingEndpoint {
        edge: EdgeId,
        end: EdgeEnd,
        node: NodeId,
    },
}

impl Diagnostic {
    /// The edge this finding is about, if any.
    pub fn edge(&self) -> Option<&EdgeId> {
        match self {
            Diagnostic::EdgeWithoutId { assigned, .. } => Some(assigned),
            Diagnostic::DuplicateEdgeId { edge, .. }
            | Diagnostic::EdgeMissingEndpoint { edge, .. }
            | Diagnostic::UnusableEdgeRate { edge }
            | Diagnostic::DanglingEndpoint { edge, .. } => Some(edge),
            _ => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NodeWithoutId { index } => {
                write!(f, "node #{index} has no id and was ignored")
            }
            Diagnostic::DuplicateNodeId { index, node } => {
                write!(f, "node #{index} repeats id '{node}' and was ignored")
            }
            Diagnostic::UnusableNodeRate { node, side, item } => {
                write!(f, "node '{node}' has an unusable {side} rate for '{item}'")
            }
            Diagnostic::EdgeWithoutId { index, assigned } => {
                write!(f, "edge #{index} has no id; using '{assigned}'")
            }
            Diagnostic::DuplicateEdgeId { index, edge } => {
                write!(f, "edge #{index} repeats id '{edge}'")
            }
            Diagnostic::EdgeMissingEndpoint { edge, end } => {
                write!(f, "edge '{edge}' has an incomplete '{end}' endpoint")
            }
            Diagnostic::UnusableEdgeRate { edge } => {
                write!(f, "edge '{edge}' has no usable rate")
            }
            Diagnostic::DanglingEndpoint { edge, end, node } => {
                write!(f, "edge '{edge}' '{end}' references unknown node '{node}'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offender() {
        let d = Diagnostic::DanglingEndpoint {
            edge: "e9".into(),
            end: EdgeEnd::To,
            node: "ghost".into(),
        };
        assert_eq!(d.to_string(), "edge 'e9' 'to' references unknown node 'ghost'");
        assert_eq!(d.edge().map(EdgeId::as_str), Some("e9"));
    }

    #[test]
    fn node_findings_have_no_edge() {
        let d = Diagnostic::NodeWithoutId { index: 3 };
        assert!(d.edge().is_none());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let d = Diagnostic::UnusableEdgeRate { edge: "e1".into() };
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["kind"], "unusable_edge_rate");
        assert_eq!(value["edge"], "e1");
    }
}
