//! Resolution of raw documents into [`Blueprint`] values.
//!
//! Applies every default the document format allows to be omitted and drops
//! entries that cannot take part in rate arithmetic, recording a
//! [`Diagnostic`] for each. Never fails.

use std::collections::HashSet;

use crate::blueprint::{
    Blueprint, BlueprintMeta, DEFAULT_NAME, DEFAULT_TICK, Edge, Node, PortRef, Position, RateMap,
    is_usable_rate, resolve_machines,
};
use crate::diagnostics::{Diagnostic, EdgeEnd, RateSide};
use crate::id::{EdgeId, Item, NodeId};
use crate::schema::{
    Lenient, RawDocument, RawEdge, RawMeta, RawNode, RawNumber, RawPort, RawRates, RawText, valid,
};

/// A resolved blueprint plus everything that was dropped or defaulted on the
/// way.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub blueprint: Blueprint,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve a raw document into a blueprint.
pub fn normalize(raw: &RawDocument) -> Normalized {
    let mut diagnostics = Vec::new();

    let meta = normalize_meta(valid(&raw.meta));

    let items = valid(&raw.items)
        .map(|items| {
            items
                .iter()
                .filter_map(Lenient::valid)
                .filter_map(RawText::text)
                .map(Item::from)
                .collect()
        })
        .unwrap_or_default();

    let mut nodes = Vec::new();
    let mut seen_nodes: HashSet<NodeId> = HashSet::new();
    if let Some(raw_nodes) = valid(&raw.nodes) {
        for (index, entry) in raw_nodes.iter().enumerate() {
            let Some((raw_node, id)) = entry.valid().and_then(|n| Some((n, node_id(n)?))) else {
                tracing::debug!(index, "dropping node without id");
                diagnostics.push(Diagnostic::NodeWithoutId { index });
                continue;
            };
            // Duplicates are dropped before their rates are looked at.
            if !seen_nodes.insert(id.clone()) {
                tracing::debug!(index, node = %id, "dropping duplicate node");
                diagnostics.push(Diagnostic::DuplicateNodeId { index, node: id });
                continue;
            }
            nodes.push(normalize_node(id, raw_node, &mut diagnostics));
        }
    }

    let mut edges = Vec::new();
    let mut seen_edges: HashSet<EdgeId> = HashSet::new();
    if let Some(raw_edges) = valid(&raw.edges) {
        for (index, entry) in raw_edges.iter().enumerate() {
            let default_edge = RawEdge::default();
            let raw_edge = entry.valid().unwrap_or(&default_edge);
            let edge = normalize_edge(index, raw_edge, &mut diagnostics);
            if !seen_edges.insert(edge.id.clone()) {
                diagnostics.push(Diagnostic::DuplicateEdgeId {
                    index,
                    edge: edge.id.clone(),
                });
            }
            edges.push(edge);
        }
    }

    Normalized {
        blueprint: Blueprint {
            meta,
            items,
            nodes,
            edges,
        },
        diagnostics,
    }
}

fn normalize_meta(raw: Option<&RawMeta>) -> BlueprintMeta {
    let non_empty = |field: &Option<Lenient<String>>| {
        valid(field)
            .filter(|s| !s.is_empty())
            .map(String::clone)
    };
    BlueprintMeta {
        name: raw
            .and_then(|m| non_empty(&m.name))
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        tick: raw
            .and_then(|m| non_empty(&m.tick))
            .unwrap_or_else(|| DEFAULT_TICK.to_string()),
    }
}

fn node_id(raw: &RawNode) -> Option<NodeId> {
    valid(&raw.id).and_then(RawText::text).map(NodeId::from)
}

fn normalize_node(id: NodeId, raw: &RawNode, diagnostics: &mut Vec<Diagnostic>) -> Node {
    let machines = resolve_machines(valid(&raw.machines).and_then(RawNumber::value));
    let pos = valid(&raw.pos)
        .and_then(|p| Some(Position { x: p.x.value()?, y: p.y.value()? }))
        .filter(|p| p.x.is_finite() && p.y.is_finite());

    let inputs = normalize_rates(&id, RateSide::Input, valid(&raw.inputs), diagnostics);
    let outputs = normalize_rates(&id, RateSide::Output, valid(&raw.outputs), diagnostics);

    Node {
        id,
        kind: valid(&raw.kind).cloned(),
        label: valid(&raw.label).cloned(),
        machines,
        pos,
        inputs,
        outputs,
        tier: valid(&raw.tier).cloned(),
    }
}

fn normalize_rates(
    node: &NodeId,
    side: RateSide,
    raw: Option<&RawRates>,
    diagnostics: &mut Vec<Diagnostic>,
) -> RateMap {
    let mut rates = RateMap::new();
    for (item, value) in raw.into_iter().flatten() {
        match value.valid().and_then(RawNumber::value) {
            Some(rate) if is_usable_rate(rate) => {
                rates.insert(Item::from(item.as_str()), rate);
            }
            _ => diagnostics.push(Diagnostic::UnusableNodeRate {
                node: node.clone(),
                side,
                item: Item::from(item.as_str()),
            }),
        }
    }
    rates
}

fn normalize_edge(index: usize, raw: &RawEdge, diagnostics: &mut Vec<Diagnostic>) -> Edge {
    let id = match valid(&raw.id).and_then(RawText::text) {
        Some(id) => EdgeId::from(id),
        None => {
            let assigned = EdgeId::from(format!("#{index}"));
            diagnostics.push(Diagnostic::EdgeWithoutId {
                index,
                assigned: assigned.clone(),
            });
            assigned
        }
    };

    let from = normalize_port(valid(&raw.from));
    if from.is_none() {
        diagnostics.push(Diagnostic::EdgeMissingEndpoint {
            edge: id.clone(),
            end: EdgeEnd::From,
        });
    }
    let to = normalize_port(valid(&raw.to));
    if to.is_none() {
        diagnostics.push(Diagnostic::EdgeMissingEndpoint {
            edge: id.clone(),
            end: EdgeEnd::To,
        });
    }

    let rate = valid(&raw.rate)
        .and_then(RawNumber::value)
        .filter(|r| is_usable_rate(*r));
    if rate.is_none() {
        diagnostics.push(Diagnostic::UnusableEdgeRate { edge: id.clone() });
    }

    Edge {
        id,
        from,
        to,
        rate,
        label: valid(&raw.label).cloned(),
    }
}

fn normalize_port(raw: Option<&RawPort>) -> Option<PortRef> {
    let raw = raw?;
    let node = valid(&raw.node).and_then(RawText::text)?;
    let item = valid(&raw.item).and_then(RawText::text)?;
    Some(PortRef::new(node, item))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Normalized {
        let raw: RawDocument = serde_json::from_str(json).unwrap();
        normalize(&raw)
    }

    #[test]
    fn empty_document_gets_defaults() {
        let n = parse("{}");
        assert_eq!(n.blueprint.meta.name, "Untitled Blueprint");
        assert_eq!(n.blueprint.meta.tick, "per_min");
        assert!(n.blueprint.items.is_empty());
        assert!(n.blueprint.nodes.is_empty());
        assert!(n.blueprint.edges.is_empty());
        assert!(n.diagnostics.is_empty());
    }

    #[test]
    fn empty_meta_name_gets_default() {
        let n = parse(r#"{ "meta": { "name": "", "tick": "per_sec" } }"#);
        assert_eq!(n.blueprint.meta.name, "Untitled Blueprint");
        assert_eq!(n.blueprint.meta.tick, "per_sec");
    }

    #[test]
    fn node_fields_resolve() {
        let n = parse(
            r#"{ "nodes": [ { "id": "f1", "type": "electric_furnace", "label": "Furnace",
                 "machines": 3, "tier": "base", "pos": { "x": 520, "y": 170 },
                 "inputs": { "raw_copper": 60 }, "outputs": { "liquid_copper": "60" } } ] }"#,
        );
        let node = &n.blueprint.nodes[0];
        assert_eq!(node.id.as_str(), "f1");
        assert_eq!(node.display_kind(), "electric_furnace");
        assert_eq!(node.display_label(), "Furnace");
        assert_eq!(node.machines, 3.0);
        assert_eq!(node.pos, Some(Position { x: 520.0, y: 170.0 }));
        assert_eq!(node.inputs[&Item::from("raw_copper")], 60.0);
        assert_eq!(node.outputs[&Item::from("liquid_copper")], 60.0);
        assert!(n.diagnostics.is_empty());
    }

    #[test]
    fn bad_machine_counts_default_to_one() {
        let n = parse(
            r#"{ "nodes": [ { "id": "a", "machines": 0 }, { "id": "b", "machines": -2 },
                            { "id": "c", "machines": "lots" }, { "id": "d" } ] }"#,
        );
        assert!(n.blueprint.nodes.iter().all(|node| node.machines == 1.0));
    }

    #[test]
    fn unusable_node_rates_are_dropped() {
        let n = parse(
            r#"{ "nodes": [ { "id": "a", "inputs": { "ore": "x", "coal": -1, "sand": 5 },
                              "outputs": [1, 2] } ] }"#,
        );
        let node = &n.blueprint.nodes[0];
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.inputs[&Item::from("sand")], 5.0);
        assert!(node.outputs.is_empty());
        assert_eq!(n.diagnostics.len(), 2);
        assert!(n.diagnostics.contains(&Diagnostic::UnusableNodeRate {
            node: "a".into(),
            side: RateSide::Input,
            item: "coal".into(),
        }));
    }

    #[test]
    fn nodes_without_id_and_duplicates_are_dropped() {
        let n = parse(r#"{ "nodes": [ { "label": "nameless" }, 7, { "id": "a" }, { "id": "a" } ] }"#);
        assert_eq!(n.blueprint.nodes.len(), 1);
        assert_eq!(
            n.diagnostics,
            vec![
                Diagnostic::NodeWithoutId { index: 0 },
                Diagnostic::NodeWithoutId { index: 1 },
                Diagnostic::DuplicateNodeId {
                    index: 3,
                    node: "a".into()
                },
            ]
        );
    }

    #[test]
    fn dropped_duplicate_reports_no_rate_problems() {
        let n = parse(
            r#"{ "nodes": [ { "id": "a", "outputs": { "ore": 5 } },
                            { "id": "a", "inputs": { "ore": -1 }, "outputs": { "slag": "x" } } ] }"#,
        );
        assert_eq!(n.blueprint.nodes.len(), 1);
        assert_eq!(n.blueprint.nodes[0].outputs[&Item::from("ore")], 5.0);
        assert_eq!(
            n.diagnostics,
            vec![Diagnostic::DuplicateNodeId {
                index: 1,
                node: "a".into()
            }]
        );
    }

    #[test]
    fn numeric_ids_become_strings() {
        let n = parse(r#"{ "nodes": [ { "id": 7 } ], "items": ["ore", 3, null] }"#);
        assert_eq!(n.blueprint.nodes[0].id.as_str(), "7");
        let items: Vec<&str> = n.blueprint.items.iter().map(Item::as_str).collect();
        assert_eq!(items, ["ore", "3"]);
    }

    #[test]
    fn incomplete_edges_are_kept_without_flow() {
        let n = parse(
            r#"{ "edges": [
                { "id": "e1", "from": { "node": "a" }, "to": { "node": "b", "item": "ore" }, "rate": 5 },
                { "id": "e2", "from": { "node": "a", "item": "ore" }, "to": { "node": "b", "item": "ore" }, "rate": "fast" },
                { "from": { "node": "a", "item": "ore" }, "to": { "node": "b", "item": "ore" }, "rate": 1 }
            ] }"#,
        );
        let edges = &n.blueprint.edges;
        assert_eq!(edges.len(), 3);
        assert!(edges[0].from.is_none());
        assert_eq!(edges[0].rate, Some(5.0));
        assert_eq!(edges[1].rate, None);
        assert_eq!(edges[2].id.as_str(), "#2");
        assert_eq!(
            n.diagnostics,
            vec![
                Diagnostic::EdgeMissingEndpoint {
                    edge: "e1".into(),
                    end: EdgeEnd::From
                },
                Diagnostic::UnusableEdgeRate { edge: "e2".into() },
                Diagnostic::EdgeWithoutId {
                    index: 2,
                    assigned: "#2".into()
                },
            ]
        );
    }

    #[test]
    fn negative_edge_rate_is_unusable() {
        let n = parse(
            r#"{ "edges": [ { "id": "e1", "from": { "node": "a", "item": "x" },
                              "to": { "node": "b", "item": "x" }, "rate": -4 } ] }"#,
        );
        assert_eq!(n.blueprint.edges[0].rate, None);
    }

    #[test]
    fn duplicate_edge_ids_are_kept() {
        let n = parse(
            r#"{ "edges": [
                { "id": "e1", "from": { "node": "a", "item": "x" }, "to": { "node": "b", "item": "x" }, "rate": 1 },
                { "id": "e1", "from": { "node": "a", "item": "x" }, "to": { "node": "b", "item": "x" }, "rate": 2 }
            ] }"#,
        );
        assert_eq!(n.blueprint.edges.len(), 2);
        assert_eq!(
            n.diagnostics,
            vec![Diagnostic::DuplicateEdgeId {
                index: 1,
                edge: "e1".into()
            }]
        );
    }

    #[test]
    fn non_finite_position_is_dropped() {
        let n = parse(r#"{ "nodes": [ { "id": "a", "pos": { "x": 1, "y": "top" } } ] }"#);
        assert_eq!(n.blueprint.nodes[0].pos, None);
    }
}
