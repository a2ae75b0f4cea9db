//! Shared test fixtures for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available to integration tests and benchmarks via the `test-utils`
//! feature.

use crate::blueprint::{Blueprint, Edge, Node, PortRef};

// ===========================================================================
// Item names
// ===========================================================================

pub const COPPER_ORE: &str = "copper_ore";
pub const COPPER_PLATE: &str = "copper_plate";
pub const COPPER_WIRE: &str = "copper_wire";

// ===========================================================================
// Builders
// ===========================================================================

/// Connect `from`'s output of `item` to `to`'s input of the same item.
pub fn link(id: &str, from: &str, to: &str, item: &str, rate: f64) -> Edge {
    Edge::new(id, PortRef::new(from, item), PortRef::new(to, item), rate)
}

/// Four-node copper chain, every stage at 60:
/// Miner -> Smelter -> Wire Machine -> Storage.
pub fn copper_chain() -> Blueprint {
    copper_chain_with_wire_feed(60.0)
}

/// The copper chain with the Smelter -> Wire Machine edge at `rate`.
pub fn copper_chain_with_wire_feed(rate: f64) -> Blueprint {
    Blueprint::new("Copper Chain")
        .with_item(COPPER_ORE)
        .with_item(COPPER_PLATE)
        .with_item(COPPER_WIRE)
        .with_node(
            Node::new("miner")
                .with_label("Miner")
                .with_kind("miner")
                .with_output(COPPER_ORE, 60.0),
        )
        .with_node(
            Node::new("smelter")
                .with_label("Smelter")
                .with_kind("smelter")
                .with_input(COPPER_ORE, 60.0)
                .with_output(COPPER_PLATE, 60.0),
        )
        .with_node(
            Node::new("wire")
                .with_label("Wire Machine")
                .with_kind("wire_machine")
                .with_input(COPPER_PLATE, 60.0)
                .with_output(COPPER_WIRE, 60.0),
        )
        .with_node(
            Node::new("storage")
                .with_label("Storage")
                .with_kind("storage")
                .with_input(COPPER_WIRE, 60.0),
        )
        .with_edge(link("e1", "miner", "smelter", COPPER_ORE, 60.0))
        .with_edge(link("e2", "smelter", "wire", COPPER_PLATE, rate))
        .with_edge(link("e3", "wire", "storage", COPPER_WIRE, 60.0))
}

/// `chains` independent linear chains of `length` nodes, each stage consuming
/// and producing `rate` of a chain-specific item.
pub fn parallel_chains(chains: usize, length: usize, rate: f64) -> Blueprint {
    let mut bp = Blueprint::new("Parallel Chains");
    for c in 0..chains {
        for i in 0..length {
            let mut node = Node::new(format!("c{c}n{i}"));
            if i > 0 {
                node = node.with_input(format!("c{c}i{}", i - 1), rate);
            }
            if i + 1 < length {
                node = node.with_output(format!("c{c}i{i}"), rate);
            }
            bp = bp.with_node(node);
        }
        for i in 0..length.saturating_sub(1) {
            bp = bp.with_edge(link(
                &format!("c{c}e{i}"),
                &format!("c{c}n{i}"),
                &format!("c{c}n{}", i + 1),
                &format!("c{c}i{i}"),
                rate,
            ));
        }
    }
    bp
}

// ===========================================================================
// Documents
// ===========================================================================

/// Six-stage copper wire line in the JSON document format, including layout
/// and display fields the balance engine does not read.
pub const COPPER_WIRE_DOCUMENT: &str = r#"{
  "meta": { "name": "100% Copper Wire (9:3:1:2:2)", "tick": "per_min" },
  "items": ["raw_copper", "liquid_copper", "copper_ingot", "copper_plate", "copper_wire"],
  "nodes": [
    { "id": "d1", "type": "copper_drill", "label": "Copper Drill", "machines": 9,
      "pos": { "x": 110, "y": 170 }, "inputs": {}, "outputs": { "raw_copper": 60 }, "tier": "base" },
    { "id": "f1", "type": "electric_furnace", "label": "Electric Furnace", "machines": 3,
      "pos": { "x": 520, "y": 170 }, "inputs": { "raw_copper": 60 }, "outputs": { "liquid_copper": 60 }, "tier": "base" },
    { "id": "m1", "type": "ingot_molder", "label": "Ingot Molder", "machines": 1,
      "pos": { "x": 930, "y": 170 }, "inputs": { "liquid_copper": 60 }, "outputs": { "copper_ingot": 30 }, "tier": "base" },
    { "id": "p1", "type": "press", "label": "Press", "machines": 2,
      "pos": { "x": 1340, "y": 170 }, "inputs": { "copper_ingot": 30 }, "outputs": { "copper_plate": 30 }, "tier": "base" },
    { "id": "r1", "type": "roller", "label": "Roller", "machines": 2,
      "pos": { "x": 1750, "y": 170 }, "inputs": { "copper_plate": 30 }, "outputs": { "copper_wire": 180 }, "tier": "base" },
    { "id": "s1", "type": "storage", "label": "Storage", "machines": 1,
      "pos": { "x": 2160, "y": 170 }, "inputs": { "copper_wire": 180 }, "outputs": {}, "tier": "base" }
  ],
  "edges": [
    { "id": "e1", "from": { "node": "d1", "item": "raw_copper" }, "to": { "node": "f1", "item": "raw_copper" }, "rate": 60, "label": "Belt" },
    { "id": "e2", "from": { "node": "f1", "item": "liquid_copper" }, "to": { "node": "m1", "item": "liquid_copper" }, "rate": 60, "label": "Pipe" },
    { "id": "e3", "from": { "node": "m1", "item": "copper_ingot" }, "to": { "node": "p1", "item": "copper_ingot" }, "rate": 30, "label": "Belt" },
    { "id": "e4", "from": { "node": "p1", "item": "copper_plate" }, "to": { "node": "r1", "item": "copper_plate" }, "rate": 30, "label": "Belt" },
    { "id": "e5", "from": { "node": "r1", "item": "copper_wire" }, "to": { "node": "s1", "item": "copper_wire" }, "rate": 180, "label": "Belt" }
  ]
}"#;
