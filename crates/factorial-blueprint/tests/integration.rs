//! End-to-end balance scenarios: build or load a blueprint, optionally scale
//! it, and check the report.

use factorial_blueprint::balance::{NodeStatus, compute_balance};
use factorial_blueprint::export::export_scaled;
use factorial_blueprint::loader::load_str;
use factorial_blueprint::scale::apply_scale;
use factorial_blueprint::test_utils::*;

fn assert_approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected ~{expected}, got {actual}"
    );
}

// ===========================================================================
// Copper chain
// ===========================================================================

#[test]
fn nominal_chain_is_balanced() {
    let report = compute_balance(&copper_chain());

    for check in &report.node_checks {
        assert_eq!(check.status(), NodeStatus::Ok, "node {}", check.id);
    }
    for item in [COPPER_ORE, COPPER_PLATE, COPPER_WIRE] {
        let balance = report.item(item).unwrap();
        assert_eq!(balance.produced, 60.0);
        assert_eq!(balance.consumed, 60.0);
        assert_eq!(balance.net, 0.0);
    }
    assert_eq!(report.item_balance.len(), 3);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn short_wire_feed_starves_and_under_routes() {
    let report = compute_balance(&copper_chain_with_wire_feed(40.0));

    let wire = report.node_check("wire").unwrap();
    let row = wire.input(COPPER_PLATE).unwrap();
    assert_eq!(row.need, 60.0);
    assert_eq!(row.got, 40.0);
    assert_approx(row.utilization, 0.667);
    assert!(wire.starving);
    assert_eq!(wire.status(), NodeStatus::Starving);

    let smelter = report.node_check("smelter").unwrap();
    let row = smelter.output(COPPER_PLATE).unwrap();
    assert_eq!(row.prod, 60.0);
    assert_eq!(row.sent, 40.0);
    assert!(smelter.under_routed);
    assert!(!smelter.starving);
    assert_eq!(smelter.status(), NodeStatus::UnderRouted);

    assert_eq!(report.node_check("miner").unwrap().status(), NodeStatus::Ok);
    assert_eq!(report.node_check("storage").unwrap().status(), NodeStatus::Ok);

    // The ledger reports declared rates, so it is unchanged.
    assert_eq!(report.item(COPPER_PLATE).unwrap().net, 0.0);
}

#[test]
fn tripled_chain_keeps_ratios() {
    let base = copper_chain();
    let scaled = apply_scale(&base, 3.0);

    for (a, b) in base.nodes.iter().zip(&scaled.nodes) {
        assert_eq!(b.machines, a.machines * 3.0);
        for (item, rate) in &a.inputs {
            assert_eq!(b.inputs[item], rate * 3.0);
        }
        for (item, rate) in &a.outputs {
            assert_eq!(b.outputs[item], rate * 3.0);
        }
    }
    for (a, b) in base.edges.iter().zip(&scaled.edges) {
        assert_eq!(b.rate, a.rate.map(|r| r * 3.0));
    }

    let before = compute_balance(&base);
    let after = compute_balance(&scaled);
    for (a, b) in before.node_checks.iter().zip(&after.node_checks) {
        assert_eq!(a.status(), b.status());
        for (ra, rb) in a.input_rows.iter().zip(&b.input_rows) {
            assert_eq!(ra.utilization, rb.utilization);
        }
        for (ra, rb) in a.output_rows.iter().zip(&b.output_rows) {
            assert_eq!(ra.utilization, rb.utilization);
        }
    }
    for (a, b) in before.item_balance.iter().zip(&after.item_balance) {
        assert_eq!(b.produced, a.produced * 3.0);
        assert_eq!(b.consumed, a.consumed * 3.0);
        assert_eq!(b.net, a.net * 3.0);
    }
}

#[test]
fn scaling_a_starved_chain_keeps_it_starved() {
    let scaled = apply_scale(&copper_chain_with_wire_feed(40.0), 3.0);
    let report = compute_balance(&scaled);
    let wire = report.node_check("wire").unwrap();
    assert_eq!(wire.input(COPPER_PLATE).unwrap().need, 180.0);
    assert_eq!(wire.input(COPPER_PLATE).unwrap().got, 120.0);
    assert_eq!(wire.status(), NodeStatus::Starving);
}

// ===========================================================================
// Documents
// ===========================================================================

#[test]
fn copper_wire_document_is_balanced() {
    let loaded = load_str(COPPER_WIRE_DOCUMENT).unwrap();
    assert!(loaded.diagnostics.is_empty());
    assert_eq!(loaded.blueprint.meta.name, "100% Copper Wire (9:3:1:2:2)");
    assert_eq!(loaded.blueprint.nodes.len(), 6);

    let report = compute_balance(&loaded.blueprint);
    assert!(report.is_balanced());

    let items: Vec<&str> = report.item_balance.iter().map(|b| b.item.as_str()).collect();
    assert_eq!(
        items,
        [
            "copper_ingot",
            "copper_plate",
            "copper_wire",
            "liquid_copper",
            "raw_copper"
        ]
    );
    let wire = report.item("copper_wire").unwrap();
    assert_eq!((wire.produced, wire.consumed, wire.net), (180.0, 180.0, 0.0));
    assert_eq!(report.node_check("d1").unwrap().machines, 9.0);
}

#[test]
fn scaled_document_export_round_trips() {
    let loaded = load_str(COPPER_WIRE_DOCUMENT).unwrap();
    let out = export_scaled(&loaded.blueprint, 2.0).unwrap();
    assert_eq!(out.file_name, "100_Copper_Wire_9_3_1_2_2__x2.json");

    let reloaded = load_str(&out.contents).unwrap();
    assert_eq!(reloaded.blueprint, apply_scale(&loaded.blueprint, 2.0));
    let node = reloaded.blueprint.node("d1").unwrap();
    assert_eq!(node.machines, 18.0);
    assert_eq!(node.pos.map(|p| p.x), Some(110.0));
    assert!(compute_balance(&reloaded.blueprint).is_balanced());
}

#[test]
fn partial_document_still_balances() {
    let input = r#"{
        "nodes": [
            { "id": "a", "outputs": { "ore": 10 } },
            { "id": "b", "inputs": { "ore": "10" } },
            { "label": "no id", "inputs": { "ore": 99 } }
        ],
        "edges": [
            { "id": "e1", "from": { "node": "a", "item": "ore" }, "to": { "node": "b", "item": "ore" }, "rate": 10 },
            { "id": "e2", "from": { "node": "a" }, "to": { "node": "b", "item": "ore" }, "rate": 50 },
            { "id": "e3", "from": { "node": "a", "item": "ore" }, "to": { "node": "b", "item": "ore" }, "rate": "lots" }
        ]
    }"#;
    let loaded = load_str(input).unwrap();
    assert_eq!(loaded.blueprint.nodes.len(), 2);
    assert_eq!(loaded.diagnostics.len(), 3);

    let report = compute_balance(&loaded.blueprint);
    assert!(report.is_balanced());
    assert_eq!(report.node_check("b").unwrap().input("ore").unwrap().got, 10.0);
    assert_eq!(report.item("ore").unwrap().consumed, 10.0);
}
