//! Uniform scaling of a blueprint.

use crate::blueprint::{Blueprint, RateMap};

/// Whether `factor` changes anything when passed to [`apply_scale`].
pub fn is_effective_factor(factor: f64) -> bool {
    factor.is_finite() && factor > 0.0 && factor != 1.0
}

/// Return a copy of `blueprint` with every machine count, node rate and edge
/// rate multiplied by `factor`.
///
/// A factor that is not finite, not positive, or exactly 1 returns an equal
/// copy. Edges without a rate stay without one.
pub fn apply_scale(blueprint: &Blueprint, factor: f64) -> Blueprint {
    if !is_effective_factor(factor) {
        return blueprint.clone();
    }
    tracing::trace!(factor, nodes = blueprint.nodes.len(), "scaling blueprint");

    let mut scaled = blueprint.clone();
    for node in &mut scaled.nodes {
        node.machines *= factor;
        scale_rates(&mut node.inputs, factor);
        scale_rates(&mut node.outputs, factor);
    }
    for edge in &mut scaled.edges {
        edge.rate = edge.rate.map(|r| r * factor);
    }
    scaled
}

fn scale_rates(rates: &mut RateMap, factor: f64) {
    for rate in rates.values_mut() {
        *rate *= factor;
    }
}
