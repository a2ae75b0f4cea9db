//! Command implementations

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use factorial_blueprint::balance::{ItemBalance, NodeCheck, NodeStatus, compute_balance};
use factorial_blueprint::blueprint::Blueprint;
use factorial_blueprint::diagnostics::Diagnostic;
use factorial_blueprint::export::{export_scaled, to_json_pretty};
use factorial_blueprint::loader::load_file;
use factorial_blueprint::normalize::Normalized;
use factorial_blueprint::query::node_matches;
use factorial_blueprint::scale::{apply_scale, is_effective_factor};

use super::output::Output;
use super::render::{CheckText, LedgerText};

fn load(file: &Path) -> Result<Normalized> {
    load_file(file).with_context(|| format!("failed to load {}", file.display()))
}

/// Normalization findings followed by the balance findings they do not
/// already cover. Each normalization entry covers at most one balance entry,
/// so two edges sharing an id are still reported twice.
fn merge_diagnostics(normalized: &[Diagnostic], balance: &[Diagnostic]) -> Vec<Diagnostic> {
    let mut covered = vec![false; normalized.len()];
    let mut merged = normalized.to_vec();
    for diagnostic in balance {
        let repeat = normalized
            .iter()
            .zip(covered.iter_mut())
            .find(|(seen, used)| !**used && *seen == diagnostic);
        match repeat {
            Some((_, used)) => *used = true,
            None => merged.push(diagnostic.clone()),
        }
    }
    merged
}

fn scaled(blueprint: &Blueprint, scale: f64) -> Blueprint {
    if scale != 1.0 && !is_effective_factor(scale) {
        tracing::warn!(scale, "ignoring scale factor that is not a finite positive number");
    }
    apply_scale(blueprint, scale)
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct NodeJson<'a> {
    status: NodeStatus,
    #[serde(flatten)]
    check: &'a NodeCheck,
}

#[derive(Serialize)]
struct CheckJson<'a> {
    name: &'a str,
    tick: &'a str,
    scale: f64,
    balanced: bool,
    nodes: Vec<NodeJson<'a>>,
    items: &'a [ItemBalance],
    diagnostics: &'a [Diagnostic],
}

pub fn check(
    output: &Output,
    file: &Path,
    scale: f64,
    search: Option<&str>,
    strict: bool,
) -> Result<()> {
    let loaded = load(file)?;
    let blueprint = scaled(&loaded.blueprint, scale);
    let report = compute_balance(&blueprint);
    let diagnostics = merge_diagnostics(&loaded.diagnostics, &report.diagnostics);

    // Checks are produced in node order, one per node.
    let checks: Vec<&NodeCheck> = blueprint
        .nodes
        .iter()
        .zip(&report.node_checks)
        .filter(|(node, _)| search.is_none_or(|q| node_matches(node, q)))
        .map(|(_, check)| check)
        .collect();

    if output.is_json() {
        output.data(&CheckJson {
            name: &blueprint.meta.name,
            tick: &blueprint.meta.tick,
            scale,
            balanced: report.is_balanced(),
            nodes: checks
                .iter()
                .map(|check| NodeJson {
                    status: check.status(),
                    check,
                })
                .collect(),
            items: &report.item_balance,
            diagnostics: &diagnostics,
        })?;
    } else {
        output.text(
            &CheckText {
                blueprint: &blueprint,
                scale,
                report: &report,
                checks: &checks,
                diagnostics: &diagnostics,
            }
            .to_string(),
        );
    }

    if strict {
        let unhealthy = report.node_checks.len() - report.count(NodeStatus::Ok);
        if unhealthy > 0 {
            bail!("{unhealthy} node(s) are not balanced");
        }
        if !diagnostics.is_empty() {
            bail!("{} entries were ignored", diagnostics.len());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// items
// ---------------------------------------------------------------------------

pub fn items(output: &Output, file: &Path, scale: f64) -> Result<()> {
    let loaded = load(file)?;
    let report = compute_balance(&scaled(&loaded.blueprint, scale));
    if output.is_json() {
        output.data(&report.item_balance)?;
    } else {
        output.text(&LedgerText(&report.item_balance).to_string());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// scale
// ---------------------------------------------------------------------------

pub fn scale(
    output: &Output,
    file: &Path,
    factor: f64,
    path: Option<&Path>,
    stdout: bool,
) -> Result<()> {
    if !factor.is_finite() || factor <= 0.0 {
        bail!("scale factor must be a finite positive number, got {factor}");
    }
    let loaded = load(file)?;
    for diagnostic in &loaded.diagnostics {
        tracing::warn!("{diagnostic}");
    }

    let export = export_scaled(&loaded.blueprint, factor)?;
    if stdout {
        println!("{}", export.contents);
        return Ok(());
    }

    let target = match path {
        Some(path) => path.to_path_buf(),
        None => file.with_file_name(&export.file_name),
    };
    std::fs::write(&target, format!("{}\n", export.contents))
        .with_context(|| format!("failed to write {}", target.display()))?;
    tracing::debug!(path = %target.display(), factor, "wrote scaled blueprint");
    output.success(&format!("Wrote {}", target.display()));
    Ok(())
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct NormalizeJson<'a> {
    blueprint: &'a Blueprint,
    diagnostics: &'a [Diagnostic],
}

pub fn normalize(output: &Output, file: &Path) -> Result<()> {
    let loaded = load(file)?;
    if output.is_json() {
        output.data(&NormalizeJson {
            blueprint: &loaded.blueprint,
            diagnostics: &loaded.diagnostics,
        })?;
    } else {
        for diagnostic in &loaded.diagnostics {
            tracing::warn!("{diagnostic}");
        }
        println!("{}", to_json_pretty(&loaded.blueprint)?);
    }
    Ok(())
}
