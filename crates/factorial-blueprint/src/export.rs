//! Writing blueprints back out as documents.

use crate::blueprint::Blueprint;
use crate::scale::apply_scale;

/// Fallback file stem when a blueprint name sanitizes to nothing.
const DEFAULT_STEM: &str = "blueprint";

/// A document ready to be written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub file_name: String,
    pub contents: String,
}

/// Serialize a blueprint to the document schema, pretty-printed.
pub fn to_json_pretty(blueprint: &Blueprint) -> serde_json::Result<String> {
    serde_json::to_string_pretty(blueprint)
}

/// File name for a blueprint download.
///
/// Every run of characters outside `[A-Za-z0-9_-]` becomes one `_`. With a
/// factor the stem gets an `_x{factor}` suffix.
pub fn export_file_name(name: &str, factor: Option<f64>) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            stem.push(c);
            in_run = false;
        } else if !in_run {
            stem.push('_');
            in_run = true;
        }
    }
    if name.is_empty() {
        stem.push_str(DEFAULT_STEM);
    }
    match factor {
        Some(factor) => format!("{stem}_x{factor}.json"),
        None => format!("{stem}.json"),
    }
}

/// The blueprint as-is.
pub fn export(blueprint: &Blueprint) -> serde_json::Result<Export> {
    Ok(Export {
        file_name: export_file_name(&blueprint.meta.name, None),
        contents: to_json_pretty(blueprint)?,
    })
}

/// The blueprint scaled by `factor`. The name always carries the factor, even
/// when scaling is a no-op.
pub fn export_scaled(blueprint: &Blueprint, factor: f64) -> serde_json::Result<Export> {
    let scaled = apply_scale(blueprint, factor);
    Ok(Export {
        file_name: export_file_name(&blueprint.meta.name, Some(factor)),
        contents: to_json_pretty(&scaled)?,
    })
}
