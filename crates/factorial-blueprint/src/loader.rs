//! Reading blueprint documents from text and files.
//!
//! Documents are JSON by default. RON and TOML files are accepted too; the
//! format is detected from the file extension. Only syntactically invalid
//! documents are errors here. Semantic gaps become diagnostics in
//! [`Normalized`].

use std::fmt;
use std::path::{Path, PathBuf};

use ron::extensions::Extensions;

use crate::normalize::{Normalized, normalize};
use crate::schema::RawDocument;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a blueprint document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The document is not valid structured data.
    #[error("{format} parse error: {detail}")]
    Parse { format: Format, detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Ron,
    Toml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => f.write_str("JSON"),
            Format::Ron => f.write_str("RON"),
            Format::Toml => f.write_str("TOML"),
        }
    }
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, LoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        _ => Err(LoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Parsing
// ===========================================================================

/// Parse document text without resolving it.
pub fn parse_str(content: &str, format: Format) -> Result<RawDocument, LoadError> {
    let parse_err = |detail: String| LoadError::Parse { format, detail };
    match format {
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        // Optional fields may be written bare rather than as `Some(..)`.
        Format::Ron => ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(content)
            .map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Parse and resolve document text in the given format.
pub fn load_str_as(content: &str, format: Format) -> Result<Normalized, LoadError> {
    let raw = parse_str(content, format)?;
    let normalized = normalize(&raw);
    tracing::debug!(
        name = %normalized.blueprint.meta.name,
        nodes = normalized.blueprint.nodes.len(),
        edges = normalized.blueprint.edges.len(),
        diagnostics = normalized.diagnostics.len(),
        "loaded blueprint"
    );
    Ok(normalized)
}

/// Parse and resolve a JSON document.
pub fn load_str(content: &str) -> Result<Normalized, LoadError> {
    load_str_as(content, Format::Json)
}

/// Read a file and resolve it according to its format (detected from
/// extension).
pub fn load_file(path: &Path) -> Result<Normalized, LoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    load_str_as(&content, format)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::Item;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "factorial_blueprint_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("bp.json")).unwrap(), Format::Json);
        assert_eq!(detect_format(Path::new("bp.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("bp.toml")).unwrap(), Format::Toml);
    }

    #[test]
    fn detect_format_unsupported() {
        let err = detect_format(Path::new("bp.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
        assert!(detect_format(Path::new("blueprint")).is_err());
    }

    // -----------------------------------------------------------------------
    // parsing
    // -----------------------------------------------------------------------

    #[test]
    fn malformed_json_is_an_error() {
        let err = load_str("{ \"nodes\": [").unwrap_err();
        match err {
            LoadError::Parse { format, .. } => assert_eq!(format, Format::Json),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ron_document() {
        let input = r#"(
            meta: (name: "Ron Chain"),
            nodes: [
                (id: "m1", outputs: {"ore": 30}),
                (id: "s1", inputs: {"ore": 30}),
            ],
            edges: [
                (id: "e1", from: (node: "m1", item: "ore"), to: (node: "s1", item: "ore"), rate: 30),
            ],
        )"#;
        let n = load_str_as(input, Format::Ron).unwrap();
        assert_eq!(n.blueprint.meta.name, "Ron Chain");
        assert_eq!(n.blueprint.nodes.len(), 2);
        assert_eq!(n.blueprint.edges[0].rate, Some(30.0));
        assert!(n.diagnostics.is_empty());
    }

    #[test]
    fn toml_document() {
        let input = r#"
            items = ["ore"]

            [meta]
            name = "Toml Chain"
            tick = "per_sec"

            [[nodes]]
            id = "m1"
            outputs = { ore = 2.5 }

            [[edges]]
            id = "e1"
            from = { node = "m1", item = "ore" }
            to = { node = "s1", item = "ore" }
            rate = 2.5
        "#;
        let n = load_str_as(input, Format::Toml).unwrap();
        assert_eq!(n.blueprint.meta.tick, "per_sec");
        assert_eq!(n.blueprint.items, vec![Item::from("ore")]);
        assert_eq!(n.blueprint.nodes[0].outputs[&Item::from("ore")], 2.5);
        assert_eq!(n.blueprint.edges[0].rate, Some(2.5));
    }

    // -----------------------------------------------------------------------
    // load_file
    // -----------------------------------------------------------------------

    #[test]
    fn load_file_json() {
        let dir = make_test_dir("load_json");
        let path = dir.join("chain.json");
        fs::write(
            &path,
            r#"{ "meta": { "name": "File" }, "nodes": [ { "id": "a" } ] }"#,
        )
        .unwrap();

        let n = load_file(&path).unwrap();
        assert_eq!(n.blueprint.meta.name, "File");
        assert_eq!(n.blueprint.nodes.len(), 1);
        cleanup(&dir);
    }

    #[test]
    fn load_file_missing_is_io_error() {
        let dir = make_test_dir("load_missing");
        let err = load_file(&dir.join("nope.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
        cleanup(&dir);
    }
}
