//! # Command-Line Interface
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `check` | Node health and system balance, optionally scaled |
//! | `items` | Item ledger only |
//! | `scale` | Write a scaled copy of the document |
//! | `normalize` | Print the document with every default applied |
//!
//! ## Output Formats
//!
//! All commands support `--format` (or `BLUEPRINT_FORMAT`):
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Log events go to stderr. `RUST_LOG` sets the filter; `--verbose` forces
//! `debug`.

mod app;
mod commands;
mod output;
mod render;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
