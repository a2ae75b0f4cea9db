//! Factorial Blueprint -- steady-state flow balance for factory blueprints.
//!
//! A blueprint is a production graph: nodes declare per-item input and output
//! rates, and rated edges bind one node's output port to another node's input
//! port. This crate loads blueprint documents, scales them, and reports
//! whether the declared rates are actually routed.
//!
//! # Pipeline
//!
//! 1. **Load** -- [`loader`] parses JSON (or RON/TOML) into the lenient
//!    [`schema`] structs.
//! 2. **Normalize** -- [`normalize`](mod@normalize) applies defaults and drops unusable
//!    entries, producing a [`blueprint::Blueprint`] plus diagnostics.
//! 3. **Scale** (optional) -- [`scale::apply_scale`] multiplies every machine
//!    count and rate by a uniform factor.
//! 4. **Balance** -- [`balance::compute_balance`] produces per-node checks and
//!    the global item ledger.
//!
//! ```rust,ignore
//! let loaded = factorial_blueprint::load_file(Path::new("chain.json"))?;
//! let scaled = apply_scale(&loaded.blueprint, 3.0);
//! let report = compute_balance(&scaled);
//! for check in &report.node_checks {
//!     println!("{} {}", check.label, check.status());
//! }
//! ```
//!
//! Every step after loading is infallible. Malformed entries are ignored and
//! listed as [`diagnostics::Diagnostic`]s instead.

pub mod balance;
pub mod blueprint;
pub mod diagnostics;
pub mod export;
pub mod id;
pub mod loader;
pub mod normalize;
pub mod query;
pub mod scale;
pub mod schema;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use balance::{
    BalanceConfig, BalanceReport, ItemBalance, NodeCheck, NodeStatus, compute_balance,
    compute_balance_with,
};
pub use blueprint::{Blueprint, Edge, Node, PortRef};
pub use diagnostics::Diagnostic;
pub use loader::{Format, LoadError, load_file, load_str};
pub use normalize::{Normalized, normalize};
pub use scale::apply_scale;
