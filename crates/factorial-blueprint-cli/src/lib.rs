//! Command-line front end for `factorial-blueprint`.

pub mod cli;
