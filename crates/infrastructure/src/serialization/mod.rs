//! Deterministic JSON serialization for Warden state files.
//!
//! Keys come out sorted (the store keeps a `BTreeMap`), indented by two
//! spaces and followed by a newline, so a session file diffs cleanly.

mod json;

pub use json::*;
