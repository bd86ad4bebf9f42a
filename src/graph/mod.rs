//! Graph module: the single mutable mapping graph threaded through every pipeline stage.
//!
//! # Module Organization
//!
//! - [`base`]: [`MappingGraph`] storage, node lookup and the shared event counter
//! - [`builder`]: idempotent variable upserts, cross-domain mappings and label derivation
//! - [`paths`]: shortest-path search that routes around edges a cost function rejects

mod base;
mod builder;
mod paths;

pub use base::{MappingGraph, MappingStableGraph};
pub use paths::{shortest_paths, ShortestPaths};
