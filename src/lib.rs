//! # extra-fields
//!
//! Builds a canonical field-mapping table between two bibliographic field vocabularies (by default
//! the Zotero item schema and CSL variables) from one or more client schema documents.
//!
//! ## Overview
//!
//! Every field of either vocabulary becomes a *variable* node in a directed graph. Declared
//! cross-domain mappings become edges between variables, and human-readable *labels* (normalized
//! field names, base-field aliases, CSL aliases) point at the variables they denote. A run then:
//!
//! 1. prunes long-form text fields that must never take part in mapping analysis,
//! 2. marks every same-domain fan-in into one node as a conflict (edges are kept for audit but
//!    excluded from routing),
//! 3. adds *hop-through* edges so a label reaches the far-side variable of the field it names,
//! 4. projects every label into `{label: {type, domain: [fields]}}`.
//!
//! Alongside the mapping table the run renders a markdown documentation table and a GML graph
//! for offline inspection, and catalogs creator roles, per-item-type field validity, base-field
//! aliases and CSL types directly from the schemas.
//!
//! ## Architecture
//!
//! - **[`graph`]**: the mapping graph, node/edge construction and shortest paths
//! - **[`properties`]**: node, edge and field-type definitions, label normalization
//! - **[`schema`]**: the schema document model
//! - **[`loader`]**: schema document -> graph
//! - **[`resolve`]**: deny-list pruning and conflict resolution
//! - **[`expand`]**: hop-through expansion
//! - **[`emit`]**: mapping table, documentation table and GML projection
//! - **[`catalog`]**: graph-free catalogs extracted from the schemas
//! - **[`pipeline`]**: one end-to-end run
//! - **[`config`]**: TOML run configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use extra_fields::{config::MappingConfig, pipeline::{read_client_schemas, run}};
//!
//! fn main() -> Result<(), extra_fields::ExtraFieldsError> {
//!     let config = MappingConfig::from_path("extra-fields.toml")?;
//!     let schemas = read_client_schemas(&config)?;
//!     let (artifacts, catalog) = run(&config, &schemas)?;
//!     artifacts.write_to(&config.output)?;
//!     catalog.write_to(&config.output)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Determinism
//!
//! Nodes are visited in key order, edges in insertion order and every projected list is sorted,
//! so the same schemas always yield byte-identical artifacts.

pub mod catalog;
pub mod config;
pub mod emit;
pub mod error;
pub mod expand;
pub mod graph;
pub mod loader;
pub mod pipeline;
pub mod properties;
pub mod resolve;
pub mod schema;
#[cfg(test)]
mod tests;

pub use error::*;
