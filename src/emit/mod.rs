//! Projection of the finished graph into the run's artifacts.
//!
//! - [`mapping`]: canonical label -> fields table (JSON)
//! - [`docs`]: documentation table (markdown)
//! - [`gml`]: graph serialization for visualization tooling
//!
//! Every emitter only reads the graph.

pub mod docs;
pub mod gml;
pub mod mapping;

pub use docs::{render_docs, DocsLayout, DocsRow};
pub use gml::render_gml;
pub use mapping::{project_mapping, FieldMapping, LabelMapping};
