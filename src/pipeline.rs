//! One mapping run: load every client schema into a shared graph, then prune, resolve, expand and
//! project it into the run's artifacts.
use std::{fs, path::Path};

use crate::{
    catalog::SchemaCatalog,
    config::{MappingConfig, OutputPaths},
    emit::{project_mapping, render_docs, render_gml, DocsLayout, FieldMapping},
    error::ExtraFieldsError,
    expand::{expand_hop_through, ExpandReport},
    graph::MappingGraph,
    loader::{load_schema, DomainPair, LoadSummary},
    resolve::{prune_denied, prune_orphan_labels, resolve_conflicts, ResolveReport},
    schema::SchemaDocument,
};

/// Accumulates client schemas. [MappingPipeline::finish] consumes it, so a graph is transformed
/// exactly once.
#[derive(Debug)]
pub struct MappingPipeline {
    config: MappingConfig,
    domains: DomainPair,
    graph: MappingGraph,
    loaded: Vec<String>,
}

/// Everything a finished run produces.
#[derive(Debug)]
pub struct MappingArtifacts {
    pub mapping: FieldMapping,
    pub docs: String,
    pub gml: String,
    pub graph: MappingGraph,
    pub resolved: ResolveReport,
    pub expanded: ExpandReport,
}

impl MappingPipeline {
    pub fn new(config: &MappingConfig) -> Result<MappingPipeline, ExtraFieldsError> {
        config.validate()?;
        Ok(MappingPipeline {
            config: config.clone(),
            domains: DomainPair::new(&config.primary_domain, &config.secondary_domain),
            graph: MappingGraph::new(config.domains()),
            loaded: Vec::new(),
        })
    }

    pub fn load(
        &mut self,
        schema: &SchemaDocument,
        client: &str,
    ) -> Result<LoadSummary, ExtraFieldsError> {
        let summary = load_schema(&mut self.graph, schema, client, &self.domains)?;
        if !self.loaded.iter().any(|c| c == client) {
            self.loaded.push(client.to_string());
        }
        Ok(summary)
    }

    pub fn graph(&self) -> &MappingGraph {
        &self.graph
    }

    /// Clients in load order.
    pub fn clients(&self) -> &[String] {
        &self.loaded
    }

    pub fn finish(mut self) -> Result<MappingArtifacts, ExtraFieldsError> {
        prune_denied(&mut self.graph, &self.config.deny_list);
        let resolved = resolve_conflicts(&mut self.graph);
        let expanded = expand_hop_through(&mut self.graph);
        prune_orphan_labels(&mut self.graph);

        let mapping = project_mapping(&self.graph)?;
        let layout = DocsLayout::new(
            &self.config.primary_domain,
            &self.config.secondary_domain,
            &self.loaded,
        );
        let docs = render_docs(&self.graph, &layout)?;
        let gml = render_gml(&self.graph, &self.config.palette)?;

        tracing::info!(
            "Mapping run finished: {} labels, {} conflicts, {} hop-through edges",
            mapping.len(),
            resolved.conflicts.len(),
            expanded.added.len()
        );
        Ok(MappingArtifacts {
            mapping,
            docs,
            gml,
            graph: self.graph,
            resolved,
            expanded,
        })
    }
}

impl MappingArtifacts {
    /// Write the mapping, docs and graph artifacts to whichever outputs are configured.
    pub fn write_to(&self, output: &OutputPaths) -> Result<(), ExtraFieldsError> {
        if let Some(path) = output.mapping.as_ref() {
            write_artifact(path, &self.mapping.to_json_string()?)?;
        }
        if let Some(path) = output.docs.as_ref() {
            write_artifact(path, &self.docs)?;
        }
        if let Some(path) = output.graph.as_ref() {
            write_artifact(path, &self.gml)?;
        }
        Ok(())
    }
}

impl SchemaCatalog {
    pub fn write_to(&self, output: &OutputPaths) -> Result<(), ExtraFieldsError> {
        if let Some(path) = output.creators.as_ref() {
            write_artifact(path, &self.creators_json()?)?;
        }
        if let Some(path) = output.fields.as_ref() {
            write_artifact(path, &self.fields_json()?)?;
        }
        if let Some(path) = output.csl_types.as_ref() {
            write_artifact(path, &self.csl_types_json()?)?;
        }
        Ok(())
    }
}

fn write_artifact(path: &Path, content: &str) -> Result<(), ExtraFieldsError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, content)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Read every configured client schema, in configured order.
pub fn read_client_schemas(
    config: &MappingConfig,
) -> Result<Vec<(String, SchemaDocument)>, ExtraFieldsError> {
    config
        .clients
        .iter()
        .map(|client| {
            tracing::debug!("Reading {} schema from {:?}", client.name, client.schema);
            Ok((client.name.clone(), SchemaDocument::from_path(&client.schema)?))
        })
        .collect()
}

/// Full run over already-read schemas: build the graph artifacts and the schema catalogs.
pub fn run(
    config: &MappingConfig,
    schemas: &[(String, SchemaDocument)],
) -> Result<(MappingArtifacts, SchemaCatalog), ExtraFieldsError> {
    let mut pipeline = MappingPipeline::new(config)?;
    for (client, schema) in schemas {
        pipeline.load(schema, client)?;
    }
    let artifacts = pipeline.finish()?;
    Ok((artifacts, SchemaCatalog::extract(schemas)))
}
