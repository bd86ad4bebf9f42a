use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use crate::error::ExtraFieldsError;

/// Run configuration, usually read from a TOML file.
///
/// ```toml
/// primary_domain = "zotero"
/// secondary_domain = "csl"
///
/// [[clients]]
/// name = "zotero"
/// schema = "schema/zotero.json"
///
/// [output]
/// mapping = "gen/items/extra-fields.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    pub primary_domain: String,
    pub secondary_domain: String,
    pub clients: Vec<ClientSource>,
    pub deny_list: Vec<DeniedField>,
    pub output: OutputPaths,
    pub palette: Palette,
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig {
            primary_domain: "zotero".to_string(),
            secondary_domain: "csl".to_string(),
            clients: Vec::new(),
            deny_list: DeniedField::defaults(),
            output: OutputPaths::default(),
            palette: Palette::default(),
        }
    }
}

impl MappingConfig {
    /// Read a config file. Relative schema and output paths are resolved against the directory
    /// holding the file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<MappingConfig, ExtraFieldsError> {
        let path = path.as_ref();
        tracing::debug!("Attempting to read mapping config from: {:?}", path);
        let content = read_to_string(path)?;
        let mut config = MappingConfig::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<MappingConfig, ExtraFieldsError> {
        let config: MappingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExtraFieldsError> {
        if self.primary_domain == self.secondary_domain {
            return Err(ExtraFieldsError::Config(format!(
                "primary and secondary domain are both '{}'",
                self.primary_domain
            )));
        }
        for denied in self.deny_list.iter() {
            if !self.domains().contains(&denied.domain.as_str()) {
                return Err(ExtraFieldsError::UnknownDomain(denied.domain.clone()));
            }
        }
        Ok(())
    }

    pub fn domains(&self) -> [&str; 2] {
        [&self.primary_domain, &self.secondary_domain]
    }

    pub fn client_names(&self) -> Vec<String> {
        self.clients.iter().map(|c| c.name.clone()).collect()
    }

    fn resolve_relative(&mut self, base: &Path) {
        for client in self.clients.iter_mut() {
            if client.schema.is_relative() {
                client.schema = base.join(&client.schema);
            }
        }
        self.output.rebase(|path| {
            if path.is_relative() {
                base.join(path)
            } else {
                path.to_path_buf()
            }
        });
    }

    /// Move every configured output file into `dir`, keeping its file name.
    pub fn redirect_output<P: AsRef<Path>>(&mut self, dir: P) {
        let dir = dir.as_ref();
        self.output.rebase(|path| match path.file_name() {
            Some(name) => dir.join(name),
            None => dir.to_path_buf(),
        });
    }
}

/// A client (sub-schema) tag and the schema document it is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSource {
    pub name: String,
    pub schema: PathBuf,
}

/// A long-form text field kept out of mapping analysis.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeniedField {
    pub domain: String,
    pub field: String,
}

impl DeniedField {
    pub fn new(domain: &str, field: &str) -> DeniedField {
        DeniedField {
            domain: domain.to_string(),
            field: field.to_string(),
        }
    }

    pub fn defaults() -> Vec<DeniedField> {
        vec![
            DeniedField::new("zotero", "abstractNote"),
            DeniedField::new("zotero", "extra"),
            DeniedField::new("csl", "abstract"),
            DeniedField::new("csl", "note"),
        ]
    }
}

/// Where each artifact is written. Unset outputs are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputPaths {
    pub mapping: Option<PathBuf>,
    pub docs: Option<PathBuf>,
    pub graph: Option<PathBuf>,
    pub creators: Option<PathBuf>,
    pub fields: Option<PathBuf>,
    pub csl_types: Option<PathBuf>,
}

impl OutputPaths {
    fn rebase<F: Fn(&Path) -> PathBuf>(&mut self, f: F) {
        for slot in [
            &mut self.mapping,
            &mut self.docs,
            &mut self.graph,
            &mut self.creators,
            &mut self.fields,
            &mut self.csl_types,
        ] {
            if let Some(path) = slot.as_mut() {
                *path = f(path);
            }
        }
    }
}

/// Colors used by the graph artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub domains: BTreeMap<String, String>,
    pub label: String,
    pub removed: String,
    pub added: String,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            domains: BTreeMap::from([
                ("zotero".to_string(), "#33cccc".to_string()),
                ("csl".to_string(), "#99CC00".to_string()),
            ]),
            label: "#C0C0C0".to_string(),
            removed: "#666666".to_string(),
            added: "#0000FF".to_string(),
        }
    }
}

impl Palette {
    pub fn domain(&self, domain: &str) -> &str {
        self.domains
            .get(domain)
            .map(String::as_str)
            .unwrap_or(&self.label)
    }
}
