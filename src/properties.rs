//! [crate::properties] contains the node and edge records that make up a
//! [crate::graph::MappingGraph], plus the label spelling rules shared by the builder and the
//! hop-through expander.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
};

/// Pseudo-domain carried by every label node.
pub const LABEL_DOMAIN: &str = "label";

static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("camel-case boundary pattern is valid"));
static SHADOW_SPELLING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-_A-Z]").expect("shadow label pattern is valid"));

/// Semantic kind of a variable. Must agree across every definition site of the same variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Name,
    Date,
    Text,
}

impl FieldType {
    pub fn all() -> &'static [FieldType] {
        &[FieldType::Name, FieldType::Date, FieldType::Text]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Name => "name",
            FieldType::Date => "date",
            FieldType::Text => "text",
        }
    }

    /// Strict parse, used where the schema position only admits the three known kinds.
    pub fn from_kind(kind: &str) -> Option<FieldType> {
        FieldType::all()
            .iter()
            .copied()
            .find(|field_type| field_type.as_str() == kind)
    }

    /// Permissive parse: anything unrecognized (or missing) is plain text.
    pub fn from_kind_lenient(kind: Option<&str>) -> FieldType {
        kind.and_then(FieldType::from_kind).unwrap_or(FieldType::Text)
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stable identity of a graph node: `(domain, name)` for variables, the display text for labels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKey {
    Variable { domain: String, name: String },
    Label(String),
}

impl NodeKey {
    pub fn variable(domain: &str, name: &str) -> NodeKey {
        NodeKey::Variable {
            domain: domain.to_string(),
            name: name.to_string(),
        }
    }

    pub fn label(text: &str) -> NodeKey {
        NodeKey::Label(text.to_string())
    }

    pub fn domain(&self) -> &str {
        match self {
            NodeKey::Variable { domain, .. } => domain,
            NodeKey::Label(_) => LABEL_DOMAIN,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeKey::Variable { name, .. } => name,
            NodeKey::Label(text) => text,
        }
    }
}

impl Display for NodeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.domain(), self.name())
    }
}

/// A typed field or creator role belonging to one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableNode {
    pub domain: String,
    pub name: String,
    pub kind: FieldType,
    /// Clients (sub-schemas) that declare this variable.
    pub attestations: BTreeSet<String>,
}

impl VariableNode {
    pub fn new(domain: &str, name: &str, kind: FieldType) -> VariableNode {
        VariableNode {
            domain: domain.to_string(),
            name: name.to_string(),
            kind,
            attestations: BTreeSet::new(),
        }
    }

    pub fn is_attested_by(&self, client: &str) -> bool {
        self.attestations.contains(client)
    }
}

/// A human readable name grouping one or more variables across domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelNode {
    pub text: String,
}

impl LabelNode {
    pub fn new(text: &str) -> LabelNode {
        LabelNode {
            text: text.to_string(),
        }
    }

    /// Shadow labels preserve a literal field or alias spelling. They take part in the mapping
    /// table but are skipped by hop-through expansion, the docs table and the graph artifact.
    pub fn is_shadow(&self) -> bool {
        is_shadow_spelling(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingNode {
    Variable(VariableNode),
    Label(LabelNode),
}

impl MappingNode {
    pub fn key(&self) -> NodeKey {
        match self {
            MappingNode::Variable(var) => NodeKey::variable(&var.domain, &var.name),
            MappingNode::Label(label) => NodeKey::label(&label.text),
        }
    }

    pub fn domain(&self) -> &str {
        match self {
            MappingNode::Variable(var) => &var.domain,
            MappingNode::Label(_) => LABEL_DOMAIN,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MappingNode::Variable(var) => &var.name,
            MappingNode::Label(label) => &label.text,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableNode> {
        match self {
            MappingNode::Variable(var) => Some(var),
            MappingNode::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&LabelNode> {
        match self {
            MappingNode::Label(label) => Some(label),
            MappingNode::Variable(_) => None,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, MappingNode::Label(_))
    }
}

/// Presentation treatment of an edge, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeStyle {
    Declared,
    Removed,
    Added,
}

/// A directed mapping between two nodes.
///
/// The `removed` flag is a one-way latch: [MappingEdge::mark_removed] sets it and nothing clears
/// it. The event ledger is append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEdge {
    removed: bool,
    added: bool,
    events: Vec<u32>,
}

impl MappingEdge {
    pub fn declared() -> MappingEdge {
        MappingEdge::default()
    }

    pub fn hop_through(event: u32) -> MappingEdge {
        MappingEdge {
            added: true,
            events: vec![event],
            ..Default::default()
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_added(&self) -> bool {
        self.added
    }

    pub fn events(&self) -> &[u32] {
        &self.events
    }

    pub fn mark_removed(&mut self, event: u32) {
        self.removed = true;
        self.record(event);
    }

    pub fn record(&mut self, event: u32) {
        self.events.push(event);
    }

    /// Comma-joined event ledger, as rendered on the edge label.
    pub fn ledger(&self) -> String {
        self.events
            .iter()
            .map(|event| event.to_string())
            .collect::<Vec<String>>()
            .join(",")
    }

    pub fn style(&self) -> EdgeStyle {
        if self.removed {
            EdgeStyle::Removed
        } else if self.added {
            EdgeStyle::Added
        } else {
            EdgeStyle::Declared
        }
    }
}

/// Turn a field spelling into its label form: camel-case, snake_case and kebab-case boundaries
/// become spaces and the result is lowercased.
pub fn make_label(field: &str) -> String {
    let spaced = field.replace(['_', '-'], " ");
    CAMEL_BOUNDARY
        .replace_all(&spaced, "$1 $2")
        .to_lowercase()
}

pub fn is_shadow_spelling(text: &str) -> bool {
    SHADOW_SPELLING.is_match(text)
}
