use std::{fmt, io};

use pulldown_cmark_to_cmark::Error as CmarkToCmarkError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

use crate::properties::FieldType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum ExtraFieldsError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Documentation rendering error: {0}")]
    Render(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Unknown domain '{0}'")]
    UnknownDomain(String),
    #[error("Variable {node} is already typed '{existing}', refusing to redefine it as '{requested}'")]
    TypeMismatch {
        node: String,
        existing: FieldType,
        requested: FieldType,
    },
    #[error("Unexpected semantic kind '{kind}' for {domain}.{name}")]
    UnexpectedKind {
        domain: String,
        name: String,
        kind: String,
    },
    #[error("Label '{label}' maps to variables of different types ('{first}' and '{second}')")]
    MixedLabelTypes {
        label: String,
        first: FieldType,
        second: FieldType,
    },
    #[error("Name label '{label}' maps to more than one {domain} field: {fields:?}")]
    NameCardinality {
        label: String,
        domain: String,
        fields: Vec<String>,
    },
}

impl ExtraFieldsError {
    /// True for the errors that signal an upstream schema changed shape in a way the mapping
    /// engine refuses to reconcile.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ExtraFieldsError::UnknownDomain(_)
                | ExtraFieldsError::TypeMismatch { .. }
                | ExtraFieldsError::UnexpectedKind { .. }
                | ExtraFieldsError::MixedLabelTypes { .. }
                | ExtraFieldsError::NameCardinality { .. }
        )
    }
}

impl From<toml::de::Error> for ExtraFieldsError {
    fn from(src: toml::de::Error) -> ExtraFieldsError {
        ExtraFieldsError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<JsonError> for ExtraFieldsError {
    fn from(src: JsonError) -> ExtraFieldsError {
        ExtraFieldsError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for ExtraFieldsError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => ExtraFieldsError::NotFound(format!("{x}")),
            _ => ExtraFieldsError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for ExtraFieldsError {
    fn from(x: fmt::Error) -> Self {
        ExtraFieldsError::Render(format!("{x}"))
    }
}

impl From<CmarkToCmarkError> for ExtraFieldsError {
    fn from(x: CmarkToCmarkError) -> Self {
        ExtraFieldsError::Render(format!("{x}"))
    }
}
