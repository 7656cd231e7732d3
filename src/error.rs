use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by an entity store or by validation in front of it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to load {kind} records: {reason}")]
    Load { kind: &'static str, reason: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    #[error("invalid {kind}: {errors}")]
    Validation {
        kind: &'static str,
        errors: ValidationErrors,
    },

    #[error("failed to {action} {kind}: {reason}")]
    Mutation {
        kind: &'static str,
        action: &'static str,
        reason: String,
    },
}

impl StoreError {
    pub fn load(kind: &'static str, reason: impl fmt::Display) -> Self {
        StoreError::Load {
            kind,
            reason: reason.to_string(),
        }
    }

    pub fn mutation(kind: &'static str, action: &'static str, reason: impl fmt::Display) -> Self {
        StoreError::Mutation {
            kind,
            action,
            reason: reason.to_string(),
        }
    }

    /// Short name of the error class, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Load { .. } => "LoadError",
            StoreError::NotFound { .. } => "NotFoundError",
            StoreError::Validation { .. } => "ValidationError",
            StoreError::Mutation { .. } => "MutationError",
        }
    }
}

/// Per-field messages collected while validating a form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(name, msg)| (*name, msg.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.fields.iter().map(|(_, m)| m.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("invalid value for '{key}': {value}")]
    Invalid { key: &'static str, value: String },

    #[error("remote backend selected but {0} is not set")]
    MissingRemote(&'static str),
}
