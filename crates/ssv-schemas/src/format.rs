//! Rule-set document formats
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use crate::error::{RegistryError, RegistryResult};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> RegistryResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(RegistryError::unsupported_format(path)),
        }
    }

    /// Deserialize `content` in this format; `origin` is used in error messages
    pub fn parse<T: DeserializeOwned>(&self, content: &str, origin: &str) -> RegistryResult<T> {
        match self {
            Format::Yaml => serde_yaml::from_str(content).map_err(|source| RegistryError::Yaml {
                origin: origin.to_string(),
                source,
            }),
            Format::Json => serde_json::from_str(content).map_err(|source| RegistryError::Json {
                origin: origin.to_string(),
                source,
            }),
        }
    }
}
