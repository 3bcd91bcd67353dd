//! package.json view used to select update candidates
//!
//! Only the fields the update run needs are modelled; dependency maps keep
//! their file order so candidates are updated in the order they are declared.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::FileSystemError;

/// Subset of a package.json file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Project version, loosely a dotted numeric triple
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: Map<String, Value>,
    #[serde(default)]
    pub dev_dependencies: Map<String, Value>,
}

impl PackageManifest {
    /// Read and parse the manifest at `path`
    pub fn load(path: &Path) -> Result<Self, FileSystemError> {
        if !path.exists() {
            return Err(FileSystemError::not_found(path));
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| FileSystemError::read(path, e))?;
        Self::parse(&content).map_err(|e| FileSystemError::parse(path, e.to_string()))
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Version string, empty when the manifest has none
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or_default()
    }

    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    pub fn dev_dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dev_dependencies.keys().map(String::as_str)
    }
}
