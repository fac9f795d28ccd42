//! Codemod manifests and the registry of named codemod factories.
//!
//! A codemod "file" is a small TOML manifest:
//!
//! ```toml
//! codemod = "rename-function"
//! description = "rename the first declared function"
//!
//! [options]
//! to = "bootstrap"
//! ```
//!
//! `codemod` names an entry in a [`CodemodRegistry`]; the `[options]` table is
//! handed to that entry's factory through [`CodemodInit`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use codeshift_core::error::{ShiftError, ShiftResult};
use codeshift_core::tracer::Tracer;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::codemod::Codemod;
use crate::codemods;

// ============================================================================
// Manifest
// ============================================================================

/// Parsed contents of a codemod manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodemodManifest {
    /// Registry name of the codemod to build.
    pub codemod: String,
    /// Free-form description, shown in diagnostics only.
    #[serde(default)]
    pub description: Option<String>,
    /// Options passed to the factory.
    #[serde(default)]
    pub options: toml::Table,
}

impl CodemodManifest {
    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let manifest: CodemodManifest = toml::from_str(text)?;
        if manifest.codemod.trim().is_empty() {
            return Err(ManifestError::EmptyName);
        }
        Ok(manifest)
    }
}

/// Why a manifest could not be turned into a codemod.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("manifest names no codemod")]
    EmptyName,

    #[error("unknown codemod `{name}` (registered: {registered})")]
    UnknownCodemod { name: String, registered: String },

    #[error("cannot construct codemod `{name}`: {source:#}")]
    Construction {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

// ============================================================================
// Factories
// ============================================================================

/// Everything a factory gets to build one codemod instance.
pub struct CodemodInit<'a> {
    /// The pipeline's tracer, for codemods that report on their own.
    pub tracer: Arc<dyn Tracer>,
    /// The manifest's `[options]` table.
    pub options: &'a toml::Table,
}

impl CodemodInit<'_> {
    /// A string option, if present.
    ///
    /// A present option of another type is an error.
    pub fn string_option(&self, key: &str) -> anyhow::Result<Option<String>> {
        match self.options.get(key) {
            None => Ok(None),
            Some(toml::Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => anyhow::bail!(
                "option `{key}` must be a string, found {}",
                other.type_str()
            ),
        }
    }

    /// A string option that must be present.
    pub fn required_string(&self, key: &str) -> anyhow::Result<String> {
        self.string_option(key)?
            .ok_or_else(|| anyhow::anyhow!("missing required option `{key}`"))
    }
}

/// Builds a fresh codemod instance.
pub type CodemodFactory =
    Box<dyn Fn(CodemodInit<'_>) -> anyhow::Result<Box<dyn Codemod>> + Send + Sync>;

// ============================================================================
// Registry
// ============================================================================

/// Named codemod factories.
#[derive(Default)]
pub struct CodemodRegistry {
    factories: BTreeMap<String, CodemodFactory>,
}

impl CodemodRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in codemods.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        codemods::register_builtin(&mut registry);
        registry
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(CodemodInit<'_>) -> anyhow::Result<Box<dyn Codemod>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn get(&self, name: &str) -> Option<&CodemodFactory> {
        self.factories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the codemod a manifest names.
    pub fn build(
        &self,
        manifest: &CodemodManifest,
        tracer: Arc<dyn Tracer>,
    ) -> Result<Box<dyn Codemod>, ManifestError> {
        let factory = self
            .get(&manifest.codemod)
            .ok_or_else(|| ManifestError::UnknownCodemod {
                name: manifest.codemod.clone(),
                registered: self.names().join(", "),
            })?;
        factory(CodemodInit {
            tracer,
            options: &manifest.options,
        })
        .map_err(|source| ManifestError::Construction {
            name: manifest.codemod.clone(),
            source,
        })
    }

    /// Read the manifest at `path` and build its codemod.
    ///
    /// Returns the registry name along with the instance.
    pub fn load(
        &self,
        path: &Path,
        tracer: Arc<dyn Tracer>,
    ) -> ShiftResult<(String, Box<dyn Codemod>)> {
        if !path.exists() {
            return Err(ShiftError::CodemodNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ShiftError::corrupt_codemod(path, "not a file"));
        }
        let text = fs::read_to_string(path).map_err(|e| ShiftError::io(path, e))?;
        let manifest = CodemodManifest::parse(&text)
            .map_err(|e| ShiftError::corrupt_codemod(path, e.to_string()))?;
        debug!(
            path = %path.display(),
            codemod = %manifest.codemod,
            options = manifest.options.len(),
            "evaluated codemod manifest"
        );
        let codemod = self
            .build(&manifest, tracer)
            .map_err(|e| ShiftError::corrupt_codemod(path, e.to_string()))?;
        Ok((manifest.codemod, codemod))
    }
}

impl fmt::Debug for CodemodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodemodRegistry")
            .field("names", &self.names())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
