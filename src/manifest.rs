//! Module descriptor: the static metadata record the host consumes at load time.
//!
//! The descriptor lives in a `module.toml` file at the module root. It
//! declares the module's identity, its dependencies on host-provided modules,
//! the view/menu definition files to register, and client-side asset bundles.
//! It is read once at host startup and never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error::ManifestError;

/// Dotted numeric version string, e.g. `1.0` or `1.0.2.1`.
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+){0,4}$").unwrap());

/// Declarative module descriptor, read once by the host at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Human-readable module name.
    pub name: String,

    /// Dotted numeric module version.
    #[serde(default = "default_version")]
    pub version: String,

    /// One-line summary.
    #[serde(default)]
    pub summary: String,

    /// Longer description.
    #[serde(default)]
    pub description: String,

    /// Module category.
    #[serde(default = "default_category")]
    pub category: String,

    /// Module author.
    #[serde(default)]
    pub author: String,

    /// Author website.
    #[serde(default)]
    pub website: Option<String>,

    /// Modules that must be provided by the host before this one loads.
    #[serde(default)]
    pub depends: Vec<String>,

    /// View and menu definition files, relative to the module root.
    #[serde(default)]
    pub data: Vec<String>,

    /// Client-side asset bundles: bundle name to files relative to the module root.
    #[serde(default)]
    pub assets: BTreeMap<String, Vec<String>>,

    /// Whether the host may install this module at all.
    #[serde(default = "default_true")]
    pub installable: bool,

    /// Whether the module is a top-level application.
    #[serde(default)]
    pub application: bool,

    /// Whether the host installs the module automatically once its
    /// dependencies are present.
    #[serde(default)]
    pub auto_install: bool,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_category() -> String {
    "Uncategorized".to_string()
}

fn default_true() -> bool {
    true
}

impl Manifest {
    /// Parse a descriptor from TOML source.
    pub fn parse(source: &str) -> Result<Self, ManifestError> {
        toml::from_str(source).map_err(|e| ManifestError::Parse(Box::new(e)))
    }

    /// Check the descriptor's declaration-level invariants.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::EmptyName);
        }

        if !VERSION_RE.is_match(self.version.trim()) {
            return Err(ManifestError::InvalidVersion {
                version: self.version.clone(),
            });
        }

        if let Some(website) = &self.website {
            Url::parse(website).map_err(|e| ManifestError::InvalidWebsite {
                website: website.clone(),
                reason: e.to_string(),
            })?;
        }

        let mut seen = BTreeSet::new();
        for dependency in &self.depends {
            let name = dependency.trim();
            if name.is_empty() {
                return Err(ManifestError::EmptyDependency);
            }
            if !seen.insert(name) {
                return Err(ManifestError::DuplicateDependency(name.to_string()));
            }
        }

        for path in &self.data {
            validate_relative_path(path)?;
        }

        for (bundle, files) in &self.assets {
            if bundle.trim().is_empty() {
                return Err(ManifestError::EmptyBundleName);
            }
            if files.is_empty() {
                return Err(ManifestError::EmptyBundle(bundle.clone()));
            }
            for path in files {
                validate_relative_path(path)?;
            }
        }

        Ok(())
    }
}

/// Declared paths must stay inside the module root.
fn validate_relative_path(raw: &str) -> Result<(), ManifestError> {
    if raw.trim().is_empty() {
        return Err(ManifestError::EmptyPath);
    }

    let path = Path::new(raw);
    if path.is_absolute() || raw.split(['/', '\\']).any(|component| component == "..") {
        return Err(ManifestError::NonRelativePath(raw.to_string()));
    }

    Ok(())
}
