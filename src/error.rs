//! Unified error types for the dashboard module host.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the dashboard module host.
#[derive(Error, Debug)]
pub enum ModuleError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Manifest parsing or well-formedness error.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Module registry loading error.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Template registration or rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Descriptor parsing and well-formedness errors.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The descriptor file is not valid TOML or has unknown keys.
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] Box<toml::de::Error>),

    /// The `name` field is empty.
    #[error("manifest name must not be empty")]
    EmptyName,

    /// The `version` field is not a dotted numeric string.
    #[error("invalid version {version:?}: expected a dotted numeric string")]
    InvalidVersion {
        /// The rejected version string.
        version: String,
    },

    /// The `website` field is not a valid URL.
    #[error("invalid website {website:?}: {reason}")]
    InvalidWebsite {
        /// The rejected website string.
        website: String,
        /// Parser failure reason.
        reason: String,
    },

    /// A dependency name is empty.
    #[error("dependency names must not be empty")]
    EmptyDependency,

    /// A dependency is declared more than once.
    #[error("duplicate dependency {0:?}")]
    DuplicateDependency(String),

    /// A data or asset path is empty.
    #[error("declared file paths must not be empty")]
    EmptyPath,

    /// A data or asset path escapes the module root.
    #[error("declared path {0:?} must be relative to the module root")]
    NonRelativePath(String),

    /// An asset bundle has an empty name.
    #[error("asset bundle names must not be empty")]
    EmptyBundleName,

    /// An asset bundle declares no files.
    #[error("asset bundle {0:?} declares no files")]
    EmptyBundle(String),
}

/// Module registry loading errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The configured module root does not exist.
    #[error("module root {0:?} not found")]
    ModuleRootMissing(PathBuf),

    /// The module root path has no usable directory name.
    #[error("module root {0:?} has no usable directory name")]
    InvalidModuleRoot(PathBuf),

    /// The descriptor declares the module as not installable.
    #[error("module {module} is not installable")]
    NotInstallable {
        /// Technical name of the refused module.
        module: String,
    },

    /// A declared dependency is not provided by the host.
    #[error("module {module} depends on {dependency}, which the host does not provide")]
    MissingDependency {
        /// Technical name of the module being loaded.
        module: String,
        /// The unsatisfied dependency.
        dependency: String,
    },

    /// A declared view or menu file could not be read.
    #[error("declared view file {path} is missing: {reason}")]
    ViewFileMissing {
        /// Path relative to the module root.
        path: String,
        /// Read failure reason.
        reason: String,
    },

    /// A declared asset file could not be read.
    #[error("asset {path} in bundle {bundle} is missing: {reason}")]
    AssetFileMissing {
        /// Bundle the asset belongs to.
        bundle: String,
        /// Path relative to the module root.
        path: String,
        /// Read failure reason.
        reason: String,
    },

    /// Two data files would register under the same template name.
    #[error("template {0:?} registered twice")]
    DuplicateTemplate(String),
}

/// Template registration and rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The requested template is not in the view registry.
    #[error("template {0:?} is not registered")]
    TemplateNotFound(String),

    /// A view file failed to compile as a template.
    #[error("template {name:?} failed to compile: {source}")]
    Compile {
        /// Qualified template name.
        name: String,
        /// Underlying compile error.
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// Rendering the template failed.
    #[error("rendering failed: {0}")]
    Render(#[from] Box<handlebars::RenderError>),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ModuleError>;
