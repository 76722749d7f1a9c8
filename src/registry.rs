//! Host-side module registry, populated once from the descriptor at startup.
//!
//! Loading a module reads its `module.toml`, validates it, checks the
//! declared dependencies against the host-provided module set, registers
//! every data file as a named template, and pulls the declared asset bundles
//! into memory. The registry is immutable after load; request handling only
//! reads from it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{RegistryError, Result};
use crate::manifest::Manifest;
use crate::render::TemplateStore;

/// Name of the descriptor file inside the module root.
pub const MANIFEST_FILE: &str = "module.toml";

/// A view definition registered from a manifest data file.
#[derive(Debug, Clone)]
pub struct ViewEntry {
    /// Qualified template name (`<technical_name>.<stem>`).
    pub template: String,
    /// Path relative to the module root.
    pub path: String,
    /// Whether the file declares a menu.
    pub menu: bool,
}

/// An in-memory client-side asset.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Bundle the asset belongs to.
    pub bundle: String,
    /// File contents.
    pub body: Vec<u8>,
    /// Content type matched from the file extension.
    pub content_type: &'static str,
}

/// Module registry: descriptor metadata plus registered views and assets.
#[derive(Debug)]
pub struct ModuleRegistry {
    manifest: Manifest,
    technical_name: String,
    views: Vec<ViewEntry>,
    assets: BTreeMap<String, Asset>,
    loaded_at: OffsetDateTime,
}

impl ModuleRegistry {
    /// Load the module at the configured root, registering its views into
    /// `templates`.
    pub fn load(config: &Config, templates: &mut TemplateStore) -> Result<Self> {
        let root = PathBuf::from(&config.module_root);
        if !root.is_dir() {
            return Err(RegistryError::ModuleRootMissing(root).into());
        }

        let technical_name = technical_name(&root)?;

        let source = fs::read_to_string(root.join(MANIFEST_FILE))?;
        let manifest = Manifest::parse(&source)?;
        manifest.validate()?;

        if !manifest.installable {
            return Err(RegistryError::NotInstallable {
                module: technical_name,
            }
            .into());
        }

        for dependency in &manifest.depends {
            if !config.host_modules.iter().any(|m| m == dependency) {
                return Err(RegistryError::MissingDependency {
                    module: technical_name.clone(),
                    dependency: dependency.clone(),
                }
                .into());
            }
        }

        let mut views = Vec::with_capacity(manifest.data.len());
        for rel in &manifest.data {
            let source =
                fs::read_to_string(root.join(rel)).map_err(|e| RegistryError::ViewFileMissing {
                    path: rel.clone(),
                    reason: e.to_string(),
                })?;

            let stem = file_stem(rel);
            let template = format!("{technical_name}.{stem}");
            if templates.has(&template) {
                return Err(RegistryError::DuplicateTemplate(template).into());
            }
            templates.register(&template, &source)?;

            let menu = stem == "menu" || stem.ends_with("_menu");
            debug!(template = template.as_str(), path = rel.as_str(), menu, "registered view");
            views.push(ViewEntry {
                template,
                path: rel.clone(),
                menu,
            });
        }

        let mut assets = BTreeMap::new();
        for (bundle, files) in &manifest.assets {
            for rel in files {
                let body = fs::read(root.join(rel)).map_err(|e| RegistryError::AssetFileMissing {
                    bundle: bundle.clone(),
                    path: rel.clone(),
                    reason: e.to_string(),
                })?;

                debug!(bundle = bundle.as_str(), path = rel.as_str(), "registered asset");
                assets.insert(
                    rel.clone(),
                    Asset {
                        bundle: bundle.clone(),
                        body,
                        content_type: content_type_for(rel),
                    },
                );
            }
        }

        info!(
            module = technical_name.as_str(),
            views = views.len(),
            assets = assets.len(),
            "module registered"
        );

        Ok(Self {
            manifest,
            technical_name,
            views,
            assets,
            loaded_at: OffsetDateTime::now_utc(),
        })
    }

    /// The loaded descriptor.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Technical module name, derived from the module root directory name.
    pub fn technical_name(&self) -> &str {
        &self.technical_name
    }

    /// Registered view entries, in declaration order.
    pub fn views(&self) -> &[ViewEntry] {
        &self.views
    }

    /// Registered menu entries.
    pub fn menus(&self) -> impl Iterator<Item = &ViewEntry> {
        self.views.iter().filter(|v| v.menu)
    }

    /// Look up a declared asset by its module-root-relative path.
    pub fn asset(&self, path: &str) -> Option<&Asset> {
        self.assets.get(path)
    }

    /// Number of registered assets.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// When the registry was populated.
    pub fn loaded_at(&self) -> OffsetDateTime {
        self.loaded_at
    }
}

fn technical_name(root: &Path) -> std::result::Result<String, RegistryError> {
    root.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| RegistryError::InvalidModuleRoot(root.to_path_buf()))
}

fn file_stem(rel: &str) -> String {
    Path::new(rel)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(rel)
        .to_string()
}

/// Content type for a declared asset, matched from the file extension.
fn content_type_for(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("html") => "text/html; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleError;
    use std::path::Path;

    const MANIFEST: &str = r#"
name = "Magento Cegid Dashboard"
version = "1.0"
summary = "Dashboard for Magento and Cegid integration"
category = "Tools"
depends = ["base", "web"]
data = ["views/index.html", "views/menu.html"]
application = true

[assets]
"web.assets_backend" = ["static/src/js/dsist_integration.js"]
"#;

    fn write_module(dir: &Path, manifest: &str) -> PathBuf {
        let root = dir.join("magento_cegid_dashboard");
        fs::create_dir_all(root.join("views")).unwrap();
        fs::create_dir_all(root.join("static/src/js")).unwrap();
        fs::write(root.join(MANIFEST_FILE), manifest).unwrap();
        fs::write(root.join("views/index.html"), "<main>dashboard</main>").unwrap();
        fs::write(root.join("views/menu.html"), "<nav>menu</nav>").unwrap();
        fs::write(
            root.join("static/src/js/dsist_integration.js"),
            "console.log(\"dashboard\");\n",
        )
        .unwrap();
        root
    }

    fn config_for(root: &Path) -> Config {
        Config {
            module_root: root.to_str().unwrap().to_string(),
            host_modules: vec!["base".to_string(), "web".to_string()],
            port: 8080,
            rust_log: "info".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn loads_module_and_registers_views() {
        let dir = tempfile::tempdir().unwrap();
        let root = write_module(dir.path(), MANIFEST);
        let config = config_for(&root);
        let mut templates = TemplateStore::new();

        let registry = ModuleRegistry::load(&config, &mut templates).unwrap();

        assert_eq!(registry.technical_name(), "magento_cegid_dashboard");
        assert_eq!(registry.manifest().name, "Magento Cegid Dashboard");
        assert_eq!(registry.views().len(), 2);
        assert_eq!(registry.menus().count(), 1);
        assert_eq!(registry.asset_count(), 1);
        assert!(templates.has("magento_cegid_dashboard.index"));
        assert!(templates.has("magento_cegid_dashboard.menu"));
    }

    #[test]
    fn registered_views_render_with_empty_context() {
        let dir = tempfile::tempdir().unwrap();
        let root = write_module(dir.path(), MANIFEST);
        let config = config_for(&root);
        let mut templates = TemplateStore::new();

        ModuleRegistry::load(&config, &mut templates).unwrap();

        let index = templates
            .render_empty("magento_cegid_dashboard.index")
            .unwrap();
        let menu = templates
            .render_empty("magento_cegid_dashboard.menu")
            .unwrap();

        assert_eq!(index, "<main>dashboard</main>");
        assert_eq!(menu, "<nav>menu</nav>");
    }

    #[test]
    fn asset_is_loaded_with_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let root = write_module(dir.path(), MANIFEST);
        let config = config_for(&root);
        let mut templates = TemplateStore::new();

        let registry = ModuleRegistry::load(&config, &mut templates).unwrap();
        let asset = registry.asset("static/src/js/dsist_integration.js").unwrap();

        assert_eq!(asset.bundle, "web.assets_backend");
        assert_eq!(asset.content_type, "text/javascript");
        assert_eq!(asset.body, b"console.log(\"dashboard\");\n");
    }

    #[test]
    fn rejects_missing_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let root = write_module(dir.path(), MANIFEST);
        let mut config = config_for(&root);
        config.host_modules = vec!["base".to_string()];
        let mut templates = TemplateStore::new();

        let result = ModuleRegistry::load(&config, &mut templates);

        assert!(matches!(
            result,
            Err(ModuleError::Registry(RegistryError::MissingDependency { dependency, .. }))
                if dependency == "web"
        ));
    }

    #[test]
    fn rejects_non_installable_module() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = "name = \"M\"\ninstallable = false\n";
        let root = write_module(dir.path(), manifest);
        let config = config_for(&root);
        let mut templates = TemplateStore::new();

        let result = ModuleRegistry::load(&config, &mut templates);

        assert!(matches!(
            result,
            Err(ModuleError::Registry(RegistryError::NotInstallable { .. }))
        ));
    }

    #[test]
    fn rejects_missing_view_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = write_module(dir.path(), MANIFEST);
        fs::remove_file(root.join("views/menu.html")).unwrap();
        let config = config_for(&root);
        let mut templates = TemplateStore::new();

        let result = ModuleRegistry::load(&config, &mut templates);

        assert!(matches!(
            result,
            Err(ModuleError::Registry(RegistryError::ViewFileMissing { path, .. }))
                if path == "views/menu.html"
        ));
    }

    #[test]
    fn rejects_missing_asset_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = write_module(dir.path(), MANIFEST);
        fs::remove_file(root.join("static/src/js/dsist_integration.js")).unwrap();
        let config = config_for(&root);
        let mut templates = TemplateStore::new();

        let result = ModuleRegistry::load(&config, &mut templates);

        assert!(matches!(
            result,
            Err(ModuleError::Registry(RegistryError::AssetFileMissing { bundle, .. }))
                if bundle == "web.assets_backend"
        ));
    }

    #[test]
    fn rejects_colliding_template_names() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = "name = \"M\"\ndata = [\"views/index.html\", \"pages/index.html\"]\n";
        let root = write_module(dir.path(), manifest);
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::write(root.join("pages/index.html"), "<p>other</p>").unwrap();
        let config = config_for(&root);
        let mut templates = TemplateStore::new();

        let result = ModuleRegistry::load(&config, &mut templates);

        assert!(matches!(
            result,
            Err(ModuleError::Registry(RegistryError::DuplicateTemplate(_)))
        ));
    }

    #[test]
    fn rejects_missing_module_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir.path().join("nope"));
        let mut templates = TemplateStore::new();

        let result = ModuleRegistry::load(&config, &mut templates);

        assert!(matches!(
            result,
            Err(ModuleError::Registry(RegistryError::ModuleRootMissing(_)))
        ));
    }

    #[test]
    fn content_types_match_extensions() {
        assert_eq!(content_type_for("static/src/js/app.js"), "text/javascript");
        assert_eq!(content_type_for("static/src/css/app.css"), "text/css");
        assert_eq!(content_type_for("static/img/logo.png"), "image/png");
        assert_eq!(content_type_for("static/data.bin"), "application/octet-stream");
    }
}
