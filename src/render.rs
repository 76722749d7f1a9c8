//! Named-template store backing the host's view registry.

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::error::RenderError;

/// Registry of named view templates.
///
/// Templates are registered under their qualified name
/// (`<technical_name>.<stem>`) and may reference each other as partials.
pub struct TemplateStore {
    registry: Handlebars<'static>,
}

impl TemplateStore {
    /// Create an empty template store.
    pub fn new() -> Self {
        Self {
            registry: Handlebars::new(),
        }
    }

    /// Register a template source under its qualified name.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| RenderError::Compile {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    /// Whether a template is registered under the given name.
    pub fn has(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// Registered template names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.get_templates().keys().cloned().collect();
        names.sort();
        names
    }

    /// Render a named template with the given data context.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        if !self.registry.has_template(name) {
            return Err(RenderError::TemplateNotFound(name.to_string()));
        }

        self.registry
            .render(name, data)
            .map_err(|e| RenderError::Render(Box::new(e)))
    }

    /// Render a named template with the empty context.
    pub fn render_empty(&self, name: &str) -> Result<String, RenderError> {
        self.render(name, &json!({}))
    }
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateStore")
            .field("templates", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_registered_template() {
        let mut store = TemplateStore::new();
        store.register("m.index", "<h1>Dashboard</h1>").unwrap();

        let body = store.render_empty("m.index").unwrap();

        assert_eq!(body, "<h1>Dashboard</h1>");
    }

    #[test]
    fn empty_context_render_is_deterministic() {
        let mut store = TemplateStore::new();
        store
            .register("m.index", "<p>static content, no variables</p>")
            .unwrap();

        let first = store.render_empty("m.index").unwrap();
        let second = store.render_empty("m.index").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn resolves_registered_partial() {
        let mut store = TemplateStore::new();
        store.register("menu", "<nav>menu</nav>").unwrap();
        store
            .register("index", "{{> menu}}<main>body</main>")
            .unwrap();

        let body = store.render_empty("index").unwrap();

        assert_eq!(body, "<nav>menu</nav><main>body</main>");
    }

    #[test]
    fn unknown_template_is_an_error() {
        let store = TemplateStore::new();

        let result = store.render_empty("m.missing");

        assert!(matches!(result, Err(RenderError::TemplateNotFound(n)) if n == "m.missing"));
    }

    #[test]
    fn invalid_template_source_fails_to_register() {
        let mut store = TemplateStore::new();

        let result = store.register("m.broken", "{{#if flag}}unclosed");

        assert!(matches!(result, Err(RenderError::Compile { .. })));
        assert!(!store.has("m.broken"));
    }

    #[test]
    fn names_are_sorted() {
        let mut store = TemplateStore::new();
        store.register("m.menu", "b").unwrap();
        store.register("m.index", "a").unwrap();

        assert_eq!(store.names(), vec!["m.index", "m.menu"]);
    }
}
