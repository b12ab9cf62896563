//! HTML templates for pages.
//!
//! A lightweight interpolation system rather than a full template engine:
//! `{{ name }}` is replaced by a variable and fails when it is missing,
//! `{{ name? }}` is replaced by an empty string instead.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use tracing::debug;

use crate::{
    error::{GeneratorError, Result},
    render::RenderContext,
};

/// Variables available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with the page being rendered.
    ///
    /// Provides `url_path`, `url_root` and `domain`.
    #[must_use]
    pub fn for_render(context: &RenderContext<'_>) -> Self {
        Self::new()
            .with_var("url_path", context.url_path())
            .with_var("url_root", context.url_root())
            .with_var("domain", context.options().domain.as_str())
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert every pair of `vars`.
    pub fn extend<K, V>(&mut self, vars: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.insert(key, value);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}

/// A template with `{{ variable }}` placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a template file; the file path becomes the template name.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GeneratorError::upstream(format!("reading template {}", path.display()), e)
        })?;
        Ok(Self::new(path.display().to_string(), content))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut result = self.content.clone();
        let mut pos = 0;

        while let Some(start) = result[pos..].find("{{") {
            let start = pos + start;
            let end = result[start..].find("}}").ok_or_else(|| {
                GeneratorError::Template(format!("{}: unclosed {{{{ delimiter", self.name))
            })?;
            let end = start + end + 2;

            let var_name = result[start + 2..end - 2].trim();

            // {{ variable? }} is optional
            let (var_name, optional) = match var_name.strip_suffix('?') {
                Some(stripped) => (stripped, true),
                None => (var_name, false),
            };

            let value = match context.get(var_name) {
                Some(v) => v.to_string(),
                None if optional => String::new(),
                None => {
                    return Err(GeneratorError::Template(format!(
                        "{}: missing required variable: {var_name}",
                        self.name
                    )));
                }
            };

            result.replace_range(start..end, &value);
            pos = start + value.len();
        }

        Ok(result)
    }
}

/// Templates loaded from disk, keyed by file path.
///
/// Each file is read once; pages sharing a template share one copy.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    base_dir: PathBuf,
    templates: RwLock<HashMap<PathBuf, Arc<Template>>>,
}

impl TemplateRegistry {
    /// Registry resolving relative template paths against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            templates: RwLock::default(),
        }
    }

    /// Register an in-memory template under `path`.
    pub fn register(&self, path: impl Into<PathBuf>, template: Template) -> Arc<Template> {
        let template = Arc::new(template);
        self.templates
            .write()
            .insert(path.into(), Arc::clone(&template));
        template
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Arc<Template>> {
        self.templates.read().get(path).cloned()
    }

    /// Load the template at `path`, reading it only the first time.
    pub async fn load(&self, path: &Path) -> Result<Arc<Template>> {
        if let Some(template) = self.get(path) {
            return Ok(template);
        }

        let full_path = self.base_dir.join(path);
        let template = Template::load(&full_path).await?;
        debug!(path = %full_path.display(), "template loaded");
        Ok(self.register(path, template))
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }
}
