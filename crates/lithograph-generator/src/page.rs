//! Page definitions.
//!
//! Every page kind ends up as a [`PageDefinition`]: a render function plus
//! the url paths it is reachable at, listed in the sitemap at and written to
//! disk at.

use std::{fmt, sync::Arc};

use crate::{
    error::{GeneratorError, Result},
    pattern::PatternMatcher,
    render::{RenderContext, RenderFn},
};

/// Shared handle to a registered page.
pub type PageHandle = Arc<PageDefinition>;

type MatchFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A finite set of url paths.
#[derive(Clone, Default)]
pub enum UrlPathSet {
    #[default]
    Empty,
    Single(String),
    List(Vec<String>),
    /// Every path a pattern produces.
    Pattern(Arc<PatternMatcher>),
}

impl UrlPathSet {
    /// Iterate the url paths.
    #[must_use]
    pub fn iter(&self) -> Box<dyn Iterator<Item = String> + Send + '_> {
        match self {
            Self::Empty => Box::new(std::iter::empty()),
            Self::Single(url_path) => Box::new(std::iter::once(url_path.clone())),
            Self::List(url_paths) => Box::new(url_paths.iter().cloned()),
            Self::Pattern(matcher) => Box::new(matcher.iter()),
        }
    }
}

impl fmt::Debug for UrlPathSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Single(url_path) => f.debug_tuple("Single").field(url_path).finish(),
            Self::List(url_paths) => f.debug_tuple("List").field(url_paths).finish(),
            Self::Pattern(matcher) => f
                .debug_tuple("Pattern")
                .field(&matcher.definition().segments())
                .finish(),
        }
    }
}

/// A page as the page controller sees it.
pub struct PageDefinition {
    render: RenderFn,
    static_url_path: Option<String>,
    matcher: Option<MatchFn>,
    sitemap_url_paths: UrlPathSet,
    file_url_paths: UrlPathSet,
    generation_test_url_path: Option<String>,
}

impl fmt::Debug for PageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDefinition")
            .field("static_url_path", &self.static_url_path)
            .field("dynamic", &self.matcher.is_some())
            .field("sitemap_url_paths", &self.sitemap_url_paths)
            .field("file_url_paths", &self.file_url_paths)
            .field("generation_test_url_path", &self.generation_test_url_path)
            .finish_non_exhaustive()
    }
}

impl PageDefinition {
    /// A page with nothing but a render function.
    ///
    /// Such a page is reachable only through the page router until it is
    /// given a static url path or a matcher.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Result<String> + Send + Sync + 'static,
    {
        Self::from_render_fn(Arc::new(render))
    }

    fn from_render_fn(render: RenderFn) -> Self {
        Self {
            render,
            static_url_path: None,
            matcher: None,
            sitemap_url_paths: UrlPathSet::Empty,
            file_url_paths: UrlPathSet::Empty,
            generation_test_url_path: None,
        }
    }

    /// Route exactly this url path to the page.
    #[must_use]
    pub fn at(mut self, url_path: impl Into<String>) -> Self {
        self.static_url_path = Some(url_path.into());
        self
    }

    /// Route every url path accepted by `matches` to the page.
    #[must_use]
    pub fn matching<F>(mut self, matches: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.matcher = Some(Arc::new(matches));
        self
    }

    /// Url paths listed in the sitemap.
    #[must_use]
    pub fn with_sitemap_url_paths(mut self, url_paths: UrlPathSet) -> Self {
        self.sitemap_url_paths = url_paths;
        self
    }

    /// Url paths written to disk.
    #[must_use]
    pub fn with_file_url_paths(mut self, url_paths: UrlPathSet) -> Self {
        self.file_url_paths = url_paths;
        self
    }

    /// Url path used to smoke-test the page when no file is written.
    #[must_use]
    pub fn with_generation_test_url_path(mut self, url_path: impl Into<String>) -> Self {
        self.generation_test_url_path = Some(url_path.into());
        self
    }

    /// Render the page.
    pub fn render(&self, context: &RenderContext<'_>) -> Result<String> {
        (self.render)(context)
    }

    #[must_use]
    pub fn static_url_path(&self) -> Option<&str> {
        self.static_url_path.as_deref()
    }

    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.matcher.is_some()
    }

    /// Whether the page's matcher accepts `url_path`.
    #[must_use]
    pub fn matches(&self, url_path: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m(url_path))
    }

    pub fn sitemap_url_paths(&self) -> impl Iterator<Item = String> + Send + '_ {
        self.sitemap_url_paths.iter()
    }

    pub fn file_url_paths(&self) -> impl Iterator<Item = String> + Send + '_ {
        self.file_url_paths.iter()
    }

    #[must_use]
    pub fn generation_test_url_path(&self) -> Option<&str> {
        self.generation_test_url_path.as_deref()
    }
}

/// A page living at one url path.
pub struct StaticPage {
    url_path: String,
    render: RenderFn,
    include_in_sitemap: bool,
    generate_file: bool,
}

impl StaticPage {
    /// A page listed in the sitemap and written to disk.
    pub fn new<F>(url_path: impl Into<String>, render: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            url_path: url_path.into(),
            render: Arc::new(render),
            include_in_sitemap: true,
            generate_file: true,
        }
    }

    #[must_use]
    pub fn exclude_from_sitemap(mut self) -> Self {
        self.include_in_sitemap = false;
        self
    }

    #[must_use]
    pub fn without_file(mut self) -> Self {
        self.generate_file = false;
        self
    }

    /// Convert into a generic page definition.
    #[must_use]
    pub fn into_definition(self) -> PageDefinition {
        let listed = |enabled: bool| {
            if enabled {
                UrlPathSet::Single(self.url_path.clone())
            } else {
                UrlPathSet::Empty
            }
        };

        PageDefinition {
            sitemap_url_paths: listed(self.include_in_sitemap),
            file_url_paths: listed(self.generate_file),
            generation_test_url_path: Some(self.url_path.clone()),
            static_url_path: Some(self.url_path.clone()),
            matcher: None,
            render: self.render,
        }
    }
}

/// A family of pages described by a url pattern.
pub struct DynamicPage {
    matcher: Arc<PatternMatcher>,
    render: RenderFn,
    render_to_files: bool,
    exclude_from_sitemap: bool,
}

impl DynamicPage {
    /// Pages listed in the sitemap but not written to disk.
    pub fn new<F>(matcher: impl Into<Arc<PatternMatcher>>, render: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            matcher: matcher.into(),
            render: Arc::new(render),
            render_to_files: false,
            exclude_from_sitemap: false,
        }
    }

    /// Write every page of the pattern to disk.
    #[must_use]
    pub fn render_to_files(mut self) -> Self {
        self.render_to_files = true;
        self
    }

    #[must_use]
    pub fn exclude_from_sitemap(mut self) -> Self {
        self.exclude_from_sitemap = true;
        self
    }

    /// Convert into a generic page definition.
    ///
    /// Fails when the pattern produces no url path at all.
    pub fn into_definition(self) -> Result<PageDefinition> {
        let any_url_path = self.matcher.first().ok_or_else(|| {
            GeneratorError::PatternViolation(
                "Pattern is completely incorrect and won't match any url path.".to_string(),
            )
        })?;

        let all = UrlPathSet::Pattern(Arc::clone(&self.matcher));
        let matcher = Arc::clone(&self.matcher);

        Ok(PageDefinition {
            sitemap_url_paths: if self.exclude_from_sitemap {
                UrlPathSet::Empty
            } else {
                all.clone()
            },
            file_url_paths: if self.render_to_files {
                all
            } else {
                UrlPathSet::Empty
            },
            generation_test_url_path: Some(any_url_path),
            static_url_path: None,
            matcher: Some(Arc::new(move |url_path: &str| {
                matcher.match_path(url_path).is_some()
            })),
            render: self.render,
        })
    }
}

/// The not-found or server-error page.
pub struct AuxiliaryPage {
    render: RenderFn,
    url_path: Option<String>,
    include_in_sitemap: bool,
    generate_file: bool,
}

impl AuxiliaryPage {
    /// A page reachable only as an error response.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            render: Arc::new(render),
            url_path: None,
            include_in_sitemap: false,
            generate_file: false,
        }
    }

    /// Url path the page is also written to or listed at.
    #[must_use]
    pub fn at(mut self, url_path: impl Into<String>) -> Self {
        self.url_path = Some(url_path.into());
        self
    }

    #[must_use]
    pub fn include_in_sitemap(mut self) -> Self {
        self.include_in_sitemap = true;
        self
    }

    #[must_use]
    pub fn generate_file(mut self) -> Self {
        self.generate_file = true;
        self
    }

    /// Convert into a generic page definition.
    pub fn into_definition(self) -> Result<PageDefinition> {
        if (self.include_in_sitemap || self.generate_file) && self.url_path.is_none() {
            return Err(GeneratorError::InvalidDefinition(
                "Page requested sitemap/file generation, but has no url path. Don't know where to generate file or what to include in sitemap."
                    .to_string(),
            ));
        }

        let listed = |enabled: bool| match (&self.url_path, enabled) {
            (Some(url_path), true) => UrlPathSet::Single(url_path.clone()),
            _ => UrlPathSet::Empty,
        };

        Ok(PageDefinition {
            sitemap_url_paths: listed(self.include_in_sitemap),
            file_url_paths: listed(self.generate_file),
            generation_test_url_path: Some(self.url_path.clone().unwrap_or_else(|| "/".into())),
            static_url_path: self.url_path.clone().filter(|_| self.generate_file),
            matcher: None,
            render: self.render,
        })
    }
}
