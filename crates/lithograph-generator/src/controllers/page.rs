//! Pages.

use std::{collections::HashMap, sync::Arc};

use lithograph_core::{SitePaths, mime};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::{
    content_set::ContentSet,
    controller::{ContentController, HookFuture},
    error::{GeneratorError, Result},
    files::write_file,
    item::ContentItem,
    page::{AuxiliaryPage, DynamicPage, PageDefinition, PageHandle, StaticPage},
};

/// Body served for a missing page when no not-found page is set.
pub const DEFAULT_NOT_FOUND_BODY: &str = "<h1>HTTP 404<h1><h2>File Not Found<h2>";

/// Body served on failure when no server-error page is set, or it fails too.
pub const DEFAULT_SERVER_ERROR_BODY: &str = "<h1>HTTP 500<h1><h2>Server Error<h2>";

#[derive(Default)]
struct Registry {
    all: Vec<PageHandle>,
    static_routes: HashMap<String, PageHandle>,
    dynamic_routes: Vec<PageHandle>,
    not_found: Option<PageHandle>,
    server_error: Option<PageHandle>,
}

#[derive(Default)]
pub struct PageController {
    registry: RwLock<Registry>,
}

impl PageController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_page(&self, page: PageDefinition, paths: &SitePaths) -> Result<PageHandle> {
        if let Some(url_path) = page.static_url_path() {
            paths.check_url_path_is_absolute(url_path)?;
        }
        if let Some(url_path) = page.generation_test_url_path() {
            paths.check_url_path_is_absolute(url_path)?;
        }

        let mut registry = self.registry.write();
        if let Some(url_path) = page.static_url_path() {
            if registry.static_routes.contains_key(url_path) {
                return Err(GeneratorError::duplicate("static page", url_path));
            }
        }

        let page = Arc::new(page);
        registry.all.push(Arc::clone(&page));
        if let Some(url_path) = page.static_url_path() {
            registry
                .static_routes
                .insert(url_path.to_string(), Arc::clone(&page));
        }
        if page.is_dynamic() {
            registry.dynamic_routes.push(Arc::clone(&page));
        }

        debug!(page = ?page, "page registered");
        Ok(page)
    }

    pub(crate) fn add_static_page(&self, page: StaticPage, paths: &SitePaths) -> Result<PageHandle> {
        self.add_page(page.into_definition(), paths)
    }

    pub(crate) fn add_dynamic_page(
        &self,
        page: DynamicPage,
        paths: &SitePaths,
    ) -> Result<PageHandle> {
        self.add_page(page.into_definition()?, paths)
    }

    pub(crate) fn set_not_found_page(&self, page: AuxiliaryPage, paths: &SitePaths) -> Result<()> {
        if self.registry.read().not_found.is_some() {
            return Err(GeneratorError::duplicate("not found page", "404"));
        }
        let page = self.add_page(page.into_definition()?, paths)?;
        self.registry.write().not_found = Some(page);
        Ok(())
    }

    pub(crate) fn set_server_error_page(
        &self,
        page: AuxiliaryPage,
        paths: &SitePaths,
    ) -> Result<()> {
        if self.registry.read().server_error.is_some() {
            return Err(GeneratorError::duplicate("server error page", "500"));
        }
        let page = self.add_page(page.into_definition()?, paths)?;
        self.registry.write().server_error = Some(page);
        Ok(())
    }

    /// Every url path pages list for the sitemap, in registration order.
    #[must_use]
    pub fn sitemap_url_paths(&self) -> Vec<String> {
        self.registry
            .read()
            .all
            .iter()
            .flat_map(|page| page.sitemap_url_paths())
            .collect()
    }

    /// Number of registered pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.registry.read().all.len()
    }

    /// Content item rendering `page` for `url_path`.
    #[must_use]
    pub fn page_item(url_path: &str, page: PageHandle) -> ContentItem {
        let owned = url_path.to_string();
        ContentItem::generated(url_path, mime::HTML, move |site| {
            Self::render_page(site, &owned, &page).map(String::into_bytes)
        })
    }

    /// Render a page for a url path.
    pub fn render_page(site: &ContentSet, url_path: &str, page: &PageDefinition) -> Result<String> {
        site.with_render_context(url_path, |context| page.render(context))
    }

    /// Body of a not-found response for `url_path`.
    pub fn not_found_content(&self, site: &ContentSet, url_path: &str) -> Result<String> {
        let page = self.registry.read().not_found.clone();
        match page {
            Some(page) => Self::render_page(site, url_path, &page),
            None => Ok(DEFAULT_NOT_FOUND_BODY.to_string()),
        }
    }

    /// Body of a server-error response.
    pub fn server_error_content(&self, site: &ContentSet) -> Result<String> {
        let page = self.registry.read().server_error.clone();
        match page {
            Some(page) => Self::render_page(site, "", &page),
            None => Ok(DEFAULT_SERVER_ERROR_BODY.to_string()),
        }
    }

    /// Body of a redirect response.
    #[must_use]
    pub fn redirect_content(to: &str) -> String {
        format!(r#"<h1>Redirecting <a href="{to}">here</a>...</h1>"#)
    }

    /// Render every page once at its generation test url path.
    ///
    /// Returns the number of pages rendered.
    pub fn run_generation_tests(&self, site: &ContentSet) -> Result<usize> {
        let pages = self.registry.read().all.clone();
        let mut rendered = 0;
        for page in pages {
            if let Some(url_path) = page.generation_test_url_path() {
                Self::render_page(site, url_path, &page)?;
                rendered += 1;
            }
        }
        Ok(rendered)
    }

    async fn write(&self, site: &ContentSet) -> Result<()> {
        let pages = self.registry.read().all.clone();
        let smoke_test = !site.options().no_dynamic_generation_tests;

        let mut written = 0;
        for page in pages {
            let mut has_files = false;
            for url_path in page.file_url_paths() {
                has_files = true;
                let path = site.paths().url_path_to_file_path(&page_file_url_path(&url_path))?;
                let html = Self::render_page(site, &url_path, &page)?;
                write_file(&path, html).await?;
                written += 1;
            }

            if !has_files && smoke_test {
                if let Some(url_path) = page.generation_test_url_path() {
                    Self::render_page(site, url_path, &page)?;
                    debug!(url = %url_path, "generation test passed");
                }
            }
        }

        info!(count = written, "pages written");
        Ok(())
    }
}

/// Url path of the file a page is written to.
///
/// `/x/` becomes `/x/index.html`, `/x` becomes `/x.html`, `.html` and `.htm`
/// paths stay as they are.
#[must_use]
pub fn page_file_url_path(url_path: &str) -> String {
    if url_path.ends_with('/') {
        return format!("{url_path}index.html");
    }

    let lower = url_path.to_ascii_lowercase();
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        url_path.to_string()
    } else {
        format!("{url_path}.html")
    }
}

impl ContentController for PageController {
    fn name(&self) -> &'static str {
        "pages"
    }

    fn describe(&self, url_path: &str) -> Option<ContentItem> {
        let page = {
            let registry = self.registry.read();
            registry.static_routes.get(url_path).cloned().or_else(|| {
                registry
                    .dynamic_routes
                    .iter()
                    .find(|page| page.matches(url_path))
                    .cloned()
            })
        }?;
        Some(Self::page_item(url_path, page))
    }

    fn on_write_all_to_disk<'a>(&'a self, site: &'a ContentSet) -> Option<HookFuture<'a>> {
        Some(Box::pin(self.write(site)))
    }
}
