//! Render contexts, the single-render guard and widgets.

use std::{fmt, sync::Arc};

use lithograph_core::{SiteOptions, mime};
use parking_lot::Mutex;

use crate::{
    content_set::ContentSet,
    controller::ContentController,
    controllers::image::ImageInfo,
    error::{GeneratorError, Result},
};

/// Render function of a page, stylesheet or generated script.
pub type RenderFn = Arc<dyn Fn(&RenderContext<'_>) -> Result<String> + Send + Sync>;

/// Helpers available while rendering content for one url path.
///
/// A context is handed to every render function explicitly; it lives only
/// for the duration of that call.
pub struct RenderContext<'a> {
    site: &'a ContentSet,
    url_path: String,
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("url_path", &self.url_path)
            .finish_non_exhaustive()
    }
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(site: &'a ContentSet, url_path: impl Into<String>) -> Self {
        Self {
            site,
            url_path: url_path.into(),
        }
    }

    /// Content set being rendered.
    #[must_use]
    pub fn site(&self) -> &'a ContentSet {
        self.site
    }

    /// Url path being rendered.
    #[must_use]
    pub fn url_path(&self) -> &str {
        &self.url_path
    }

    /// Root url of the site.
    #[must_use]
    pub fn url_root(&self) -> &str {
        self.site.paths().url_root()
    }

    /// Whether content hashes are available.
    #[must_use]
    pub fn has_hashes(&self) -> bool {
        self.site.options().use_hashes()
    }

    /// Site options.
    #[must_use]
    pub fn options(&self) -> &'a SiteOptions {
        self.site.options()
    }

    #[must_use]
    pub fn is_relative_url(&self, url: &str) -> bool {
        self.site.paths().is_relative_url(url)
    }

    #[must_use]
    pub fn is_relative_url_path(&self, url_path: &str) -> bool {
        self.site.paths().is_relative_url_path(url_path)
    }

    /// Escape a value for use inside an HTML attribute.
    #[must_use]
    pub fn escape_attribute(&self, value: &str) -> String {
        escape_attribute(value)
    }

    /// Resolve a local url relative to the page being rendered.
    pub fn resolve_url_path(&self, url: &str) -> Result<String> {
        if !self.is_relative_url(url) {
            return Err(GeneratorError::Lookup(format!(
                "Could not resolve {url} to absolute local url path: it's not relative url."
            )));
        }
        Ok(self.site.paths().resolve_url_path(url, &self.url_path)?)
    }

    /// Hash of the content item at `url`, if it has one.
    pub fn hash(&self, url: &str) -> Result<Option<String>> {
        let url_path = self.resolve_url_path(url)?;
        let item = self.site.describe(&url_path)?;
        if !item.response.is_ok() {
            return Err(GeneratorError::Lookup(format!(
                "Content item at {url_path} could not possibly have hash: its response type is {}",
                item.response.name()
            )));
        }
        Ok(item.hash)
    }

    /// Hash of the content item at `url`, failing if there is none.
    pub fn hash_or_err(&self, url: &str) -> Result<String> {
        self.hash(url)?.ok_or_else(|| {
            GeneratorError::Lookup(format!(
                "Content item at {url} was expected to have hash, but it does not (required from page {})",
                self.url_path
            ))
        })
    }

    /// Whether `url` leads to a found content item of any kind.
    pub fn url_points_to_content_item(&self, url: &str) -> Result<bool> {
        let url_path = self.resolve_url_path(url)?;
        Ok(self.site.describe(&url_path)?.response.is_ok())
    }

    /// Whether `url` leads to a page.
    pub fn url_points_to_page(&self, url: &str) -> Result<bool> {
        let url_path = self.resolve_url_path(url)?;
        Ok(self.site.pages().has_content_item(&url_path)
            || self.site.routing().has_content_item(&url_path))
    }

    /// Whether `url` leads to an image.
    pub fn url_points_to_image(&self, url: &str) -> Result<bool> {
        self.points_to(url, self.site.images().as_ref(), "image/")
    }

    /// Whether `url` leads to a stylesheet.
    pub fn url_points_to_css_file(&self, url: &str) -> Result<bool> {
        self.points_to(url, self.site.styles().as_ref(), mime::CSS)
    }

    /// Whether `url` leads to a script.
    pub fn url_points_to_js_file(&self, url: &str) -> Result<bool> {
        self.points_to(url, self.site.scripts().as_ref(), mime::JS)
    }

    /// Information about the image at `url`.
    pub fn image_info(&self, url: &str) -> Result<ImageInfo> {
        let url_path = self.resolve_url_path(url)?;
        self.site.images().image_info(&url_path)
    }

    fn points_to(
        &self,
        url: &str,
        controller: &dyn ContentController,
        mime_prefix: &str,
    ) -> Result<bool> {
        let url_path = self.resolve_url_path(url)?;
        if controller.has_content_item(&url_path) {
            return Ok(true);
        }

        let item = self.site.describe(&url_path)?;
        Ok(item.response.is_ok() && item.mime.starts_with(mime_prefix))
    }
}

/// Escape a value for use inside a double- or single-quoted HTML attribute.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '&' => result.push_str("&amp;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\r' => {
                chars.next_if_eq(&'\n');
                result.push_str("&#10;");
            }
            '\n' => result.push_str("&#10;"),
            other => result.push(other),
        }
    }
    result
}

/// Holds the url path of the render in progress, if any.
#[derive(Debug, Default)]
pub struct RenderSlot {
    active: Mutex<Option<String>>,
}

impl RenderSlot {
    /// Claim the slot for `url_path`; fails if another render holds it.
    pub fn acquire(&self, url_path: &str) -> Result<RenderGuard<'_>> {
        let mut active = self.active.lock();
        if let Some(current) = active.as_ref() {
            return Err(GeneratorError::RenderContextConflict {
                active: current.clone(),
                requested: url_path.to_string(),
            });
        }
        *active = Some(url_path.to_string());
        Ok(RenderGuard { slot: self })
    }

    /// Url path of the render in progress.
    #[must_use]
    pub fn active(&self) -> Option<String> {
        self.active.lock().clone()
    }
}

/// Releases the render slot when dropped.
#[derive(Debug)]
pub struct RenderGuard<'a> {
    slot: &'a RenderSlot,
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        *self.slot.active.lock() = None;
    }
}

type WidgetFn<T> = dyn Fn(&RenderContext<'_>, &T) -> Result<String> + Send + Sync;

/// A reusable piece of markup, rendered inside some page.
pub struct Widget<T: ?Sized> {
    render: Arc<WidgetFn<T>>,
}

impl<T: ?Sized> Widget<T> {
    pub(crate) fn new<F>(render: F) -> Self
    where
        F: Fn(&RenderContext<'_>, &T) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            render: Arc::new(render),
        }
    }

    /// Render the widget for the page `context` belongs to.
    pub fn render(&self, context: &RenderContext<'_>, props: &T) -> Result<String> {
        (self.render)(context, props)
    }
}

impl<T: ?Sized> Clone for Widget<T> {
    fn clone(&self) -> Self {
        Self {
            render: Arc::clone(&self.render),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Widget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Widget(..)")
    }
}
