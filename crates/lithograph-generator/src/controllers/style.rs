//! Stylesheets.
//!
//! Each stylesheet is a builder function producing finished CSS. The
//! builder may look up hashes of images, fonts and scripts through its
//! render context, so stylesheet hashes are computed only after every
//! other resource is loaded.

use std::collections::BTreeMap;

use lithograph_core::mime;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::{
    content_set::ContentSet,
    controller::{ContentController, HookFuture},
    error::{GeneratorError, Result},
    files::write_file,
    hash::content_hash,
    item::ContentItem,
    render::RenderFn,
};

#[derive(Clone)]
struct Stylesheet {
    build: RenderFn,
    hash: Option<String>,
}

#[derive(Default)]
pub struct StyleController {
    items: RwLock<BTreeMap<String, Stylesheet>>,
}

impl StyleController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, url_path: String, build: RenderFn) -> Result<()> {
        let mut items = self.items.write();
        if items.contains_key(&url_path) {
            return Err(GeneratorError::duplicate("stylesheet", url_path));
        }
        items.insert(url_path, Stylesheet { build, hash: None });
        Ok(())
    }

    /// Url paths of every stylesheet.
    #[must_use]
    pub fn url_paths(&self) -> Vec<String> {
        self.items.read().keys().cloned().collect()
    }

    fn build(site: &ContentSet, url_path: &str, build: &RenderFn) -> Result<String> {
        build(&site.render_context(url_path))
            .map_err(|e| GeneratorError::upstream(format!("building stylesheet {url_path}"), e))
    }

    fn snapshot(&self) -> Vec<(String, RenderFn)> {
        self.items
            .read()
            .iter()
            .map(|(url_path, sheet)| (url_path.clone(), sheet.build.clone()))
            .collect()
    }

    fn compute_hashes(&self, site: &ContentSet) -> Result<()> {
        let mut hashes = Vec::new();
        for (url_path, build) in self.snapshot() {
            let css = Self::build(site, &url_path, &build)?;
            hashes.push((url_path, content_hash(css.as_bytes())));
        }

        let mut items = self.items.write();
        for (url_path, hash) in hashes {
            if let Some(sheet) = items.get_mut(&url_path) {
                sheet.hash = Some(hash);
            }
        }
        info!(count = items.len(), "stylesheet hashes computed");
        Ok(())
    }

    async fn write(&self, site: &ContentSet) -> Result<()> {
        for (url_path, build) in self.snapshot() {
            let path = site.paths().url_path_to_file_path(&url_path)?;
            let css = Self::build(site, &url_path, &build)?;
            write_file(&path, css).await?;
            debug!(url = %url_path, "stylesheet written");
        }
        Ok(())
    }
}

impl ContentController for StyleController {
    fn name(&self) -> &'static str {
        "styles"
    }

    fn describe(&self, url_path: &str) -> Option<ContentItem> {
        let sheet = self.items.read().get(url_path).cloned()?;
        let owned = url_path.to_string();
        let build = sheet.build;
        Some(
            ContentItem::generated(url_path, mime::CSS, move |site| {
                Self::build(site, &owned, &build).map(String::into_bytes)
            })
            .with_hash(sheet.hash),
        )
    }

    fn on_resource_definition_completed<'a>(
        &'a self,
        site: &'a ContentSet,
    ) -> Option<HookFuture<'a>> {
        // without hashes there is no reason to build anything this early
        if !site.options().use_hashes() {
            return None;
        }
        Some(Box::pin(async move { self.compute_hashes(site) }))
    }

    fn on_write_all_to_disk<'a>(&'a self, site: &'a ContentSet) -> Option<HookFuture<'a>> {
        Some(Box::pin(self.write(site)))
    }
}
