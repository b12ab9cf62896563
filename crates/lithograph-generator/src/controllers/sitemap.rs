//! XML sitemap generation.

use lithograph_core::mime;
use tracing::debug;

use crate::{
    content_set::ContentSet,
    controller::{ContentController, HookFuture},
    error::Result,
    files::write_file,
    item::ContentItem,
};

/// Url path the sitemap is served at.
pub const SITEMAP_URL_PATH: &str = "/sitemap.xml";

/// Answers `/sitemap.xml` with every url path pages list for the sitemap.
#[derive(Debug)]
pub struct SitemapController {
    enabled: bool,
}

impl SitemapController {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Build the sitemap document.
    pub fn build(site: &ContentSet) -> Result<String> {
        let url_paths = site.pages().sitemap_url_paths();
        debug!(count = url_paths.len(), "generating sitemap");

        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        for url_path in url_paths {
            let loc = site.paths().resolve_to_full_url(&url_path)?;
            xml.push_str(&format!("  <url><loc>{}</loc></url>\n", escape_xml(&loc)));
        }

        xml.push_str("</urlset>\n");
        Ok(xml)
    }
}

impl ContentController for SitemapController {
    fn name(&self) -> &'static str {
        "sitemap"
    }

    fn describe(&self, url_path: &str) -> Option<ContentItem> {
        (self.enabled && url_path == SITEMAP_URL_PATH).then(|| {
            ContentItem::generated(url_path, mime::XML, |site| {
                Self::build(site).map(String::into_bytes)
            })
        })
    }

    fn on_write_all_to_disk<'a>(&'a self, site: &'a ContentSet) -> Option<HookFuture<'a>> {
        if !self.enabled {
            return None;
        }

        Some(Box::pin(async move {
            let xml = Self::build(site)?;
            let path = site.paths().url_path_to_file_path(SITEMAP_URL_PATH)?;
            write_file(&path, xml).await
        }))
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_disabled_sitemap_answers_nothing() {
        let controller = SitemapController::new(false);
        assert!(controller.describe(SITEMAP_URL_PATH).is_none());

        let controller = SitemapController::new(true);
        assert!(controller.describe(SITEMAP_URL_PATH).is_some());
        assert!(controller.describe("/other.xml").is_none());
    }
}
