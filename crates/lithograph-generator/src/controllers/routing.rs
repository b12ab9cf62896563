//! The terminal router.
//!
//! Probed last, and never leaves a url path undescribed: whatever the other
//! controllers do not know ends up here as a routed page, a redirect or a
//! not-found item.

use std::{fmt, sync::Arc};

use lithograph_core::mime;
use parking_lot::RwLock;

use crate::{
    controller::ContentController,
    controllers::page::PageController,
    error::{GeneratorError, Result},
    item::{ContentItem, ResponseKind},
    page::PageHandle,
};

/// Decision of a page router.
#[derive(Clone)]
pub enum RouterResponse {
    NotFound,
    Page(PageHandle),
    PermanentRedirect(String),
    TemporaryRedirect(String),
}

impl fmt::Debug for RouterResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("NotFound"),
            Self::Page(_) => f.write_str("Page(..)"),
            Self::PermanentRedirect(to) => f.debug_tuple("PermanentRedirect").field(to).finish(),
            Self::TemporaryRedirect(to) => f.debug_tuple("TemporaryRedirect").field(to).finish(),
        }
    }
}

/// Routes url paths no other controller claimed.
pub type PageRouter = Arc<dyn Fn(&str) -> RouterResponse + Send + Sync>;

#[derive(Default)]
pub struct RoutingController {
    router: RwLock<Option<PageRouter>>,
}

impl RoutingController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_router(&self, router: PageRouter) -> Result<()> {
        let mut current = self.router.write();
        if current.is_some() {
            return Err(GeneratorError::duplicate("page router", "router"));
        }
        *current = Some(router);
        Ok(())
    }

    fn route(&self, url_path: &str) -> RouterResponse {
        let router = self.router.read().clone();
        router.map_or(RouterResponse::NotFound, |router| router(url_path))
    }

    /// Describe `url_path`; the answer is never empty.
    #[must_use]
    pub fn describe_always(&self, url_path: &str) -> ContentItem {
        let owned = url_path.to_string();
        match self.route(url_path) {
            RouterResponse::Page(page) => PageController::page_item(url_path, page),
            RouterResponse::NotFound => ContentItem::generated(url_path, mime::HTML, move |site| {
                site.pages()
                    .not_found_content(site, &owned)
                    .map(String::into_bytes)
            })
            .with_response(ResponseKind::NotFound),
            RouterResponse::PermanentRedirect(to) => redirect(url_path, &to)
                .with_response(ResponseKind::PermanentRedirect { to }),
            RouterResponse::TemporaryRedirect(to) => redirect(url_path, &to)
                .with_response(ResponseKind::TemporaryRedirect { to }),
        }
    }
}

fn redirect(url_path: &str, to: &str) -> ContentItem {
    let body = PageController::redirect_content(to);
    ContentItem::generated(url_path, mime::HTML, move |_| Ok(body.clone().into_bytes()))
}

impl ContentController for RoutingController {
    fn name(&self) -> &'static str {
        "routing"
    }

    fn describe(&self, url_path: &str) -> Option<ContentItem> {
        Some(self.describe_always(url_path))
    }
}
