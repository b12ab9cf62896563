//! Content item descriptions.

use std::{fmt, path::PathBuf, sync::Arc};

use crate::{content_set::ContentSet, error::Result};

/// Produces the bytes of a generated content item.
pub type ContentFn = Arc<dyn Fn(&ContentSet) -> Result<Vec<u8>> + Send + Sync>;

/// How a content item should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    Ok,
    NotFound,
    PermanentRedirect { to: String },
    TemporaryRedirect { to: String },
}

impl ResponseKind {
    /// HTTP status code for this response.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
            Self::PermanentRedirect { .. } => 301,
            Self::TemporaryRedirect { .. } => 302,
        }
    }

    /// Redirect target, present only for redirects.
    #[must_use]
    pub fn redirect_to(&self) -> Option<&str> {
        match self {
            Self::PermanentRedirect { to } | Self::TemporaryRedirect { to } => Some(to),
            Self::Ok | Self::NotFound => None,
        }
    }

    /// Whether this is a normal, found item.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Short name used in messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::PermanentRedirect { .. } => "perm_redirect",
            Self::TemporaryRedirect { .. } => "temp_redirect",
        }
    }
}

/// Where the bytes of a content item come from.
#[derive(Clone)]
pub enum ContentSource {
    /// An existing file, served as-is.
    File(PathBuf),
    /// Content produced on demand.
    Generated(ContentFn),
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

/// What exists at a url path, and how to get it.
///
/// Describing an item never produces its content; the source is only
/// evaluated by [`ContentSet::load_content`].
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub url_path: String,
    pub mime: &'static str,
    pub hash: Option<String>,
    pub response: ResponseKind,
    pub source: ContentSource,
}

impl ContentItem {
    /// An item backed by a file.
    #[must_use]
    pub fn file(url_path: impl Into<String>, mime: &'static str, path: impl Into<PathBuf>) -> Self {
        Self {
            url_path: url_path.into(),
            mime,
            hash: None,
            response: ResponseKind::Ok,
            source: ContentSource::File(path.into()),
        }
    }

    /// An item whose content is produced on demand.
    pub fn generated<F>(url_path: impl Into<String>, mime: &'static str, produce: F) -> Self
    where
        F: Fn(&ContentSet) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            url_path: url_path.into(),
            mime,
            hash: None,
            response: ResponseKind::Ok,
            source: ContentSource::Generated(Arc::new(produce)),
        }
    }

    /// Set the content hash.
    #[must_use]
    pub fn with_hash(mut self, hash: Option<String>) -> Self {
        self.hash = hash;
        self
    }

    /// Set the response kind.
    #[must_use]
    pub fn with_response(mut self, response: ResponseKind) -> Self {
        self.response = response;
        self
    }
}
