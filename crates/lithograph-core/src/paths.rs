//! Url path and file path helpers.
//!
//! Every file the site reads or writes lives under the root directory; url
//! paths map onto it one to one (`/a/b.css` is `<root>/a/b.css`, and a url
//! path ending in `/` maps to its `index.html`).

use std::{
    path::{Component, Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use url::Url;

use crate::{
    config::SiteOptions,
    error::{CoreError, Result},
};

static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z][a-z\d+\-.]*:)?//").expect("absolute url regex is valid")
});

/// Base used to resolve relative url paths without a real domain.
const RESOLUTION_BASE: &str = "http://resolution.invalid/";

/// Path arithmetic for one site.
#[derive(Debug, Clone)]
pub struct SitePaths {
    root: PathBuf,
    url_root: Url,
}

impl SitePaths {
    /// Create path helpers for the given options.
    ///
    /// The root directory is made absolute against the current directory.
    pub fn new(options: &SiteOptions) -> Result<Self> {
        let root = normalize(&std::path::absolute(&options.root_directory)?);

        let port = options.port.map(|p| format!(":{p}")).unwrap_or_default();
        let raw = format!("{}://{}{}/", options.protocol, options.domain, port);
        let url_root = Url::parse(&raw)
            .map_err(|e| CoreError::config_with_source(format!("invalid site url {raw}"), e))?;

        Ok(Self { root, url_root })
    }

    /// Absolute root directory.
    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root
    }

    /// Root url of the site, always ending with `/`.
    #[must_use]
    pub fn url_root(&self) -> &str {
        self.url_root.as_str()
    }

    /// Whether the url has neither protocol nor domain.
    #[must_use]
    pub fn is_relative_url(&self, url: &str) -> bool {
        !ABSOLUTE_URL.is_match(url)
    }

    /// Whether the url path depends on the point it is resolved from.
    #[must_use]
    pub fn is_relative_url_path(&self, url_path: &str) -> bool {
        !url_path.starts_with('/')
    }

    /// Whether the url path denotes a directory.
    #[must_use]
    pub fn is_directory_url_path(&self, url_path: &str) -> bool {
        url_path.ends_with('/')
    }

    /// Fail unless the url path is absolute.
    pub fn check_url_path_is_absolute(&self, url_path: &str) -> Result<()> {
        if self.is_relative_url_path(url_path) {
            return Err(CoreError::path(format!(
                "Absolute url path was expected here, but got {url_path}"
            )));
        }
        Ok(())
    }

    /// Fail unless the url path is absolute and names a file.
    pub fn check_url_path_is_absolute_file_path(&self, url_path: &str) -> Result<()> {
        self.check_url_path_is_absolute(url_path)?;
        if self.is_directory_url_path(url_path) {
            return Err(CoreError::path(format!(
                "File url path was expected here, but got {url_path}"
            )));
        }
        Ok(())
    }

    /// Resolve a file path against the root, failing if it leaves the root.
    pub fn resolve_file_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let resolved = self.resolve_file_path_unchecked(path);
        if !is_path_inside(&resolved, &self.root) {
            return Err(CoreError::path(format!(
                "File/dir path \"{}\" is not inside root directory \"{}\".",
                path.display(),
                self.root.display()
            )));
        }
        Ok(resolved)
    }

    /// Resolve a file path against the root without the containment check.
    #[must_use]
    pub fn resolve_file_path_unchecked(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize(&self.root.join(path))
    }

    /// Resolve a possibly relative url path, relative to `from`.
    pub fn resolve_url_path(&self, url_path: &str, from: &str) -> Result<String> {
        if !self.is_relative_url_path(url_path) {
            return Ok(url_path.to_string());
        }

        let base = Url::parse(RESOLUTION_BASE)
            .and_then(|base| base.join(from))
            .and_then(|base| base.join(url_path))
            .map_err(|e| {
                CoreError::path(format!("could not resolve {url_path} from {from}: {e}"))
            })?;
        Ok(base.path().to_string())
    }

    /// Full url (protocol, domain and all) of a url path.
    pub fn resolve_to_full_url(&self, url_path: &str) -> Result<String> {
        let url_path = self.resolve_url_path(url_path, "/")?;
        self.url_root
            .join(&url_path)
            .map(String::from)
            .map_err(|e| CoreError::path(format!("could not build full url for {url_path}: {e}")))
    }

    /// File path a url path is stored at.
    pub fn url_path_to_file_path(&self, url_path: &str) -> Result<PathBuf> {
        let mut url_path = self.resolve_url_path(url_path, "/")?;
        if url_path.ends_with('/') {
            url_path.push_str("index.html");
        }

        let decoded = urlencoding::decode(&url_path)
            .map_err(|e| CoreError::path(format!("url path {url_path} is not valid utf-8: {e}")))?;
        self.resolve_file_path(format!(".{decoded}"))
    }

    /// Url path a file inside the root is served at.
    pub fn file_path_to_url_path(&self, file_path: impl AsRef<Path>) -> Result<String> {
        let file_path = self.resolve_file_path(file_path)?;
        let relative = file_path
            .strip_prefix(&self.root)
            .map_err(|_| CoreError::path(format!("{} is outside root", file_path.display())))?;

        let segments: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let raw = format!("/{}", segments.join("/"));

        self.url_root
            .join(&raw)
            .map(|url| url.path().to_string())
            .map_err(|e| CoreError::path(format!("could not build url path for {raw}: {e}")))
    }
}

/// Whether `inner` equals `outer` or lies below it.
#[must_use]
pub fn is_path_inside(inner: &Path, outer: &Path) -> bool {
    inner.starts_with(outer)
}

/// Lexically normalize a path: drop `.` and fold `..` into the parent.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}
