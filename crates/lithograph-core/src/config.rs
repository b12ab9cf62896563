//! Site configuration management.
//!
//! [`SiteOptions`] carries the settings every content set needs. [`Config`]
//! is the full site manifest read by the command line tool.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main manifest structure for Lithograph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteOptions,

    /// Static resources: plain files, images and scripts.
    #[serde(default)]
    pub resources: ResourcesConfig,

    /// Stylesheets assembled from source files.
    #[serde(default)]
    pub stylesheets: Vec<StylesheetConfig>,

    /// Pages living at a single url path.
    #[serde(default)]
    pub pages: Vec<PageConfig>,

    /// Pages generated from a url pattern.
    #[serde(default)]
    pub dynamic_pages: Vec<DynamicPageConfig>,

    /// Page served with HTTP 404.
    #[serde(default)]
    pub not_found_page: Option<AuxiliaryPageConfig>,

    /// Page served with HTTP 500.
    #[serde(default)]
    pub server_error_page: Option<AuxiliaryPageConfig>,

    /// Redirects answered by the page router.
    #[serde(default)]
    pub redirects: Vec<RedirectConfig>,
}

/// Preferred protocol of the published site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    /// Scheme name as used in urls.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings shared by the whole content set.
///
/// All file paths are resolved against `root_directory`, which is both the
/// place resources are read from and the place generated files are written to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteOptions {
    /// Root directory of the site.
    pub root_directory: PathBuf,

    /// Domain the site is published at.
    pub domain: String,

    /// Port, if not the protocol default.
    #[serde(default)]
    pub port: Option<u16>,

    /// Protocol used to build absolute urls.
    #[serde(default)]
    pub protocol: Protocol,

    /// Whether `/sitemap.xml` is generated.
    #[serde(default)]
    pub use_sitemap: bool,

    /// Disables content hashing for cache busting.
    #[serde(default)]
    pub no_hashes: bool,

    /// Disables rendering pages that produce no files just to catch errors early.
    #[serde(default)]
    pub no_dynamic_generation_tests: bool,
}

/// Static resources of the site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Individual files served as-is.
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Directories whose files are all served as-is.
    #[serde(default)]
    pub directories: Vec<PathBuf>,

    /// Directory holding images.
    #[serde(default)]
    pub image_directory: Option<PathBuf>,

    /// Individual script files.
    #[serde(default)]
    pub script_files: Vec<PathBuf>,

    /// Directories whose `.js` files are served as scripts.
    #[serde(default)]
    pub script_directories: Vec<PathBuf>,
}

/// A stylesheet built by concatenating sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylesheetConfig {
    /// Url path the stylesheet is served at.
    pub url_path: String,

    /// Source files, in order.
    pub sources: Vec<PathBuf>,
}

/// A page at one url path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Url path of the page.
    pub url_path: String,

    /// Template file of the page.
    pub template: PathBuf,

    /// Whether the page is listed in the sitemap.
    #[serde(default = "default_true")]
    pub include_in_sitemap: bool,

    /// Whether a file is written for the page.
    #[serde(default = "default_true")]
    pub generate_file: bool,
}

/// A family of pages described by a url pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicPageConfig {
    /// Pattern segments; `{name}` marks a variable.
    pub pattern: Vec<String>,

    /// Value lists for the pattern variables.
    #[serde(default)]
    pub values: BTreeMap<String, Vec<String>>,

    /// Template file of the pages.
    pub template: PathBuf,

    /// Whether every concrete page is written to disk.
    #[serde(default)]
    pub render_to_files: bool,

    /// Whether the pages are left out of the sitemap.
    #[serde(default)]
    pub exclude_from_sitemap: bool,
}

/// Error page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuxiliaryPageConfig {
    /// Template file of the page.
    pub template: PathBuf,

    /// Url path the page is also reachable at.
    #[serde(default)]
    pub url_path: Option<String>,

    /// Whether the page is listed in the sitemap.
    #[serde(default)]
    pub include_in_sitemap: bool,

    /// Whether a file is written for the page.
    #[serde(default)]
    pub generate_file: bool,
}

/// A redirect answered by the page router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Url path being redirected.
    pub from: String,

    /// Redirect target.
    pub to: String,

    /// HTTP 301 when true, HTTP 302 otherwise.
    #[serde(default = "default_true")]
    pub permanent: bool,
}

fn default_true() -> bool {
    true
}

impl SiteOptions {
    /// Create options for a site rooted at `root_directory`.
    #[must_use]
    pub fn new(root_directory: impl Into<PathBuf>, domain: impl Into<String>) -> Self {
        Self {
            root_directory: root_directory.into(),
            domain: domain.into(),
            port: None,
            protocol: Protocol::default(),
            use_sitemap: false,
            no_hashes: false,
            no_dynamic_generation_tests: false,
        }
    }

    /// Set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Enable sitemap generation.
    #[must_use]
    pub fn with_sitemap(mut self) -> Self {
        self.use_sitemap = true;
        self
    }

    /// Disable content hashing.
    #[must_use]
    pub fn without_hashes(mut self) -> Self {
        self.no_hashes = true;
        self
    }

    /// Disable generation smoke tests.
    #[must_use]
    pub fn without_generation_tests(mut self) -> Self {
        self.no_dynamic_generation_tests = true;
        self
    }

    /// Whether hashes are computed during this build.
    #[must_use]
    pub fn use_hashes(&self) -> bool {
        !self.no_hashes
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(CoreError::config("site.domain cannot be empty"));
        }

        if self.root_directory.as_os_str().is_empty() {
            return Err(CoreError::config("site.root_directory cannot be empty"));
        }

        if self.domain.contains('/') {
            tracing::warn!(domain = %self.domain, "site.domain should not contain a path");
        }

        Ok(())
    }
}

impl Config {
    /// Load the manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the manifest, letting `LITHOGRAPH__*` environment variables override it.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let file = Self::read(path)?;
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&file)?)
            .add_source(config::Environment::with_prefix("LITHOGRAPH").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate the manifest.
    fn validate(&self) -> Result<()> {
        self.site.validate()?;

        let url_paths = self
            .pages
            .iter()
            .map(|p| p.url_path.as_str())
            .chain(self.stylesheets.iter().map(|s| s.url_path.as_str()))
            .chain(self.redirects.iter().map(|r| r.from.as_str()));

        for url_path in url_paths {
            if !url_path.starts_with('/') {
                return Err(CoreError::config(format!(
                    "url path must be absolute, got {url_path}"
                )));
            }
        }

        for page in &self.dynamic_pages {
            if page.pattern.is_empty() {
                return Err(CoreError::config(format!(
                    "dynamic page {} has an empty pattern",
                    page.template.display()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
root_directory = "public"
domain = "example.com"
port = 8080
protocol = "https"
use_sitemap = true

[resources]
directories = ["font"]
image_directory = "img"
script_directories = ["js"]

[[stylesheets]]
url_path = "/main.css"
sources = ["css/base.css", "css/layout.css"]

[[pages]]
url_path = "/"
template = "templates/index.html"

[[dynamic_pages]]
pattern = ["/animal/", "{animal}"]
template = "templates/animal.html"
render_to_files = true

[dynamic_pages.values]
animal = ["cat", "dog"]

[not_found_page]
template = "templates/404.html"
url_path = "/errors/404"
generate_file = true

[[redirects]]
from = "/about"
to = "/"
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("lithograph.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.domain, "example.com");
        assert_eq!(config.site.port, Some(8080));
        assert_eq!(config.site.protocol, Protocol::Https);
        assert!(config.site.use_sitemap);
        assert!(config.site.use_hashes());
        assert_eq!(config.resources.image_directory, Some(PathBuf::from("img")));
        assert_eq!(config.stylesheets[0].sources.len(), 2);
        assert!(config.pages[0].include_in_sitemap);
        assert!(config.pages[0].generate_file);
        assert_eq!(config.dynamic_pages[0].values["animal"], vec!["cat", "dog"]);
        assert!(config.dynamic_pages[0].render_to_files);
        let not_found = config.not_found_page.expect("not found page");
        assert!(not_found.generate_file);
        assert!(!not_found.include_in_sitemap);
        assert!(config.redirects[0].permanent);
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("lithograph.toml");
        let minimal_config = r#"
[site]
root_directory = "public"
domain = "localhost"
"#;
        std::fs::write(&config_path, minimal_config).expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.protocol, Protocol::Http);
        assert_eq!(config.site.port, None);
        assert!(!config.site.use_sitemap);
        assert!(!config.site.no_hashes);
        assert!(config.pages.is_empty());
        assert!(config.server_error_page.is_none());
    }

    #[test]
    fn test_config_validation_empty_domain() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("lithograph.toml");
        let config_content = r#"
[site]
root_directory = "public"
domain = ""
"#;
        std::fs::write(&config_path, config_content).expect("write");

        let result = Config::load(&config_path);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("domain cannot be empty")
        );
    }

    #[test]
    fn test_config_validation_relative_url_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("lithograph.toml");
        let config_content = r#"
[site]
root_directory = "public"
domain = "localhost"

[[pages]]
url_path = "about"
template = "about.html"
"#;
        std::fs::write(&config_path, config_content).expect("write");

        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("must be absolute"));
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/lithograph.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));

        let err = Config::load_with_env(Path::new("/nonexistent/lithograph.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_with_env_keeps_file_values() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("lithograph.toml");
        std::fs::write(&config_path, create_test_config()).expect("write");

        let from_file = Config::load(&config_path).expect("load config");
        let layered = Config::load_with_env(&config_path).expect("load config");

        assert_eq!(layered.site.domain, from_file.site.domain);
        assert_eq!(layered.site.port, from_file.site.port);
        assert_eq!(layered.pages.len(), from_file.pages.len());
        assert_eq!(
            layered.dynamic_pages[0].values["animal"],
            from_file.dynamic_pages[0].values["animal"]
        );
        assert_eq!(
            layered.not_found_page.and_then(|page| page.url_path),
            Some("/errors/404".to_string())
        );
    }

    #[test]
    fn test_site_options_builder() {
        let options = SiteOptions::new("public", "localhost")
            .with_port(8085)
            .with_sitemap()
            .without_hashes();

        assert_eq!(options.port, Some(8085));
        assert!(options.use_sitemap);
        assert!(!options.use_hashes());
        assert!(options.validate().is_ok());
    }
}
