//! Built-in content controllers.
//!
//! - [`sitemap`] - `/sitemap.xml` listing every page
//! - [`script`] - script files and generated scripts
//! - [`style`] - stylesheets produced by builder functions
//! - [`image`] - images from one image directory
//! - [`page`] - static, pattern-defined and error pages
//! - [`file`] - any other files served as-is
//! - [`routing`] - the terminal router; always answers

pub mod file;
pub mod image;
pub mod page;
pub mod routing;
pub mod script;
pub mod sitemap;
pub mod style;

pub use file::FileResourceController;
pub use image::{ImageController, ImageInfo};
pub use page::PageController;
pub use routing::{PageRouter, RouterResponse, RoutingController};
pub use script::ScriptController;
pub use sitemap::SitemapController;
pub use style::StyleController;
