//! Lithograph Core Library
//!
//! Site configuration, error handling and the url path / file path helpers
//! shared by the Lithograph generator and command line tool.

pub mod config;
pub mod error;
pub mod mime;
pub mod paths;

pub use config::{
    AuxiliaryPageConfig, Config, DynamicPageConfig, PageConfig, Protocol, RedirectConfig,
    ResourcesConfig, SiteOptions, StylesheetConfig,
};
pub use error::{CoreError, Result};
pub use paths::SitePaths;
