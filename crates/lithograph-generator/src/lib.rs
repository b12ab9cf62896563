//! Lithograph Generator Library
//!
//! Staged content pipeline: a [`ContentSet`] owns a fixed set of content
//! controllers, walks them through the widgets, resources and pages stages,
//! and then answers "what lives at this url path" for a server or writes
//! every item to disk.
//!
//! # Modules
//!
//! - [`content_set`] - stage machine and registration facade
//! - [`controllers`] - built-in content controllers
//! - [`dispatch`] - describe probing and grouped stage broadcasts
//! - [`pattern`] - url path patterns with enumerable variables
//! - [`page`] - page definitions
//! - [`render`] - render context, widgets and the single-render guard
//! - [`template`] - HTML templates with variable interpolation
//! - [`hash`] - content hashes for cache busting

pub mod content_set;
pub mod controller;
pub mod controllers;
pub mod dispatch;
pub mod error;
pub mod files;
pub mod hash;
pub mod item;
pub mod page;
pub mod pattern;
pub mod prefix_tree;
pub mod render;
pub mod stage;
pub mod template;

pub use content_set::ContentSet;
pub use controller::{ContentController, HookFuture, StageHook};
pub use controllers::{ImageInfo, RouterResponse};
pub use error::{GeneratorError, Result};
pub use item::{ContentItem, ContentSource, ResponseKind};
pub use page::{AuxiliaryPage, DynamicPage, PageDefinition, PageHandle, StaticPage, UrlPathSet};
pub use pattern::{Captures, PatternDefinition, PatternMatcher, PatternSegment};
pub use render::{RenderContext, Widget};
pub use stage::Stage;
pub use template::{Template, TemplateContext, TemplateRegistry};
