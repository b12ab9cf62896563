//! The content controller contract.

use futures::future::BoxFuture;

use crate::{content_set::ContentSet, error::Result, item::ContentItem, stage::Stage};

/// Future returned by a stage hook.
pub type HookFuture<'a> = BoxFuture<'a, Result<()>>;

/// Owner of one category of content.
///
/// `describe` is a read-only probe and must never block on I/O. Hooks are
/// optional: a controller returns `None` from the hooks it does not care
/// about, and the dispatcher skips it. Private state is filled during the
/// controller's own stage and only read afterwards.
pub trait ContentController: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// What this controller has at `url_path`, if anything.
    fn describe(&self, url_path: &str) -> Option<ContentItem>;

    /// Whether this controller has a found item at `url_path`.
    fn has_content_item(&self, url_path: &str) -> bool {
        self.describe(url_path)
            .is_some_and(|item| item.response.is_ok())
    }

    fn on_widget_definition_completed<'a>(
        &'a self,
        _site: &'a ContentSet,
    ) -> Option<HookFuture<'a>> {
        None
    }

    fn on_resource_definition_completed<'a>(
        &'a self,
        _site: &'a ContentSet,
    ) -> Option<HookFuture<'a>> {
        None
    }

    fn on_pages_definition_completed<'a>(
        &'a self,
        _site: &'a ContentSet,
    ) -> Option<HookFuture<'a>> {
        None
    }

    fn on_write_all_to_disk<'a>(&'a self, _site: &'a ContentSet) -> Option<HookFuture<'a>> {
        None
    }
}

/// Selects one of the controller hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageHook {
    WidgetDefinitionCompleted,
    ResourceDefinitionCompleted,
    PagesDefinitionCompleted,
    WriteAllToDisk,
}

impl StageHook {
    /// Stage the hook runs in.
    #[must_use]
    pub fn stage(self) -> Stage {
        match self {
            Self::WidgetDefinitionCompleted => Stage::Widgets,
            Self::ResourceDefinitionCompleted => Stage::Resources,
            Self::PagesDefinitionCompleted => Stage::Pages,
            Self::WriteAllToDisk => Stage::Run,
        }
    }

    /// Start this hook on a controller, if it has one.
    pub fn select<'a>(
        self,
        controller: &'a dyn ContentController,
        site: &'a ContentSet,
    ) -> Option<HookFuture<'a>> {
        match self {
            Self::WidgetDefinitionCompleted => controller.on_widget_definition_completed(site),
            Self::ResourceDefinitionCompleted => controller.on_resource_definition_completed(site),
            Self::PagesDefinitionCompleted => controller.on_pages_definition_completed(site),
            Self::WriteAllToDisk => controller.on_write_all_to_disk(site),
        }
    }
}
