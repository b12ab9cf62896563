//! The content set: stage machine and facade over every controller.
//!
//! A content set is defined in four stages, in order:
//!
//! 1. **widgets** - [`ContentSet::add_widget`], then [`ContentSet::done_with_widgets`]
//! 2. **resources** - stylesheets, scripts, images and plain files, then
//!    [`ContentSet::done_with_resources`]
//! 3. **pages** - pages, the page router and error pages, then
//!    [`ContentSet::done_with_pages`]
//! 4. **run** - [`ContentSet::describe`], [`ContentSet::load_content`] and
//!    [`ContentSet::write_all_to_disk`]
//!
//! Calling a definition method outside of its stage is an error naming both
//! the expected and the current stage.

use std::{fmt, path::Path, sync::Arc};

use lithograph_core::{SiteOptions, SitePaths};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::{
    controller::{ContentController, StageHook},
    controllers::{
        FileResourceController, ImageController, PageController, PageRouter, RouterResponse,
        RoutingController, ScriptController, SitemapController, StyleController,
        page::DEFAULT_SERVER_ERROR_BODY,
    },
    dispatch::Dispatcher,
    error::{GeneratorError, Result},
    hash::HashCache,
    item::{ContentItem, ContentSource},
    page::{AuxiliaryPage, DynamicPage, PageDefinition, PageHandle, StaticPage},
    pattern::{PatternDefinition, PatternMatcher},
    render::{RenderContext, RenderSlot, Widget},
    stage::Stage,
};

/// Current stage, and whether its completion hooks are running.
#[derive(Debug)]
struct StageState {
    current: Stage,
    completing: bool,
}

/// Clears the completing flag when a stage completion ends, however it ends.
struct CompletionGuard<'a> {
    state: &'a Mutex<StageState>,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().completing = false;
    }
}

/// Owns every controller of one site and the stage they are in.
pub struct ContentSet {
    options: SiteOptions,
    paths: SitePaths,
    stage: Mutex<StageState>,
    hashes: HashCache,
    render_slot: RenderSlot,

    sitemap: Arc<SitemapController>,
    scripts: Arc<ScriptController>,
    styles: Arc<StyleController>,
    images: Arc<ImageController>,
    pages: Arc<PageController>,
    files: Arc<FileResourceController>,
    routing: Arc<RoutingController>,

    dispatcher: Dispatcher,
}

impl fmt::Debug for ContentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentSet")
            .field("options", &self.options)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl ContentSet {
    /// Create a content set in the widgets stage.
    pub fn new(options: SiteOptions) -> Result<Self> {
        options.validate()?;
        let paths = SitePaths::new(&options)?;

        let sitemap = Arc::new(SitemapController::new(options.use_sitemap));
        let scripts = Arc::new(ScriptController::new());
        let styles = Arc::new(StyleController::new());
        let images = Arc::new(ImageController::new());
        let pages = Arc::new(PageController::new());
        let files = Arc::new(FileResourceController::new());
        let routing = Arc::new(RoutingController::new());

        // asset shaped controllers come before pages so catch-all routes
        // never shadow them; the router comes last and always answers
        let describe_order: Vec<Arc<dyn ContentController>> = vec![
            sitemap.clone(),
            scripts.clone(),
            styles.clone(),
            images.clone(),
            pages.clone(),
            files.clone(),
            routing.clone(),
        ];

        // stylesheets read hashes of the assets loaded by the first group
        let stage_groups: Vec<Vec<Arc<dyn ContentController>>> = vec![
            vec![scripts.clone(), images.clone(), files.clone()],
            vec![styles.clone()],
            vec![pages.clone()],
            vec![sitemap.clone()],
            vec![routing.clone()],
        ];

        info!(
            root = %paths.root_directory().display(),
            url_root = paths.url_root(),
            "content set created"
        );

        Ok(Self {
            options,
            paths,
            stage: Mutex::new(StageState {
                current: Stage::Widgets,
                completing: false,
            }),
            hashes: HashCache::new(),
            render_slot: RenderSlot::default(),
            sitemap,
            scripts,
            styles,
            images,
            pages,
            files,
            routing,
            dispatcher: Dispatcher::new(describe_order, stage_groups),
        })
    }

    #[must_use]
    pub fn options(&self) -> &SiteOptions {
        &self.options
    }

    #[must_use]
    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    #[must_use]
    pub fn hashes(&self) -> &HashCache {
        &self.hashes
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage.lock().current
    }

    #[must_use]
    pub fn sitemap(&self) -> &Arc<SitemapController> {
        &self.sitemap
    }

    #[must_use]
    pub fn scripts(&self) -> &Arc<ScriptController> {
        &self.scripts
    }

    #[must_use]
    pub fn styles(&self) -> &Arc<StyleController> {
        &self.styles
    }

    #[must_use]
    pub fn images(&self) -> &Arc<ImageController> {
        &self.images
    }

    #[must_use]
    pub fn pages(&self) -> &Arc<PageController> {
        &self.pages
    }

    #[must_use]
    pub fn files(&self) -> &Arc<FileResourceController> {
        &self.files
    }

    #[must_use]
    pub fn routing(&self) -> &Arc<RoutingController> {
        &self.routing
    }

    fn check_stage(&self, expected: Stage) -> Result<()> {
        let state = self.stage.lock();
        check_state(&state, expected)
    }

    async fn call_stage_events(&self, hook: StageHook) -> Result<()> {
        self.check_stage(hook.stage())?;
        self.dispatcher.broadcast(self, hook).await
    }

    /// Run the completion hooks of the current stage, then advance by one.
    ///
    /// The stage is marked as completing before any hook runs, so a second
    /// completion (or a definition call) racing with this one is rejected.
    async fn finish_stage(&self, hook: StageHook) -> Result<()> {
        let expected = hook.stage();
        let guard = {
            let mut state = self.stage.lock();
            check_state(&state, expected)?;
            state.completing = true;
            CompletionGuard { state: &self.stage }
        };

        self.dispatcher.broadcast(self, hook).await?;

        {
            let mut state = self.stage.lock();
            if let Some(next) = expected.next().filter(|_| state.current == expected) {
                info!(from = %expected, to = %next, "stage completed");
                state.current = next;
            }
        }
        drop(guard);
        Ok(())
    }

    /// Finish the widgets stage.
    pub async fn done_with_widgets(&self) -> Result<()> {
        self.finish_stage(StageHook::WidgetDefinitionCompleted).await
    }

    /// Finish the resources stage; loads resources and computes hashes.
    pub async fn done_with_resources(&self) -> Result<()> {
        self.finish_stage(StageHook::ResourceDefinitionCompleted).await
    }

    /// Finish the pages stage; the content set is ready to run afterwards.
    pub async fn done_with_pages(&self) -> Result<()> {
        self.finish_stage(StageHook::PagesDefinitionCompleted).await
    }

    /// Write every content item that has a file form into the root directory.
    pub async fn write_all_to_disk(&self) -> Result<()> {
        info!(root = %self.paths.root_directory().display(), "writing content to disk");
        self.call_stage_events(StageHook::WriteAllToDisk).await
    }

    /// Build a pattern matcher; allowed in any stage.
    pub fn create_pattern_matcher(&self, definition: PatternDefinition) -> Result<PatternMatcher> {
        PatternMatcher::new(definition)
    }

    /// Register a widget.
    pub fn add_widget<T, F>(&self, render: F) -> Result<Widget<T>>
    where
        T: ?Sized,
        F: Fn(&RenderContext<'_>, &T) -> Result<String> + Send + Sync + 'static,
    {
        self.check_stage(Stage::Widgets)?;
        Ok(Widget::new(render))
    }

    /// Register a stylesheet produced by `build`.
    pub fn add_stylesheet<F>(&self, url_path: &str, build: F) -> Result<()>
    where
        F: Fn(&RenderContext<'_>) -> Result<String> + Send + Sync + 'static,
    {
        self.check_stage(Stage::Resources)?;
        self.paths.check_url_path_is_absolute_file_path(url_path)?;
        debug!(url = url_path, "stylesheet added");
        self.styles.add(url_path.to_string(), Arc::new(build))
    }

    /// Register an existing script file.
    pub fn add_script_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.check_stage(Stage::Resources)?;
        let path = self.paths.resolve_file_path(path)?;
        debug!(path = %path.display(), "script file added");
        self.scripts.add_file(path);
        Ok(())
    }

    /// Register every `.js` file below a directory.
    pub fn add_script_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        self.check_stage(Stage::Resources)?;
        let path = self.paths.resolve_file_path(path)?;
        debug!(path = %path.display(), "script directory added");
        self.scripts.add_directory(path);
        Ok(())
    }

    /// Register a script produced by `build`.
    pub fn add_generated_script<F>(&self, url_path: &str, build: F) -> Result<()>
    where
        F: Fn(&RenderContext<'_>) -> Result<String> + Send + Sync + 'static,
    {
        self.check_stage(Stage::Resources)?;
        self.paths.check_url_path_is_absolute_file_path(url_path)?;
        debug!(url = url_path, "generated script added");
        self.scripts.add_generated(url_path.to_string(), Arc::new(build))
    }

    /// Set the directory images are served from.
    pub fn set_image_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        self.check_stage(Stage::Resources)?;
        let path = self.paths.resolve_file_path(path)?;
        debug!(path = %path.display(), "image directory set");
        self.images.set_directory(path)
    }

    /// Register a plain file.
    pub fn add_resource(&self, path: impl AsRef<Path>) -> Result<()> {
        self.check_stage(Stage::Resources)?;
        let path = self.paths.resolve_file_path(path)?;
        debug!(path = %path.display(), "resource added");
        self.files.add_file(path);
        Ok(())
    }

    /// Register every file below a directory.
    pub fn add_resource_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        self.check_stage(Stage::Resources)?;
        let path = self.paths.resolve_file_path(path)?;
        debug!(path = %path.display(), "resource directory added");
        self.files.add_directory(path);
        Ok(())
    }

    /// Register a page at a single url path.
    pub fn add_static_page(&self, page: StaticPage) -> Result<PageHandle> {
        self.check_stage(Stage::Pages)?;
        self.pages.add_static_page(page, &self.paths)
    }

    /// Register a family of pages described by a pattern.
    pub fn add_dynamic_page(&self, page: DynamicPage) -> Result<PageHandle> {
        self.check_stage(Stage::Pages)?;
        self.pages.add_dynamic_page(page, &self.paths)
    }

    /// Register a generic page.
    pub fn add_page(&self, page: PageDefinition) -> Result<PageHandle> {
        self.check_stage(Stage::Pages)?;
        self.pages.add_page(page, &self.paths)
    }

    /// Set the router consulted for url paths no controller claims.
    pub fn set_page_router<F>(&self, router: F) -> Result<()>
    where
        F: Fn(&str) -> RouterResponse + Send + Sync + 'static,
    {
        self.check_stage(Stage::Pages)?;
        let router: PageRouter = Arc::new(router);
        self.routing.set_router(router)
    }

    /// Set the page served with HTTP 500.
    pub fn set_server_error_page(&self, page: AuxiliaryPage) -> Result<()> {
        self.check_stage(Stage::Pages)?;
        self.pages.set_server_error_page(page, &self.paths)
    }

    /// Set the page served with HTTP 404.
    pub fn set_not_found_page(&self, page: AuxiliaryPage) -> Result<()> {
        self.check_stage(Stage::Pages)?;
        self.pages.set_not_found_page(page, &self.paths)
    }

    /// Describe the content item at `url_path`.
    ///
    /// Controllers are probed in a fixed priority order; the first answer
    /// wins. The terminal router answers everything, so running out of
    /// controllers is an internal error.
    pub fn describe(&self, url_path: &str) -> Result<ContentItem> {
        self.dispatcher
            .probe(url_path)
            .ok_or_else(|| GeneratorError::RoutingInvariantViolation {
                url_path: url_path.to_string(),
            })
    }

    /// Produce the bytes of a described item.
    pub async fn load_content(&self, item: &ContentItem) -> Result<Vec<u8>> {
        match &item.source {
            ContentSource::File(path) => tokio::fs::read(path).await.map_err(|e| {
                GeneratorError::upstream(format!("reading {}", path.display()), e)
            }),
            ContentSource::Generated(produce) => produce(self),
        }
    }

    /// Render every page once without writing anything.
    pub fn run_generation_tests(&self) -> Result<usize> {
        self.check_stage(Stage::Run)?;
        let rendered = self.pages.run_generation_tests(self)?;
        info!(count = rendered, "generation tests passed");
        Ok(rendered)
    }

    /// Body for an HTTP 500 response.
    ///
    /// Falls back to a fixed body when the server-error page itself fails.
    pub fn server_error_page_content(&self) -> Result<String> {
        self.check_stage(Stage::Run)?;
        Ok(self
            .pages
            .server_error_content(self)
            .unwrap_or_else(|e| {
                error!(error = %e, "failed to generate error page");
                DEFAULT_SERVER_ERROR_BODY.to_string()
            }))
    }

    /// Run `render` with a fresh render context for `url_path`.
    ///
    /// Only one such render may be in progress at a time; the slot is freed
    /// however `render` ends.
    pub(crate) fn with_render_context<T>(
        &self,
        url_path: &str,
        render: impl FnOnce(&RenderContext<'_>) -> Result<T>,
    ) -> Result<T> {
        self.check_stage(Stage::Run)?;
        let _guard = self.render_slot.acquire(url_path)?;
        render(&RenderContext::new(self, url_path))
    }

    /// A render context outside of the single-render guard, for builders.
    pub(crate) fn render_context(&self, url_path: &str) -> RenderContext<'_> {
        RenderContext::new(self, url_path)
    }
}

fn check_state(state: &StageState, expected: Stage) -> Result<()> {
    if state.current != expected {
        return Err(GeneratorError::StageViolation {
            expected,
            actual: state.current,
        });
    }
    if state.completing {
        return Err(GeneratorError::StageInTransition {
            stage: state.current,
        });
    }
    Ok(())
}
