//! Scripts: existing `.js` files and scripts produced by builder functions.
//!
//! Bundling or compiling scripts happens outside of this crate; a builder
//! function is handed a render context and returns the finished code.

use std::{collections::BTreeMap, path::PathBuf};

use lithograph_core::mime;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::{
    content_set::ContentSet,
    controller::{ContentController, HookFuture},
    error::{GeneratorError, Result},
    files::{list_files, write_file},
    hash::content_hash,
    item::ContentItem,
    render::RenderFn,
};

#[derive(Clone)]
enum ScriptSource {
    File(PathBuf),
    Generated(RenderFn),
}

#[derive(Clone)]
struct KnownScript {
    source: ScriptSource,
    hash: Option<String>,
}

#[derive(Default)]
pub struct ScriptController {
    files: Mutex<Vec<PathBuf>>,
    directories: Mutex<Vec<PathBuf>>,
    generated: Mutex<BTreeMap<String, RenderFn>>,
    known: RwLock<BTreeMap<String, KnownScript>>,
}

impl ScriptController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_file(&self, path: PathBuf) {
        self.files.lock().push(path);
    }

    pub(crate) fn add_directory(&self, path: PathBuf) {
        self.directories.lock().push(path);
    }

    pub(crate) fn add_generated(&self, url_path: String, build: RenderFn) -> Result<()> {
        let mut generated = self.generated.lock();
        if generated.contains_key(&url_path) {
            return Err(GeneratorError::duplicate("generated script", url_path));
        }
        generated.insert(url_path, build);
        Ok(())
    }

    /// Url paths of every known script.
    #[must_use]
    pub fn url_paths(&self) -> Vec<String> {
        self.known.read().keys().cloned().collect()
    }

    fn build(site: &ContentSet, url_path: &str, build: &RenderFn) -> Result<String> {
        build(&site.render_context(url_path))
            .map_err(|e| GeneratorError::upstream(format!("building script {url_path}"), e))
    }

    async fn load(&self, site: &ContentSet) -> Result<()> {
        let mut files = Vec::new();
        let directories = self.directories.lock().clone();
        for directory in &directories {
            files.extend(
                list_files(directory)
                    .await?
                    .into_iter()
                    .filter(|path| mime::extension_of(path) == "js"),
            );
        }
        files.extend(self.files.lock().iter().cloned());

        let mut sources = BTreeMap::new();
        for path in files {
            let url_path = site.paths().file_path_to_url_path(&path)?;
            sources.insert(url_path, ScriptSource::File(path));
        }
        let generated = self.generated.lock().clone();
        for (url_path, build) in generated {
            sources.insert(url_path, ScriptSource::Generated(build));
        }

        let use_hashes = site.options().use_hashes();
        let mut loaded = BTreeMap::new();
        for (url_path, source) in sources {
            let hash = match (&source, use_hashes) {
                (_, false) => None,
                (ScriptSource::File(path), true) => Some(site.hashes().file_hash(path).await?),
                (ScriptSource::Generated(build), true) => {
                    let code = Self::build(site, &url_path, build)?;
                    Some(content_hash(code.as_bytes()))
                }
            };
            loaded.insert(url_path, KnownScript { source, hash });
        }

        info!(count = loaded.len(), "scripts loaded");
        *self.known.write() = loaded;
        Ok(())
    }

    async fn write(&self, site: &ContentSet) -> Result<()> {
        let generated = self.generated.lock().clone();
        for (url_path, build) in generated {
            let path = site.paths().url_path_to_file_path(&url_path)?;
            let code = Self::build(site, &url_path, &build)?;
            write_file(&path, code).await?;
            debug!(url = %url_path, "generated script written");
        }
        Ok(())
    }
}

impl ContentController for ScriptController {
    fn name(&self) -> &'static str {
        "scripts"
    }

    fn describe(&self, url_path: &str) -> Option<ContentItem> {
        let script = self.known.read().get(url_path).cloned()?;
        let item = match script.source {
            ScriptSource::File(path) => ContentItem::file(url_path, mime::JS, path),
            ScriptSource::Generated(build) => {
                let owned = url_path.to_string();
                ContentItem::generated(url_path, mime::JS, move |site| {
                    Self::build(site, &owned, &build).map(String::into_bytes)
                })
            }
        };
        Some(item.with_hash(script.hash))
    }

    fn on_resource_definition_completed<'a>(
        &'a self,
        site: &'a ContentSet,
    ) -> Option<HookFuture<'a>> {
        Some(Box::pin(self.load(site)))
    }

    fn on_write_all_to_disk<'a>(&'a self, site: &'a ContentSet) -> Option<HookFuture<'a>> {
        Some(Box::pin(self.write(site)))
    }
}
