//! Plain files served as they are.

use std::{collections::BTreeMap, path::PathBuf};

use lithograph_core::mime;
use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::{
    content_set::ContentSet,
    controller::{ContentController, HookFuture},
    error::Result,
    files::list_files,
    item::ContentItem,
};

#[derive(Debug, Clone)]
struct KnownFile {
    path: PathBuf,
    hash: Option<String>,
}

/// Files inside the root directory we make no assumptions about.
#[derive(Debug, Default)]
pub struct FileResourceController {
    pending_files: Mutex<Vec<PathBuf>>,
    directories: Mutex<Vec<PathBuf>>,
    known: RwLock<BTreeMap<String, KnownFile>>,
}

impl FileResourceController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_file(&self, path: PathBuf) {
        self.pending_files.lock().push(path);
    }

    pub(crate) fn add_directory(&self, path: PathBuf) {
        self.directories.lock().push(path);
    }

    /// Url paths of every known file.
    #[must_use]
    pub fn url_paths(&self) -> Vec<String> {
        self.known.read().keys().cloned().collect()
    }

    async fn load(&self, site: &ContentSet) -> Result<()> {
        let mut paths = self.pending_files.lock().clone();
        let directories = self.directories.lock().clone();
        for directory in &directories {
            paths.extend(list_files(directory).await?);
        }

        let mut loaded = BTreeMap::new();
        for path in paths {
            let url_path = site.paths().file_path_to_url_path(&path)?;
            let hash = if site.options().use_hashes() {
                Some(site.hashes().file_hash(&path).await?)
            } else {
                None
            };
            loaded.insert(url_path, KnownFile { path, hash });
        }

        info!(count = loaded.len(), "file resources loaded");
        self.known.write().extend(loaded);
        Ok(())
    }
}

impl ContentController for FileResourceController {
    fn name(&self) -> &'static str {
        "files"
    }

    fn describe(&self, url_path: &str) -> Option<ContentItem> {
        let known = self.known.read();
        let file = known.get(url_path)?;
        Some(
            ContentItem::file(url_path, mime::for_path(&file.path), file.path.clone())
                .with_hash(file.hash.clone()),
        )
    }

    fn on_resource_definition_completed<'a>(
        &'a self,
        site: &'a ContentSet,
    ) -> Option<HookFuture<'a>> {
        Some(Box::pin(self.load(site)))
    }
}
