//! Images from the image directory.

use std::{collections::BTreeMap, path::PathBuf};

use lithograph_core::mime;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::{
    content_set::ContentSet,
    controller::{ContentController, HookFuture},
    error::{GeneratorError, Result},
    files::list_files,
    item::ContentItem,
};

/// Lowercase extensions recognized as images.
pub const SUPPORTED_FORMATS: [&str; 6] = ["jpg", "jpeg", "png", "svg", "webp", "gif"];

/// What is known about one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub url_path: String,
    /// Lowercase file extension.
    pub format: String,
    pub hash: Option<String>,
}

#[derive(Debug, Clone)]
struct KnownImage {
    info: ImageInfo,
    path: PathBuf,
}

#[derive(Debug, Default)]
pub struct ImageController {
    directory: Mutex<Option<PathBuf>>,
    known: RwLock<BTreeMap<String, KnownImage>>,
}

impl ImageController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_directory(&self, path: PathBuf) -> Result<()> {
        let mut directory = self.directory.lock();
        if let Some(existing) = directory.as_ref() {
            return Err(GeneratorError::duplicate(
                "image directory",
                existing.display().to_string(),
            ));
        }
        *directory = Some(path);
        Ok(())
    }

    /// Information about a known image.
    pub fn image_info(&self, url_path: &str) -> Result<ImageInfo> {
        self.known
            .read()
            .get(url_path)
            .map(|image| image.info.clone())
            .ok_or_else(|| {
                GeneratorError::Lookup(format!("Image is requested, but not found: {url_path}"))
            })
    }

    /// Every known image.
    #[must_use]
    pub fn images(&self) -> Vec<ImageInfo> {
        self.known
            .read()
            .values()
            .map(|image| image.info.clone())
            .collect()
    }

    async fn load(&self, site: &ContentSet) -> Result<()> {
        let Some(directory) = self.directory.lock().clone() else {
            debug!("no image directory set");
            return Ok(());
        };

        let mut loaded = BTreeMap::new();
        for path in list_files(&directory).await? {
            let format = mime::extension_of(&path);
            if !SUPPORTED_FORMATS.contains(&format.as_str()) {
                continue;
            }

            let url_path = site.paths().file_path_to_url_path(&path)?;
            let hash = if site.options().use_hashes() {
                Some(site.hashes().file_hash(&path).await?)
            } else {
                None
            };

            let info = ImageInfo {
                url_path: url_path.clone(),
                format,
                hash,
            };
            loaded.insert(url_path, KnownImage { info, path });
        }

        info!(count = loaded.len(), directory = %directory.display(), "images loaded");
        *self.known.write() = loaded;
        Ok(())
    }
}

impl ContentController for ImageController {
    fn name(&self) -> &'static str {
        "images"
    }

    fn describe(&self, url_path: &str) -> Option<ContentItem> {
        let known = self.known.read();
        let image = known.get(url_path)?;
        let mime = mime::for_extension(&image.info.format).unwrap_or(mime::BYTES);
        Some(ContentItem::file(url_path, mime, image.path.clone()).with_hash(image.info.hash.clone()))
    }

    fn on_resource_definition_completed<'a>(
        &'a self,
        site: &'a ContentSet,
    ) -> Option<HookFuture<'a>> {
        Some(Box::pin(self.load(site)))
    }
}
