//! Filesystem helpers shared by controllers.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{GeneratorError, Result};

/// Write a file, creating missing parent directories.
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let write = async {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents.as_ref()).await
    };

    write
        .await
        .map_err(|e| GeneratorError::upstream(format!("writing {}", path.display()), e))?;
    debug!(path = %path.display(), "file written");
    Ok(())
}

/// All files below `dir`, recursively, in a stable order.
pub async fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let root = dir.to_path_buf();
    let listing = tokio::task::spawn_blocking(move || {
        WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
            .collect::<std::result::Result<Vec<_>, _>>()
    })
    .await
    .map_err(|e| GeneratorError::upstream(format!("listing {}", dir.display()), e))?;

    listing.map_err(|e| GeneratorError::upstream(format!("listing {}", dir.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animal/cat.html");

        write_file(&path, "<h1>cat</h1>").await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<h1>cat</h1>");
    }

    #[tokio::test]
    async fn test_list_files_recursive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("img/nested")).unwrap();
        std::fs::write(dir.path().join("img/b.png"), "b").unwrap();
        std::fs::write(dir.path().join("img/a.png"), "a").unwrap();
        std::fs::write(dir.path().join("img/nested/c.svg"), "c").unwrap();

        let files = list_files(&dir.path().join("img")).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            [
                PathBuf::from("img/a.png"),
                PathBuf::from("img/b.png"),
                PathBuf::from("img/nested/c.svg"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(&dir.path().join("nope")).await.is_err());
    }
}
