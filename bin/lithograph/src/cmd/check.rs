//! Check command - define the site and render everything once

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use lithograph_generator::ContentSet;

use crate::site::SiteManifest;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Run the check command.
///
/// Defines the whole site, renders every page at its generation test url
/// path and loads every stylesheet and script. Nothing is written.
pub async fn run(config_path: &Path) -> Result<()> {
    tracing::info!(?config_path, "Checking site");

    let mut result = ValidationResult::default();

    println!("Checking manifest...");
    let manifest = match SiteManifest::load(config_path) {
        Ok(manifest) => {
            println!("  ✓ Manifest valid");
            Some(manifest)
        }
        Err(e) => {
            result.add_error(format!("Manifest error: {e:#}"));
            println!("  ✗ Manifest invalid: {e}");
            None
        }
    };

    if let Some(manifest) = manifest {
        println!("\nDefining site...");
        match manifest.assemble().await {
            Ok(site) => {
                println!("  ✓ Site defined");
                println!("\nRendering content...");
                check_content(&site, &mut result).await;
            }
            Err(e) => {
                result.add_error(format!("Definition error: {e:#}"));
                println!("  ✗ Site definition failed: {e}");
            }
        }
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if !result.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Check failed with {} error(s)", result.errors.len());
    }

    println!();
    println!("All checks passed!");
    Ok(())
}

async fn check_content(site: &ContentSet, result: &mut ValidationResult) {
    if site.pages().page_count() == 0 {
        result.add_warning("No pages are defined");
    }

    match site.run_generation_tests() {
        Ok(count) => println!("  ✓ {count} page(s) rendered"),
        Err(e) => result.add_error(format!("Page generation failed: {e}")),
    }

    let assets = site
        .styles()
        .url_paths()
        .into_iter()
        .chain(site.scripts().url_paths());
    for url_path in assets {
        let loaded = match site.describe(&url_path) {
            Ok(item) => site.load_content(&item).await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = loaded {
            result.add_error(format!("{url_path}: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_manifest(dir: &Path, template: &str) {
        fs::write(
            dir.join("lithograph.toml"),
            r#"
[site]
root_directory = "public"
domain = "example.com"

[[dynamic_pages]]
pattern = ["/tag/", "{tag}"]
template = "tag.html"

[dynamic_pages.values]
tag = ["rust", "web"]
"#,
        )
        .unwrap();
        fs::write(dir.join("tag.html"), template).unwrap();
    }

    #[tokio::test]
    async fn test_check_passes_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "<h1>{{ tag }}</h1>");

        run(&dir.path().join("lithograph.toml")).await.unwrap();
        assert!(!dir.path().join("public/tag/rust.html").exists());
    }

    #[tokio::test]
    async fn test_check_reports_render_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "<h1>{{ missing }}</h1>");

        let err = run(&dir.path().join("lithograph.toml")).await.unwrap_err();
        assert!(err.to_string().contains("Check failed with 1 error(s)"));
    }

    #[tokio::test]
    async fn test_check_reports_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("lithograph.toml")).await.is_err());
    }
}
