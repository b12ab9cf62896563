//! Build command - define the site and write it to disk

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};

use crate::site::SiteManifest;

/// Run the build command.
pub async fn run(config_path: &Path, root: Option<&Path>) -> Result<()> {
    let start = Instant::now();

    tracing::info!(?config_path, ?root, "Starting build");

    let mut manifest = SiteManifest::load(config_path)?;
    if let Some(root) = root {
        manifest = manifest.with_root(root);
    }

    let site = manifest.assemble().await.wrap_err("Failed to define site")?;
    site.write_all_to_disk().await.wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Pages:       {}", site.pages().page_count());
    println!("  Stylesheets: {}", site.styles().url_paths().len());
    println!("  Scripts:     {}", site.scripts().url_paths().len());
    println!("  Images:      {}", site.images().images().len());
    println!("  Files:       {}", site.files().url_paths().len());
    println!();
    println!("  Duration:    {:.2}s", duration.as_secs_f64());
    println!("  Output:      {}", site.paths().root_directory().display());
    println!();

    tracing::info!(?duration, "Build completed successfully");

    Ok(())
}
