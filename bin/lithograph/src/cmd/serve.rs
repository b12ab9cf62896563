//! Serve command - answer HTTP requests from the content set

use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;

use crate::{server::create_router, site::SiteManifest};

/// Port used when neither the CLI nor the manifest names one.
pub const DEFAULT_PORT: u16 = 8085;

/// Run the serve command.
pub async fn run(config_path: &Path, port: Option<u16>) -> Result<()> {
    let mut manifest = SiteManifest::load(config_path)?;
    if let Some(port) = port {
        manifest = manifest.with_port(port);
    }
    let port = manifest.config().site.port.unwrap_or(DEFAULT_PORT);

    tracing::info!(?config_path, port, "Starting server");

    let site = manifest.assemble().await.wrap_err("Failed to define site")?;
    let app = create_router(Arc::new(site));
    let addr = format!("127.0.0.1:{port}");

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Server running at http://{addr}");
    println!("  Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app).await.wrap_err("Server error")?;

    Ok(())
}
