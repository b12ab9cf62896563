//! Lithograph CLI Library
//!
//! This library provides the functionality behind the `lithograph` binary:
//! turning a site manifest into a content set, and the commands that build,
//! check or serve it.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, serve, check)
//! - [`site`] - Content set assembly from a site manifest
//! - [`server`] - HTTP boundary answering requests from the content set
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use lithograph::cmd;
//!
//! # async fn build() -> color_eyre::eyre::Result<()> {
//! cmd::build::run(Path::new("lithograph.toml"), None).await?;
//! # Ok(())
//! # }
//! ```

pub mod cmd;
pub mod server;
pub mod site;

pub use lithograph_core::Config;
pub use lithograph_generator::ContentSet;

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// lithograph::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
