//! Lithograph CLI
//!
//! Staged static site generator and content server.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Lithograph.
#[derive(Parser)]
#[command(
    name = "lithograph",
    version,
    about = "A staged static site generator and content server"
)]
struct Cli {
    /// Path to the site manifest
    #[arg(short, long, default_value = "lithograph.toml")]
    config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Define the site and write every content item to disk
    Build {
        /// Override the site root directory
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
    /// Serve the site straight from the content set
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Define the site and render every page once, writing nothing
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    lithograph::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { root } => {
            lithograph::cmd::build::run(&cli.config, root.as_deref()).await?;
        }
        Commands::Serve { port } => {
            lithograph::cmd::serve::run(&cli.config, port).await?;
        }
        Commands::Check => {
            lithograph::cmd::check::run(&cli.config).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_build_command_parsing() {
        let args = ["lithograph", "build", "--root", "dist"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, PathBuf::from("lithograph.toml"));
        assert_eq!(cli.verbose, 0);

        match cli.command {
            Commands::Build { root } => {
                assert_eq!(root, Some(PathBuf::from("dist")));
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_build_without_override() {
        let cli = Cli::parse_from(["lithograph", "build"]);
        match cli.command {
            Commands::Build { root } => assert!(root.is_none()),
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_serve_command_parsing() {
        let args = ["lithograph", "serve", "--port", "8080"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Serve { port } => assert_eq!(port, Some(8080)),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_check_command_parsing() {
        let cli = Cli::parse_from(["lithograph", "check"]);
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_cli_global_options() {
        let args = ["lithograph", "-c", "site/lithograph.toml", "-vvv", "check"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, PathBuf::from("site/lithograph.toml"));
        assert_eq!(cli.verbose, 3);
    }
}
