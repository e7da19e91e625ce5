//! CLI entry point for blogctl

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogctl::commands;
use blogctl::content::Mode;
use blogctl::{BuildError, Site};

#[derive(Parser)]
#[command(name = "blogctl")]
#[command(version)]
#[command(about = "Build driver for a Markdown blog rendered by an external static site generator", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview the site with drafts, then remove the generated directories
    #[command(alias = "s")]
    Serve,

    /// Build the production site (minified, no drafts)
    #[command(alias = "b")]
    Build,

    /// Remove the generated output and resources directories
    Clean,

    /// List what a build renders
    List {
        /// Type of content to list (post, page, draft, tag)
        #[arg(default_value = "post")]
        r#type: String,

        /// List as the preview server sees it (drafts included)
        #[arg(long)]
        drafts: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Report malformed front matter and missing referenced files
    Check,

    /// Create a new draft post
    New {
        /// Title of the new post
        title: String,

        /// Section directory under the content directory
        #[arg(short, long)]
        section: Option<String>,

        /// Create a page bundle (<slug>/index.md)
        #[arg(short, long)]
        bundle: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blogctl=debug,info"
    } else {
        "blogctl=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    let code = match cli.command {
        Commands::Serve => {
            let site = Site::new(&base_dir)?;
            invocation_exit(site.serve().await)
        }

        Commands::Build => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Building site in {:?}", site.base_dir);
            invocation_exit(site.build().await)
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            let report = site.clean()?;
            if report.is_empty() {
                println!("Nothing to clean.");
            } else {
                println!("Cleaned successfully!");
            }
            0
        }

        Commands::List {
            r#type,
            drafts,
            json,
        } => {
            let site = Site::new(&base_dir)?;
            let mode = if drafts { Mode::Preview } else { Mode::Production };
            commands::list::run(&site, &r#type, mode, json)?;
            0
        }

        Commands::Check => {
            let site = Site::new(&base_dir)?;
            commands::check::run(&site)?
        }

        Commands::New {
            title,
            section,
            bundle,
        } => {
            let site = Site::new(&base_dir)?;
            tracing::debug!("Creating new post with title: {}", title);
            let options = commands::new::NewPost {
                title: &title,
                section: section.as_deref(),
                bundle,
            };
            commands::new::run(&site, &options)?;
            0
        }

        Commands::Version => {
            println!("blogctl version {}", env!("CARGO_PKG_VERSION"));
            0
        }
    };

    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

/// Generator exit codes pass through; tool failures are logged and mapped
fn invocation_exit(result: Result<i32, BuildError>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            e.exit_code()
        }
    }
}
