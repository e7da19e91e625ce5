//! blogctl: content store and build driver for a Markdown blog
//!
//! The blog's pages are rendered by an external static site generator.
//! This crate owns everything around it: parsing post front matter,
//! deciding which posts a build renders, invoking the generator for
//! `serve`, `build` and `clean`, and removing the generated directories.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;

use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};

pub use error::{BuildError, BuildResult};

/// The main site handle
#[derive(Debug, Clone)]
pub struct Site {
    /// Tool configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory (authoritative, never deleted)
    pub content_dir: PathBuf,
    /// Generated output directory
    pub public_dir: PathBuf,
    /// Generator's intermediate resources directory
    pub resources_dir: PathBuf,
    /// Whether future-dated posts are rendered
    pub build_future: bool,
    /// Content paths the generator ignores
    pub ignore_files: Vec<Regex>,
}

impl Site {
    /// Create a new site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(config::CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Create a site with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Result<Self> {
        let (generator_path, generator) = config::GeneratorSiteConfig::discover(&base_dir)?;

        let resolve = |ours: &Option<String>, theirs: &Option<String>, fallback: &str| {
            let name = ours.as_deref().or(theirs.as_deref()).unwrap_or(fallback);
            base_dir.join(name)
        };

        let content_dir = resolve(&config.content_dir, &generator.content_dir, "content");
        let public_dir = resolve(&config.public_dir, &generator.publish_dir, "public");
        let resources_dir = resolve(&config.resources_dir, &generator.resource_dir, "resources");
        let build_future = config.build_future || generator.build_future.unwrap_or(false);

        let ignore_files = generator
            .ignore_files
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| BuildError::Config {
                    path: generator_path.clone().unwrap_or_default(),
                    message: format!("invalid ignoreFiles pattern {:?}: {}", pattern, e),
                })
            })
            .collect::<BuildResult<Vec<_>>>()?;

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            resources_dir,
            build_future,
            ignore_files,
        })
    }

    /// Directories `clean` and post-serve cleanup may delete
    pub fn artifact_dirs(&self) -> [&Path; 2] {
        [self.public_dir.as_path(), self.resources_dir.as_path()]
    }

    /// Load the content store
    pub fn load_content(&self) -> Result<content::ContentSet> {
        content::loader::ContentStore::new(self).load()
    }

    /// Build the site in production mode, returning the generator's exit code
    pub async fn build(&self) -> BuildResult<i32> {
        commands::build::run(self).await
    }

    /// Run the preview server until it exits or is interrupted
    pub async fn serve(&self) -> BuildResult<i32> {
        commands::serve::run(self).await
    }

    /// Remove the generated directories
    pub fn clean(&self) -> BuildResult<commands::clean::CleanReport> {
        commands::clean::run(self)
    }
}
