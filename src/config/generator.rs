//! Directory settings read from the external generator's own config file

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Candidate config files, in lookup order
const CANDIDATES: &[&str] = &[
    "hugo.toml",
    "hugo.yaml",
    "hugo.yml",
    "hugo.json",
    "config.toml",
    "config.yaml",
    "config.yml",
    "config.json",
];

/// The subset of the generator's config this tool cares about
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorSiteConfig {
    #[serde(alias = "contentdir")]
    pub content_dir: Option<String>,
    #[serde(alias = "publishdir")]
    pub publish_dir: Option<String>,
    #[serde(alias = "resourcedir")]
    pub resource_dir: Option<String>,
    #[serde(alias = "buildfuture")]
    pub build_future: Option<bool>,
    /// Regular expressions matched against content paths, both relative to the
    /// content dir and relative to the site root (`content/posts/x.md`)
    #[serde(alias = "ignorefiles")]
    pub ignore_files: Vec<String>,
}

impl GeneratorSiteConfig {
    /// Find and parse the generator config in `base_dir`
    ///
    /// Returns the default when no config file exists.
    pub fn discover(base_dir: &Path) -> Result<(Option<PathBuf>, Self)> {
        for name in CANDIDATES {
            let path = base_dir.join(name);
            if path.is_file() {
                let config = Self::load(&path)?;
                tracing::debug!("Loaded generator config from {:?}", path);
                return Ok((Some(path), config));
            }
        }
        Ok((None, Self::default()))
    }

    /// Parse a config file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config = match ext {
            "toml" => toml::from_str(&content).map_err(anyhow::Error::from),
            "yaml" | "yml" if content.trim().is_empty() => Ok(Self::default()),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
            "json" => serde_json::from_str(&content).map_err(anyhow::Error::from),
            _ => anyhow::bail!("Unsupported generator config format: {:?}", path),
        };

        config.with_context(|| format!("Failed to parse {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("hugo.toml"),
            r#"
baseURL = "https://example.org/"
title = "Notes"
publishDir = "dist"
buildFuture = true
ignoreFiles = ['\.py$']

[params]
author = "someone"
"#,
        )
        .unwrap();

        let (path, config) = GeneratorSiteConfig::discover(dir.path()).unwrap();
        assert!(path.unwrap().ends_with("hugo.toml"));
        assert_eq!(config.publish_dir.as_deref(), Some("dist"));
        assert_eq!(config.content_dir, None);
        assert_eq!(config.build_future, Some(true));
        assert_eq!(config.ignore_files, vec![r"\.py$"]);
    }

    #[test]
    fn test_parse_yaml_lowercase_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "contentdir: posts-src\nresourcedir: cache\n",
        )
        .unwrap();

        let (_, config) = GeneratorSiteConfig::discover(dir.path()).unwrap();
        assert_eq!(config.content_dir.as_deref(), Some("posts-src"));
        assert_eq!(config.resource_dir.as_deref(), Some("cache"));
    }

    #[test]
    fn test_hugo_name_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), r#"{"publishDir": "old"}"#).unwrap();
        fs::write(dir.path().join("hugo.json"), r#"{"publishDir": "new"}"#).unwrap();

        let (_, config) = GeneratorSiteConfig::discover(dir.path()).unwrap();
        assert_eq!(config.publish_dir.as_deref(), Some("new"));
    }

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let (path, config) = GeneratorSiteConfig::discover(dir.path()).unwrap();
        assert!(path.is_none());
        assert!(config.publish_dir.is_none());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hugo.toml"), "publishDir = ").unwrap();
        assert!(GeneratorSiteConfig::discover(dir.path()).is_err());
    }
}
