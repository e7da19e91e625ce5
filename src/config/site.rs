//! Tool configuration (blogctl.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name of the configuration file at the site root
pub const CONFIG_FILE: &str = "blogctl.yml";

/// Main tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Generator invocation
    pub generator: GeneratorConfig,
    pub serve: ServeConfig,

    // Directory overrides (fall back to the generator's config, then defaults)
    pub content_dir: Option<String>,
    pub public_dir: Option<String>,
    pub resources_dir: Option<String>,

    // Content
    pub posts_section: String,
    pub build_future: bool,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            serve: ServeConfig::default(),

            content_dir: None,
            public_dir: None,
            resources_dir: None,

            posts_section: "posts".to_string(),
            build_future: false,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        // An empty file is a valid "all defaults" configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }
}

/// How the external generator is invoked
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Binary name or path
    pub program: String,
    /// Subcommand that starts the preview server
    pub serve_command: String,
    pub flags: GeneratorFlags,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: "hugo".to_string(),
            serve_command: "server".to_string(),
            flags: GeneratorFlags::default(),
        }
    }
}

/// Flag spellings understood by the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorFlags {
    pub drafts: String,
    pub bind: String,
    pub minify: String,
    pub port: String,
}

impl Default for GeneratorFlags {
    fn default() -> Self {
        Self {
            drafts: "--buildDrafts".to_string(),
            bind: "--bind".to_string(),
            minify: "--minify".to_string(),
            port: "--port".to_string(),
        }
    }
}

/// Preview server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub bind: String,
    pub port: Option<u16>,
    pub cleanup: CleanupPolicy,
    /// Milliseconds the generator gets to exit after an interrupt
    pub grace_period_ms: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: None,
            cleanup: CleanupPolicy::Always,
            grace_period_ms: 5000,
        }
    }
}

/// When `serve` removes the generated directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// After every handled exit, including interrupts and errors
    Always,
    /// Only after the generator exits with status zero
    OnSuccess,
    /// Keep the directories for a faster restart
    Never,
}

impl CleanupPolicy {
    /// Whether cleanup should run for the given generator outcome
    pub fn applies(self, succeeded: bool) -> bool {
        match self {
            CleanupPolicy::Always => true,
            CleanupPolicy::OnSuccess => succeeded,
            CleanupPolicy::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.generator.program, "hugo");
        assert_eq!(config.generator.flags.drafts, "--buildDrafts");
        assert_eq!(config.serve.bind, "0.0.0.0");
        assert_eq!(config.serve.cleanup, CleanupPolicy::Always);
        assert!(!config.build_future);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
generator:
  program: /usr/local/bin/hugo
  flags:
    minify: --gc
serve:
  port: 1313
  cleanup: on_success
public_dir: dist
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.generator.program, "/usr/local/bin/hugo");
        assert_eq!(config.generator.flags.minify, "--gc");
        // Unset flags keep their defaults
        assert_eq!(config.generator.flags.bind, "--bind");
        assert_eq!(config.serve.port, Some(1313));
        assert_eq!(config.serve.cleanup, CleanupPolicy::OnSuccess);
        assert_eq!(config.public_dir.as_deref(), Some("dist"));
        assert_eq!(config.content_dir, None);
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.posts_section, "posts");
    }

    #[test]
    fn test_cleanup_policy() {
        assert!(CleanupPolicy::Always.applies(false));
        assert!(CleanupPolicy::OnSuccess.applies(true));
        assert!(!CleanupPolicy::OnSuccess.applies(false));
        assert!(!CleanupPolicy::Never.applies(true));
    }
}
