//! Remove the generated output and resources directories

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{BuildError, BuildResult};
use crate::Site;

/// What a clean pass deleted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
}

impl CleanReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Clean the generated directories; idempotent
pub fn run(site: &Site) -> BuildResult<CleanReport> {
    remove_artifacts(site)
}

/// Delete the output and resources directories if present.
/// Every target is validated before anything is removed.
pub fn remove_artifacts(site: &Site) -> BuildResult<CleanReport> {
    let targets = site.artifact_dirs();
    for target in targets {
        ensure_disposable(site, target)?;
    }

    let mut report = CleanReport::default();
    for target in targets {
        let metadata = match fs::symlink_metadata(target) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Already absent: {:?}", target);
                continue;
            }
            Err(source) => {
                return Err(BuildError::Cleanup {
                    path: target.to_path_buf(),
                    source,
                })
            }
        };

        // A symlinked output directory loses the link, never the link target
        let result = if metadata.is_dir() {
            fs::remove_dir_all(target)
        } else {
            fs::remove_file(target)
        };
        result.map_err(|source| BuildError::Cleanup {
            path: target.to_path_buf(),
            source,
        })?;

        tracing::info!("Deleted: {:?}", target);
        report.removed.push(target.to_path_buf());
    }

    Ok(report)
}

/// Refuse targets that could take authored files with them
fn ensure_disposable(site: &Site, target: &Path) -> BuildResult<()> {
    let base = normalize(&site.base_dir);
    let content = normalize(&site.content_dir);
    let target_norm = normalize(target);

    let reason = if target_norm == base {
        Some("it is the site root")
    } else if !target_norm.starts_with(&base) {
        Some("it is outside the site root")
    } else if content.starts_with(&target_norm) {
        Some("it contains the content directory")
    } else if target_norm.starts_with(&content) {
        Some("it is inside the content directory")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(BuildError::UnsafeCleanTarget {
            path: target.to_path_buf(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Resolve `.` and `..` lexically; targets may not exist yet
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::collections::BTreeSet;
    use walkdir::WalkDir;

    fn populated_site() -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("content/posts/decorators")).unwrap();
        fs::write(root.join("content/posts/decorators/index.md"), "---\ntitle: D\n---\n").unwrap();
        fs::write(root.join("content/posts/decorators/full_example.py"), "pass\n").unwrap();
        fs::create_dir_all(root.join("public/posts/decorators")).unwrap();
        fs::write(root.join("public/posts/decorators/index.html"), "<html>").unwrap();
        fs::create_dir_all(root.join("resources/_gen/images")).unwrap();

        let site = Site::new(root).unwrap();
        (dir, site)
    }

    fn content_files(site: &Site) -> BTreeSet<PathBuf> {
        WalkDir::new(&site.content_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.path().to_path_buf())
            .collect()
    }

    #[test]
    fn test_clean_removes_both_dirs() {
        let (_dir, site) = populated_site();
        let report = run(&site).unwrap();
        assert_eq!(
            report.removed,
            vec![site.public_dir.clone(), site.resources_dir.clone()]
        );
        assert!(!site.public_dir.exists());
        assert!(!site.resources_dir.exists());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let (_dir, site) = populated_site();
        assert!(!run(&site).unwrap().is_empty());
        let second = run(&site).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_clean_preserves_content() {
        let (_dir, site) = populated_site();
        let before = content_files(&site);
        run(&site).unwrap();
        assert_eq!(content_files(&site), before);
        assert_eq!(before.len(), 5);
    }

    #[test]
    fn test_refuses_content_overlap() {
        let (dir, _) = populated_site();

        let mut config = SiteConfig::default();
        config.public_dir = Some("content".to_string());
        let site = Site::with_config(dir.path().to_path_buf(), config).unwrap();
        let err = run(&site).unwrap_err();
        assert!(matches!(err, BuildError::UnsafeCleanTarget { .. }));

        let mut config = SiteConfig::default();
        config.resources_dir = Some("content/posts".to_string());
        let site = Site::with_config(dir.path().to_path_buf(), config).unwrap();
        assert!(run(&site).is_err());

        // Nothing was deleted: validation happens before removal
        assert!(dir.path().join("public").exists());
        assert!(dir.path().join("content/posts/decorators/index.md").exists());
    }

    #[test]
    fn test_refuses_root_and_outside() {
        let (dir, _) = populated_site();

        let mut config = SiteConfig::default();
        config.public_dir = Some(".".to_string());
        let site = Site::with_config(dir.path().to_path_buf(), config).unwrap();
        assert!(run(&site).is_err());

        let mut config = SiteConfig::default();
        config.resources_dir = Some("../elsewhere".to_string());
        let site = Site::with_config(dir.path().to_path_buf(), config).unwrap();
        assert!(run(&site).is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    }
}
