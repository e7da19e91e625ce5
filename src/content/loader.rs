//! Content loader - loads posts and pages from the content directory

use anyhow::Result;
use chrono::Local;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

use super::{references, ContentIssue, ContentSet, FrontMatter, IssueKind, Kind, Post};
use crate::Site;

/// Loads content from the content directory
///
/// Read-only: nothing under the content directory is ever written here.
pub struct ContentStore<'a> {
    site: &'a Site,
}

impl<'a> ContentStore<'a> {
    /// Create a new content store reader
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Load every conforming file, collecting problems instead of failing
    pub fn load(&self) -> Result<ContentSet> {
        let mut set = ContentSet {
            build_future: self.site.build_future,
            ..Default::default()
        };

        let content_dir = &self.site.content_dir;
        if !content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", content_dir);
            return Ok(set);
        }

        // Slug -> source of the first file that claimed it
        let mut slugs: HashMap<String, String> = HashMap::new();

        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let source = e
                        .path()
                        .map(|p| self.relative_source(p))
                        .unwrap_or_default();
                    set.issues.push(ContentIssue::new(
                        source,
                        IssueKind::Unreadable {
                            message: e.to_string(),
                        },
                    ));
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let source = self.relative_source(path);
            if self.is_ignored(path, &source) {
                tracing::debug!("Ignoring {}", source);
                continue;
            }

            let post = match self.load_post(path, &source, &mut set.issues) {
                Some(post) => post,
                None => continue,
            };

            if let Some(first) = slugs.get(&post.slug) {
                set.issues.push(ContentIssue::new(
                    source,
                    IssueKind::DuplicateSlug {
                        slug: post.slug.clone(),
                        first: first.clone(),
                    },
                ));
                continue;
            }
            slugs.insert(post.slug.clone(), source);
            set.posts.push(post);
        }

        // Sort by date descending (newest first)
        set.posts.sort_by(|a, b| b.date.cmp(&a.date));

        tracing::debug!(
            "Loaded {} entries with {} issues from {:?}",
            set.posts.len(),
            set.issues.len(),
            content_dir
        );

        Ok(set)
    }

    /// Load a single post; `None` when the file is excluded
    fn load_post(&self, path: &Path, source: &str, issues: &mut Vec<ContentIssue>) -> Option<Post> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                issues.push(ContentIssue::new(
                    source,
                    IssueKind::Unreadable {
                        message: e.to_string(),
                    },
                ));
                return None;
            }
        };

        let (fm, body) = match FrontMatter::parse(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to parse front matter of {}: {}", source, e);
                issues.push(ContentIssue::new(
                    source,
                    IssueKind::MalformedFrontMatter {
                        message: e.to_string(),
                    },
                ));
                return None;
            }
        };

        let title = match fm.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => {
                issues.push(ContentIssue::new(source, IssueKind::MissingTitle));
                return None;
            }
        };

        if fm.description.as_deref().map(str::trim).unwrap_or("").is_empty() {
            issues.push(ContentIssue::new(source, IssueKind::MissingDescription));
        }

        if let Some(raw) = &fm.date {
            if fm.parse_date().is_none() {
                issues.push(ContentIssue::new(
                    source,
                    IssueKind::InvalidDate { value: raw.clone() },
                ));
            }
        }

        // Fall back to the file's modification time
        let file_modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(chrono::DateTime::<Local>::from);
        let date = fm
            .parse_date()
            .unwrap_or_else(|| file_modified.unwrap_or_else(Local::now));

        let mut post = Post::new(title, date, source.to_string());
        post.slug = derive_slug(source, fm.slug.as_deref());
        post.kind = self.kind_of(source);
        post.publish_date = fm.parse_publish_date();
        post.expiry_date = fm.parse_expiry_date();
        post.description = fm.description.filter(|d| !d.trim().is_empty());
        post.tags = fm
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<IndexSet<_>>();
        post.body = body.to_string();
        post.draft = fm.draft;
        post.full_source = path.to_path_buf();
        post.extra = fm.extra;

        Some(post)
    }

    /// Run reference checking over every loaded entry
    pub fn check_references(&self, set: &mut ContentSet) {
        for post in &set.posts {
            set.issues
                .extend(references::check(post, &self.site.base_dir));
        }
    }

    /// Source path relative to the content directory, `/`-separated
    fn relative_source(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.site.content_dir).unwrap_or(path);
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// A pattern may target the content-relative source, the path relative
    /// to the site root (`content/posts/x.md`) or the full path
    fn is_ignored(&self, path: &Path, source: &str) -> bool {
        if self.site.ignore_files.is_empty() {
            return false;
        }
        let full = path.to_string_lossy().replace('\\', "/");
        let from_root = path
            .strip_prefix(&self.site.base_dir)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| full.clone());

        self.site
            .ignore_files
            .iter()
            .any(|re| re.is_match(source) || re.is_match(&from_root) || re.is_match(&full))
    }

    fn kind_of(&self, source: &str) -> Kind {
        let mut parts = source.split('/');
        let section = parts.next().unwrap_or("");
        let is_list = source.ends_with("/_index.md") || source.ends_with("/_index.markdown");
        if section == self.site.config.posts_section && parts.next().is_some() && !is_list {
            Kind::Post
        } else {
            Kind::Page
        }
    }
}

/// Derive a slug from a relative source path
///
/// `posts/foo.md` -> `posts/foo`, `posts/foo/index.md` -> `posts/foo`,
/// `posts/_index.md` -> `posts`. A front-matter slug replaces the last segment.
pub fn derive_slug(source: &str, override_slug: Option<&str>) -> String {
    let without_ext = source
        .strip_suffix(".md")
        .or_else(|| source.strip_suffix(".markdown"))
        .unwrap_or(source);

    let mut segments: Vec<&str> = without_ext.split('/').filter(|s| !s.is_empty()).collect();
    if matches!(segments.last(), Some(&"index") | Some(&"_index")) {
        segments.pop();
    }

    if let Some(custom) = override_slug.map(str::trim).filter(|s| !s.is_empty()) {
        segments.pop();
        segments.push(custom.trim_matches('/'));
    }

    segments.join("/")
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Mode, Severity};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join("content").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(root: &Path) -> Site {
        Site::new(root).unwrap()
    }

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("posts/hello.md", None), "posts/hello");
        assert_eq!(derive_slug("posts/hello/index.md", None), "posts/hello");
        assert_eq!(derive_slug("posts/_index.md", None), "posts");
        assert_eq!(derive_slug("about.markdown", None), "about");
        assert_eq!(derive_slug("_index.md", None), "");
        assert_eq!(derive_slug("posts/hello/index.md", Some("hi")), "posts/hi");
    }

    #[test]
    fn test_load_scenario() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "posts/x.md",
            "---\ntitle: \"X\"\ndescription: x\ndate: 2024-01-02\ndraft: false\n---\nX body\n",
        );
        write(
            dir.path(),
            "posts/y/index.md",
            "---\ntitle: \"Y\"\ndescription: y\ndate: 2024-01-03\ndraft: true\n---\nY body\n",
        );

        let site = site(dir.path());
        let set = site.load_content().unwrap();
        assert!(set.issues.is_empty(), "{:?}", set.issues);

        // Newest first
        let slugs: Vec<_> = set.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["posts/y", "posts/x"]);
        assert!(set.posts.iter().all(|p| p.kind == Kind::Post));

        let production: Vec<_> = set
            .visible(Mode::Production)
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(production, vec!["X"]);
        assert_eq!(set.visible(Mode::Preview).len(), 2);
    }

    #[test]
    fn test_malformed_front_matter_excluded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/good.md", "---\ntitle: Good\ndescription: ok\n---\n");
        write(dir.path(), "posts/bad.md", "---\ntitle: [oops\n---\n");
        write(dir.path(), "posts/open.md", "---\ntitle: Open\n");
        write(dir.path(), "posts/untitled.md", "Just text\n");

        let set = site(dir.path()).load_content().unwrap();
        assert_eq!(set.posts.len(), 1);
        assert_eq!(set.posts[0].title, "Good");

        let mut bad: Vec<_> = set
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(|i| i.source.as_str())
            .collect();
        bad.sort();
        assert_eq!(bad, vec!["posts/bad.md", "posts/open.md", "posts/untitled.md"]);
    }

    #[test]
    fn test_missing_description_is_warning() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "about.md", "---\ntitle: About\ntags: [me, me]\n---\n");

        let set = site(dir.path()).load_content().unwrap();
        assert_eq!(set.posts.len(), 1);
        assert_eq!(set.posts[0].kind, Kind::Page);
        assert_eq!(set.posts[0].tags.len(), 1);
        assert!(!set.has_errors());
        assert_eq!(set.issues[0].kind, IssueKind::MissingDescription);
    }

    #[test]
    fn test_duplicate_slug() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "posts/a.md", "---\ntitle: A\ndescription: a\nslug: same\n---\n");
        write(dir.path(), "posts/b.md", "---\ntitle: B\ndescription: b\nslug: same\n---\n");

        let set = site(dir.path()).load_content().unwrap();
        assert_eq!(set.posts.len(), 1);
        assert_eq!(set.posts[0].title, "A");
        assert_eq!(
            set.issues[0].kind,
            IssueKind::DuplicateSlug {
                slug: "posts/same".to_string(),
                first: "posts/a.md".to_string(),
            }
        );
    }

    #[test]
    fn test_ignore_files_and_non_markdown() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hugo.toml"), "ignoreFiles = ['\\.bak\\.md$']\n").unwrap();
        write(dir.path(), "posts/p.md", "---\ntitle: P\ndescription: p\n---\n");
        write(dir.path(), "posts/p.bak.md", "---\ntitle: [broken\n---\n");
        write(dir.path(), "posts/p/level1_timeit.py", "import time\n");

        let set = site(dir.path()).load_content().unwrap();
        assert_eq!(set.posts.len(), 1);
        assert!(set.issues.is_empty());
    }

    #[test]
    fn test_ignore_pattern_anchored_at_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hugo.toml"), "ignoreFiles = ['^content/drafts/']\n").unwrap();
        write(dir.path(), "posts/p.md", "---\ntitle: P\ndescription: p\n---\n");
        write(dir.path(), "drafts/wip.md", "---\ntitle: [broken\n---\n");

        let set = site(dir.path()).load_content().unwrap();
        assert_eq!(set.posts.len(), 1);
        assert!(set.issues.is_empty(), "{:?}", set.issues);
    }

    #[test]
    fn test_capitalized_keys_load() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "posts/cap.md",
            "---\nTitle: Cap\nDescription: d\nDraft: true\n---\nBody\n",
        );

        let set = site(dir.path()).load_content().unwrap();
        assert!(set.issues.is_empty(), "{:?}", set.issues);
        assert_eq!(set.posts.len(), 1);
        assert_eq!(set.posts[0].title, "Cap");
        assert!(set.posts[0].draft);
        assert!(set.visible(Mode::Production).is_empty());
        assert_eq!(set.visible(Mode::Preview).len(), 1);
    }

    #[test]
    fn test_missing_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        let set = site(dir.path()).load_content().unwrap();
        assert!(set.posts.is_empty());
    }

    #[test]
    fn test_check_references_adds_issues() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "posts/decorators/index.md",
            "---\ntitle: D\ndescription: d\n---\n{{< code file=\"level3_method.py\" >}}\n",
        );

        let site = site(dir.path());
        let store = ContentStore::new(&site);
        let mut set = store.load().unwrap();
        assert!(!set.has_errors());
        store.check_references(&mut set);
        assert!(set.has_errors());
        assert_eq!(set.issues[0].source, "posts/decorators/index.md");
    }
}
