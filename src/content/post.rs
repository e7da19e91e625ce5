//! Post model and build-mode visibility

use chrono::{DateTime, Local};
use indexmap::IndexSet;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Which build a post list is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `build`: what gets deployed
    Production,
    /// `serve`: local preview, drafts included
    Preview,
}

impl Mode {
    pub fn includes_drafts(self) -> bool {
        matches!(self, Mode::Preview)
    }
}

/// Whether a content file lives in the posts section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Post,
    Page,
}

/// A post or standalone page from the content store
#[derive(Debug, Clone)]
pub struct Post {
    /// Path-derived identifier, unique within the store
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: DateTime<Local>,

    /// Not rendered before this moment
    pub publish_date: Option<DateTime<Local>>,

    /// Not rendered after this moment
    pub expiry_date: Option<DateTime<Local>>,

    /// One-line summary for listings
    pub description: Option<String>,

    /// Post tags
    pub tags: IndexSet<String>,

    /// Raw markdown content
    pub body: String,

    /// Excluded from production builds
    pub draft: bool,

    pub kind: Kind,

    /// Source file path (relative to the content directory)
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// Custom front-matter fields
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: DateTime<Local>, source: String) -> Self {
        let slug = source
            .trim_end_matches(".md")
            .trim_end_matches(".markdown")
            .to_string();
        Self {
            slug,
            title,
            date,
            publish_date: None,
            expiry_date: None,
            description: None,
            tags: IndexSet::new(),
            body: String::new(),
            draft: false,
            kind: Kind::Post,
            source: source.clone(),
            full_source: PathBuf::from(&source),
            extra: HashMap::new(),
        }
    }

    /// Whether this post is a page bundle (`index.md` or `_index.md`)
    pub fn is_bundle(&self) -> bool {
        matches!(
            self.full_source.file_stem().and_then(|s| s.to_str()),
            Some("index") | Some("_index")
        )
    }

    /// Directory that relative references in the body resolve against
    pub fn resource_dir(&self) -> &Path {
        self.full_source.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Whether a build in `mode` renders this post at `now`
    pub fn is_visible(&self, mode: Mode, now: DateTime<Local>, build_future: bool) -> bool {
        if self.draft && !mode.includes_drafts() {
            return false;
        }
        if !build_future {
            let publish_at = self.publish_date.unwrap_or(self.date);
            if publish_at > now {
                return false;
            }
        }
        if let Some(expiry) = self.expiry_date {
            if expiry <= now {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn post(title: &str, draft: bool) -> Post {
        let date = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut post = Post::new(title.to_string(), date, format!("posts/{}.md", title));
        post.draft = draft;
        post
    }

    #[test]
    fn test_drafts_only_in_preview() {
        let now = Local::now();
        let x = post("x", false);
        let y = post("y", true);

        assert!(x.is_visible(Mode::Production, now, false));
        assert!(!y.is_visible(Mode::Production, now, false));
        assert!(x.is_visible(Mode::Preview, now, false));
        assert!(y.is_visible(Mode::Preview, now, false));
    }

    #[test]
    fn test_future_posts_gated() {
        let now = Local::now();
        let mut future = post("future", false);
        future.date = now + Duration::days(3);

        assert!(!future.is_visible(Mode::Production, now, false));
        assert!(!future.is_visible(Mode::Preview, now, false));
        assert!(future.is_visible(Mode::Production, now, true));
    }

    #[test]
    fn test_publish_and_expiry_dates() {
        let now = Local::now();
        let mut scheduled = post("scheduled", false);
        scheduled.publish_date = Some(now + Duration::hours(1));
        assert!(!scheduled.is_visible(Mode::Production, now, false));

        let mut expired = post("expired", false);
        expired.expiry_date = Some(now - Duration::hours(1));
        assert!(!expired.is_visible(Mode::Preview, now, true));
    }

    #[test]
    fn test_slug_and_bundle() {
        let mut p = post("hello", false);
        assert_eq!(p.slug, "posts/hello");
        assert!(!p.is_bundle());

        p.full_source = PathBuf::from("/site/content/posts/hello/index.md");
        assert!(p.is_bundle());
        assert_eq!(p.resource_dir(), Path::new("/site/content/posts/hello"));
    }
}
