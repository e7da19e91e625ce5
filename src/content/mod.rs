//! Content module - the post store and what each build mode renders

mod frontmatter;
mod issue;
pub mod loader;
mod post;
pub mod references;

pub use frontmatter::{parse_date_string, FrontMatter, FrontMatterError};
pub use issue::{ContentIssue, IssueKind, Severity};
pub use post::{Kind, Mode, Post};

use chrono::{DateTime, Local};
use indexmap::IndexMap;

/// Everything loaded from the content directory
#[derive(Debug, Clone, Default)]
pub struct ContentSet {
    /// Parseable posts and pages, newest first, drafts included
    pub posts: Vec<Post>,
    /// Problems found while loading
    pub issues: Vec<ContentIssue>,
    /// Render future-dated posts
    pub build_future: bool,
}

impl ContentSet {
    /// Entries a build in `mode` renders right now
    pub fn visible(&self, mode: Mode) -> Vec<&Post> {
        self.visible_at(mode, Local::now())
    }

    /// Entries a build in `mode` renders at `now`
    pub fn visible_at(&self, mode: Mode, now: DateTime<Local>) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|p| p.is_visible(mode, now, self.build_future))
            .collect()
    }

    /// Tag counts over the visible entries, most used first
    pub fn tags(&self, mode: Mode) -> IndexMap<String, usize> {
        let mut tags: IndexMap<String, usize> = IndexMap::new();
        for post in self.visible(mode) {
            for tag in &post.tags {
                *tags.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        tags.sort_by(|ka, a, kb, b| b.cmp(a).then_with(|| ka.cmp(kb)));
        tags
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.is_error())
    }

    pub fn find(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }
}
