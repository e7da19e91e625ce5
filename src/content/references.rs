//! Relative file references inside post bodies
//!
//! Posts embed code files and images that live next to them in a page
//! bundle. A missing file fails the generator at build time; `check`
//! finds these ahead of that.

use lazy_static::lazy_static;
use percent_encoding::percent_decode_str;
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use std::path::{Path, PathBuf};

use super::{ContentIssue, IssueKind, Post};

/// Where a reference was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Link,
    Image,
    Shortcode,
}

/// A local file a post points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub target: String,
    pub origin: Origin,
}

lazy_static! {
    static ref SHORTCODE_REGEX: Regex =
        Regex::new(r"\{\{[<%]\s*/?[\w./-]+(?P<args>[^}]*?)\s*[>%]\}\}").unwrap();
    static ref NAMED_ARG_REGEX: Regex =
        Regex::new(r#"\b(?:file|src|path|source)\s*=\s*"(?P<value>[^"]+)""#).unwrap();
    static ref POSITIONAL_ARG_REGEX: Regex = Regex::new(r#"^\s*"(?P<value>[^"=]+)""#).unwrap();
}

/// Extract every local file reference from a Markdown body
pub fn extract(body: &str) -> Vec<Reference> {
    let mut refs = Vec::new();

    for event in Parser::new(body) {
        let (dest, origin) = match event {
            Event::Start(Tag::Link { dest_url, .. }) => (dest_url, Origin::Link),
            Event::Start(Tag::Image { dest_url, .. }) => (dest_url, Origin::Image),
            _ => continue,
        };
        if let Some(target) = local_target(&dest) {
            refs.push(Reference { target, origin });
        }
    }

    for caps in SHORTCODE_REGEX.captures_iter(body) {
        let args = &caps["args"];
        let value = NAMED_ARG_REGEX
            .captures(args)
            .or_else(|| POSITIONAL_ARG_REGEX.captures(args))
            .map(|c| c["value"].to_string());

        // Positional arguments are only file references when they look like one
        if let Some(value) = value.filter(|v| has_extension(v) && !v.contains(' ')) {
            if let Some(target) = local_target(&value) {
                refs.push(Reference {
                    target,
                    origin: Origin::Shortcode,
                });
            }
        }
    }

    refs
}

/// Normalize a link destination; `None` for anything that is not a relative file
fn local_target(dest: &str) -> Option<String> {
    let dest = dest.trim();
    if dest.is_empty()
        || dest.starts_with('#')
        || dest.starts_with('/')
        || dest.contains("://")
        || dest.starts_with("//")
        || dest.starts_with("mailto:")
        || dest.starts_with("tel:")
        || dest.starts_with("data:")
        || dest.contains("{{")
    {
        return None;
    }

    let path = dest.split(['#', '?']).next().unwrap_or(dest);
    let decoded = percent_decode_str(path).decode_utf8_lossy().to_string();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

fn has_extension(target: &str) -> bool {
    Path::new(target)
        .extension()
        .map(|e| !e.is_empty())
        .unwrap_or(false)
}

/// Candidate locations for a reference: the post's own directory first,
/// then the site root (where the generator's `readFile` resolves from)
fn candidates(post: &Post, base_dir: &Path, reference: &Reference) -> Vec<PathBuf> {
    let mut paths = vec![post.resource_dir().join(&reference.target)];
    if reference.origin == Origin::Shortcode {
        paths.push(base_dir.join(&reference.target));
    }
    paths
}

/// Report references in `post` that point at missing files
pub fn check(post: &Post, base_dir: &Path) -> Vec<ContentIssue> {
    let mut issues = Vec::new();

    for reference in extract(&post.body) {
        // Links from single-file pages resolve against the page URL, not the file
        let checkable = match reference.origin {
            Origin::Shortcode => true,
            Origin::Link | Origin::Image => post.is_bundle() && has_extension(&reference.target),
        };
        if !checkable {
            continue;
        }

        if !candidates(post, base_dir, &reference)
            .iter()
            .any(|p| p.exists())
        {
            tracing::debug!("{}: missing {}", post.source, reference.target);
            issues.push(ContentIssue::new(
                post.source.clone(),
                IssueKind::BrokenReference {
                    target: reference.target,
                },
            ));
        }
    }

    issues
}
