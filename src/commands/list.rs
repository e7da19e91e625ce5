//! List site content

use anyhow::Result;
use serde::Serialize;

use crate::content::{ContentSet, Kind, Mode, Post};
use crate::Site;

/// One row of `list posts --json`
#[derive(Debug, Serialize)]
struct Entry<'a> {
    slug: &'a str,
    title: &'a str,
    date: String,
    description: Option<&'a str>,
    tags: Vec<&'a str>,
    draft: bool,
    source: &'a str,
}

impl<'a> From<&'a Post> for Entry<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            slug: &post.slug,
            title: &post.title,
            date: post.date.to_rfc3339(),
            description: post.description.as_deref(),
            tags: post.tags.iter().map(String::as_str).collect(),
            draft: post.draft,
            source: &post.source,
        }
    }
}

/// List site content by type
pub fn run(site: &Site, content_type: &str, mode: Mode, json: bool) -> Result<()> {
    let set = site.load_content()?;
    for issue in &set.issues {
        tracing::warn!("{}", issue);
    }
    print!("{}", render(&set, content_type, mode, json)?);
    Ok(())
}

/// Render the listing as text or JSON
pub fn render(set: &ContentSet, content_type: &str, mode: Mode, json: bool) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" | "page" | "pages" | "draft" | "drafts" => {
            let entries: Vec<&Post> = match content_type {
                "post" | "posts" => set
                    .visible(mode)
                    .into_iter()
                    .filter(|p| p.kind == Kind::Post)
                    .collect(),
                "page" | "pages" => set
                    .visible(mode)
                    .into_iter()
                    .filter(|p| p.kind == Kind::Page)
                    .collect(),
                _ => set.posts.iter().filter(|p| p.draft).collect(),
            };

            if json {
                let rows: Vec<Entry> = entries.into_iter().map(Entry::from).collect();
                out.push_str(&serde_json::to_string_pretty(&rows)?);
                out.push('\n');
                return Ok(out);
            }

            out.push_str(&format!("{} ({}):\n", heading(content_type), entries.len()));
            for post in entries {
                let marker = if post.draft { " (draft)" } else { "" };
                out.push_str(&format!(
                    "  {} - {}{} [/{}]\n",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    marker,
                    post.slug
                ));
            }
        }
        "tag" | "tags" => {
            let tags = set.tags(mode);
            if json {
                out.push_str(&serde_json::to_string_pretty(&tags)?);
                out.push('\n');
                return Ok(out);
            }

            out.push_str(&format!("Tags ({}):\n", tags.len()));
            for (tag, count) in tags {
                out.push_str(&format!("  {} ({})\n", tag, count));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, page, draft, tag",
                content_type
            );
        }
    }

    Ok(out)
}

fn heading(content_type: &str) -> &'static str {
    match content_type {
        "post" | "posts" => "Posts",
        "page" | "pages" => "Pages",
        _ => "Drafts",
    }
}
