//! Create a new draft post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Where and how to create the post
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub title: &'a str,
    /// Section directory under the content dir (defaults to the posts section)
    pub section: Option<&'a str>,
    /// Create `<slug>/index.md` so code files and images can sit next to it
    pub bundle: bool,
}

/// Create a draft post and return its path
pub fn create_post(site: &Site, options: &NewPost) -> Result<PathBuf> {
    let slug = slug::slugify(options.title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a usable slug", options.title);
    }

    let section = options
        .section
        .unwrap_or(&site.config.posts_section)
        .trim_matches('/');
    let target_dir = site.content_dir.join(section);

    let file_path = if options.bundle {
        target_dir.join(&slug).join("index.md")
    } else {
        target_dir.join(format!("{}.md", slug))
    };

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    // A bundle and a single file with the same slug would collide
    let sibling = if options.bundle {
        target_dir.join(format!("{}.md", slug))
    } else {
        target_dir.join(&slug).join("index.md")
    };
    if sibling.exists() {
        anyhow::bail!("Slug {:?} is already used by {:?}", slug, sibling);
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let now = chrono::Local::now();
    let content = format!(
        "---\ntitle: {}\ndate: {}\ndescription: \"\"\ntags: []\ndraft: true\n---\n\n",
        serde_yaml::to_string(options.title)?.trim_end(),
        now.format("%Y-%m-%dT%H:%M:%S%:z")
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created draft {:?}", file_path);

    Ok(file_path)
}

/// Run the new command
pub fn run(site: &Site, options: &NewPost) -> Result<()> {
    let path = create_post(site, options)?;
    println!("Created: {:?}", path);
    Ok(())
}
