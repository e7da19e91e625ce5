//! Report content problems before the generator trips over them

use anyhow::Result;

use crate::content::loader::ContentStore;
use crate::content::ContentSet;
use crate::Site;

/// Load the store with reference checking and print every issue.
/// Returns the process exit code: 1 when any error was found.
pub fn run(site: &Site) -> Result<i32> {
    let set = load(site)?;

    for issue in &set.issues {
        println!("{}", issue);
    }

    let errors = set.issues.iter().filter(|i| i.is_error()).count();
    let warnings = set.issues.len() - errors;
    println!(
        "Checked {} entries: {} errors, {} warnings",
        set.posts.len(),
        errors,
        warnings
    );

    Ok(if set.has_errors() { 1 } else { 0 })
}

/// Load the content store and run reference checking over it
pub fn load(site: &Site) -> Result<ContentSet> {
    let store = ContentStore::new(site);
    let mut set = store.load()?;
    store.check_references(&mut set);
    set.issues.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.source.cmp(&b.source))
    });
    Ok(set)
}
