//! Production build

use crate::error::BuildResult;
use crate::generator::Invocation;
use crate::Site;

/// Run the generator once in production mode; returns its exit code
///
/// No validation is layered on top: the generator alone decides success.
pub async fn run(site: &Site) -> BuildResult<i32> {
    let start = std::time::Instant::now();
    let invocation = Invocation::build(&site.config.generator);

    let code = invocation.run(&site.base_dir).await?;

    let duration = start.elapsed();
    if code == 0 {
        tracing::info!("Built in {:.2}s", duration.as_secs_f64());
    } else {
        tracing::error!("Generator exited with code {}", code);
    }

    Ok(code)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::commands::testing::fake_generator;
    use crate::config::SiteConfig;
    use std::fs;
    use std::path::Path;

    fn site_with(root: &Path, program: String) -> Site {
        let mut config = SiteConfig::default();
        config.generator.program = program;
        Site::with_config(root.to_path_buf(), config).unwrap()
    }

    #[tokio::test]
    async fn test_build_passes_minify_without_drafts() {
        let dir = tempfile::tempdir().unwrap();
        let site = site_with(dir.path(), fake_generator(dir.path(), 0));

        assert_eq!(site.build().await.unwrap(), 0);
        let args = fs::read_to_string(site.public_dir.join("args.txt")).unwrap();
        assert_eq!(args.trim(), "--minify");
    }

    #[tokio::test]
    async fn test_build_propagates_failure() {
        let dir = tempfile::tempdir().unwrap();
        let site = site_with(dir.path(), fake_generator(dir.path(), 2));

        assert_eq!(site.build().await.unwrap(), 2);
        // Build never cleans up after itself
        assert!(site.public_dir.exists());
    }
}
