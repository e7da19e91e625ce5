//! Shared fixtures for command tests

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Write an executable shell script standing in for the generator
pub fn script(root: &Path, body: &str) -> String {
    let script = root.join("fake-generator.sh");
    fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script.to_string_lossy().to_string()
}

/// A generator that creates both artifact directories, records its
/// arguments into `public/args.txt` and exits with `exit`
pub fn fake_generator(root: &Path, exit: i32) -> String {
    script(
        root,
        &format!(
            "mkdir -p public resources/_gen\necho \"$@\" > public/args.txt\nexit {}",
            exit
        ),
    )
}
