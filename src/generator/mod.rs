//! External generator invocation
//!
//! Each build operation maps to exactly one run of the generator binary.
//! This module knows the argument shapes and how to turn the child's exit
//! status into the tool's own exit code.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

use crate::config::{GeneratorConfig, SiteConfig};
use crate::content::Mode;
use crate::error::{BuildError, BuildResult};

/// A fully resolved generator command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub mode: Mode,
}

impl Invocation {
    /// Production build: minified, drafts excluded
    pub fn build(config: &GeneratorConfig) -> Self {
        let mut args = Vec::new();
        push_flag(&mut args, &config.flags.minify);

        Self {
            program: config.program.clone(),
            args,
            mode: Mode::Production,
        }
    }

    /// Preview server: drafts included, bound to the configured address
    pub fn serve(config: &SiteConfig) -> Self {
        let generator = &config.generator;
        let mut args = Vec::new();
        push_flag(&mut args, &generator.serve_command);
        push_flag(&mut args, &generator.flags.drafts);
        if push_flag(&mut args, &generator.flags.bind) {
            args.push(config.serve.bind.clone());
        }
        if let Some(port) = config.serve.port {
            if push_flag(&mut args, &generator.flags.port) {
                args.push(port.to_string());
            }
        }

        Self {
            program: generator.program.clone(),
            args,
            mode: Mode::Preview,
        }
    }

    /// Command line as shown in logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Start the generator in `cwd` with inherited stdio
    pub fn spawn(&self, cwd: &Path) -> BuildResult<Child> {
        tracing::info!("Running ({:?}): {}", self.mode, self.display());

        Command::new(&self.program)
            .args(&self.args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    BuildError::GeneratorNotFound {
                        program: self.program.clone(),
                    }
                } else {
                    BuildError::Spawn {
                        program: self.program.clone(),
                        source,
                    }
                }
            })
    }

    /// Run to completion, returning the generator's exit code
    pub async fn run(&self, cwd: &Path) -> BuildResult<i32> {
        let mut child = self.spawn(cwd)?;
        let status = child.wait().await.map_err(BuildError::Wait)?;
        Ok(exit_code(status))
    }
}

/// Append a flag unless it was configured away; returns whether it was added
fn push_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let flag = flag.trim();
    if flag.is_empty() {
        return false;
    }
    args.push(flag.to_string());
    true
}

/// Map a child's status to a shell-style exit code
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
