//! Local preview server
//!
//! The generator serves drafts on all interfaces until it exits or this
//! process is told to stop (Ctrl+C, SIGTERM or SIGHUP). Cleanup of the
//! generated directories then runs according to `serve.cleanup`, on the
//! signal path too. Only a SIGKILL of this process skips it.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use super::clean;
use crate::error::{BuildError, BuildResult};
use crate::generator::{exit_code, Invocation};
use crate::Site;

/// Exit code reported after a user interrupt (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Why the server was asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// SIGHUP, the controlling terminal went away
    Hangup,
}

impl Stop {
    pub fn signal_number(self) -> i32 {
        match self {
            Stop::Interrupt => 2,
            Stop::Terminate => 15,
            Stop::Hangup => 1,
        }
    }

    /// Ctrl+C goes to the whole foreground process group, the others only to us
    fn reaches_generator(self) -> bool {
        matches!(self, Stop::Interrupt)
    }
}

/// How the generator run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Exited(i32),
    Stopped(Stop),
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Exited(code) => code,
            Outcome::Stopped(stop) => 128 + stop.signal_number(),
        }
    }
}

/// Serve until the generator exits or a stop signal arrives
pub async fn run(site: &Site) -> BuildResult<i32> {
    run_until(site, stop_signal()).await
}

/// Serve until the generator exits or `stop` resolves
pub async fn run_until<F>(site: &Site, stop: F) -> BuildResult<i32>
where
    F: Future<Output = Stop>,
{
    let serve = &site.config.serve;
    let invocation = Invocation::serve(&site.config);
    let grace = Duration::from_millis(serve.grace_period_ms);

    println!("Serving drafts on {} (press Ctrl+C to stop)", serve.bind);
    let outcome = supervise(&invocation, &site.base_dir, stop, grace).await;

    let succeeded = matches!(outcome, Ok(Outcome::Exited(0)));
    if serve.cleanup.applies(succeeded) {
        match clean::remove_artifacts(site) {
            Ok(report) => {
                tracing::debug!("Post-serve cleanup removed {:?}", report.removed);
            }
            Err(e) if outcome.is_err() => {
                tracing::error!("Cleanup after failed serve also failed: {}", e);
            }
            Err(e) => return Err(e),
        }
    } else {
        tracing::info!(
            "Keeping generated directories (cleanup: {:?})",
            serve.cleanup
        );
    }

    let outcome = outcome?;
    if let Outcome::Stopped(_) = outcome {
        println!("Stopped.");
    }
    Ok(outcome.exit_code())
}

/// Wait for the generator, stopping it when a stop signal arrives
async fn supervise<F>(
    invocation: &Invocation,
    cwd: &Path,
    stop: F,
    grace: Duration,
) -> BuildResult<Outcome>
where
    F: Future<Output = Stop>,
{
    let mut child = invocation.spawn(cwd)?;

    let stop = tokio::select! {
        status = child.wait() => {
            let status = status.map_err(BuildError::Wait)?;
            return Ok(Outcome::Exited(exit_code(status)));
        }
        stop = stop => stop,
    };

    if !stop.reaches_generator() {
        tracing::info!("Received {:?}, killing generator", stop);
        child.kill().await.map_err(BuildError::Wait)?;
        return Ok(Outcome::Stopped(stop));
    }

    // The terminal delivers SIGINT to the generator as well; give it time to exit
    tracing::info!("Interrupted, stopping generator");
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => {
            let status = status.map_err(BuildError::Wait)?;
            tracing::debug!("Generator exited with code {}", exit_code(status));
        }
        Err(_) => {
            tracing::warn!("Generator still running after {:?}, killing it", grace);
            child.kill().await.map_err(BuildError::Wait)?;
        }
    }

    Ok(Outcome::Stopped(stop))
}

/// Listen for SIGINT, SIGTERM and SIGHUP
///
/// Handlers are installed before this returns, so a signal that arrives
/// while the generator starts is not lost.
#[cfg(unix)]
fn stop_signal() -> impl Future<Output = Stop> {
    use tokio::signal::unix::{signal, Signal, SignalKind};

    let listen = |kind: SignalKind, name: &str| -> Option<Signal> {
        signal(kind)
            .map_err(|e| tracing::warn!("Cannot listen for {}: {}", name, e))
            .ok()
    };
    let mut terminate = listen(SignalKind::terminate(), "SIGTERM");
    let mut hangup = listen(SignalKind::hangup(), "SIGHUP");

    async move {
        tokio::select! {
            _ = ctrl_c() => Stop::Interrupt,
            _ = recv(&mut terminate) => Stop::Terminate,
            _ = recv(&mut hangup) => Stop::Hangup,
        }
    }
}

#[cfg(not(unix))]
fn stop_signal() -> impl Future<Output = Stop> {
    async {
        ctrl_c().await;
        Stop::Interrupt
    }
}

/// Resolves on the next delivery; never resolves without a handler
#[cfg(unix)]
async fn recv(signal: &mut Option<tokio::signal::unix::Signal>) {
    if let Some(signal) = signal {
        if signal.recv().await.is_some() {
            return;
        }
    }
    std::future::pending::<()>().await
}

/// Resolves on Ctrl+C; never resolves when the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
