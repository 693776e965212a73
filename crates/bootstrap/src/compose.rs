// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Docker Compose orchestration.

use std::io;
use std::path::PathBuf;
use std::process::Output;

use duct::cmd;

use crate::error::BootstrapError;

/// Tears down and brings up the multi-container environment.
pub trait Orchestrator {
    /// Stops the environment and removes its volumes.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    /// Callers treat this as best-effort.
    fn down(&self) -> Result<(), BootstrapError>;

    /// Starts every declared service, detached, without rebuilding images.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::OrchestrationFailure`] if the command cannot
    /// be spawned or exits non-zero.
    fn up(&self) -> Result<(), BootstrapError>;
}

/// [`Orchestrator`] backed by the `docker compose` CLI.
#[derive(Debug, Clone)]
pub struct DockerCompose {
    project_dir: PathBuf,
    compose_file: Option<PathBuf>,
}

impl DockerCompose {
    #[must_use]
    pub const fn new(project_dir: PathBuf, compose_file: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            compose_file,
        }
    }

    /// Full argument list for `docker compose <subcommand...>`.
    #[must_use]
    pub fn args(&self, subcommand: &[&str]) -> Vec<String> {
        let mut args = vec![String::from("compose")];
        if let Some(file) = &self.compose_file {
            args.push(String::from("-f"));
            args.push(file.display().to_string());
        }
        args.extend(subcommand.iter().map(ToString::to_string));
        args
    }

    fn run(&self, subcommand: &[&str]) -> Result<(), BootstrapError> {
        let args = self.args(subcommand);
        cmd("docker", &args)
            .dir(&self.project_dir)
            .run_with_trace()
            .map_err(|e| BootstrapError::OrchestrationFailure {
                command: format!("docker {}", args.join(" ")),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

impl Orchestrator for DockerCompose {
    fn down(&self) -> Result<(), BootstrapError> {
        self.run(&["down", "-v"])
    }

    fn up(&self) -> Result<(), BootstrapError> {
        self.run(&["up", "--no-build", "-d"])
    }
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
pub trait ExpressionExt {
    /// Run the command and log the command being run
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    fn run_with_trace(&self) -> io::Result<Output>;

    /// Capture stdout of the command and log the command being run
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exits non-zero.
    fn read_with_trace(&self) -> io::Result<String>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }

    fn read_with_trace(&self) -> io::Result<String> {
        tracing::debug!("reading command output: {:?}", self);
        self.read().inspect_err(|e| {
            tracing::debug!("failed to read command output: {:?}: {e}", self);
        })
    }
}
