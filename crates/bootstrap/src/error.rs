// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::PathBuf;

use thiserror::Error;

/// Which readiness probe gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessCheck {
    /// The expected containers never all appeared.
    Containers,
    /// The database never accepted a connection.
    Database,
}

impl std::fmt::Display for ReadinessCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Containers => write!(f, "containers"),
            Self::Database => write!(f, "database"),
        }
    }
}

/// Errors that can occur while bootstrapping the environment.
///
/// Only [`BootstrapError::OrchestrationFailure`] and
/// [`BootstrapError::ReadinessTimeout`] ever escape [`crate::Bootstrapper::run`].
/// The remaining variants are absorbed inside polling loops or recorded in a
/// [`crate::SeedReport`].
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The compose command could not be spawned or exited non-zero.
    #[error("orchestration command `{command}` failed: {reason}")]
    OrchestrationFailure { command: String, reason: String },

    /// A readiness probe did not succeed before its deadline.
    #[error("timed out waiting for {check}: {detail}")]
    ReadinessTimeout {
        check: ReadinessCheck,
        detail: String,
    },

    /// A database connection attempt failed.
    #[error("database connection failed: {0}")]
    Connectivity(String),

    /// A single seed statement failed to execute.
    #[error("seed statement #{index} failed: {reason}")]
    SeedStatement { index: usize, reason: String },

    /// The seed file exists but could not be read.
    #[error("failed to read seed file {}: {source}", path.display())]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The running-container inventory could not be queried or parsed.
    #[error("container inventory query failed: {0}")]
    InventoryQuery(String),
}

impl BootstrapError {
    /// Returns true for the kinds that abort a bootstrap run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::OrchestrationFailure { .. } | Self::ReadinessTimeout { .. }
        )
    }
}

impl From<diesel::ConnectionError> for BootstrapError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::Connectivity(err.to_string())
    }
}
