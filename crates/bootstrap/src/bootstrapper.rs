// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The bootstrap sequence and its state machine.
//!
//! ```text
//! Idle -> Resetting -> Launching -> AwaitingContainers -> AwaitingDatabase -> Seeding -> Ready
//!                          |               |                    |
//!                          +---------------+--------------------+--> Failed(reason)
//! ```
//!
//! `Ready` is the only successful terminal phase. `Seeding` always moves on
//! to `Ready`, whatever happened to individual statements.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::compose::{DockerCompose, Orchestrator};
use crate::config::{BootstrapConfig, DatabaseConfig};
use crate::database::{DatabaseProbe, MysqlProbe};
use crate::error::{BootstrapError, ReadinessCheck};
use crate::inventory::{DockerInventory, ServiceInventory, ServiceMap};
use crate::retry::{Clock, PollPolicy, SystemClock, poll_until};
use crate::seed::{SeedReport, apply_seed_file};

/// Where a bootstrap run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapPhase {
    Idle,
    Resetting,
    Launching,
    AwaitingContainers,
    AwaitingDatabase,
    Seeding,
    Ready,
    Failed(String),
}

impl BootstrapPhase {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }
}

impl std::fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Resetting => write!(f, "resetting"),
            Self::Launching => write!(f, "launching"),
            Self::AwaitingContainers => write!(f, "awaiting containers"),
            Self::AwaitingDatabase => write!(f, "awaiting database"),
            Self::Seeding => write!(f, "seeding"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// A ready environment, handed to the tests that depend on it.
#[derive(Debug)]
pub struct Environment {
    pub services: ServiceMap,
    pub seed: SeedReport,
    pub database: DatabaseConfig,
}

/// Drives one environment through the bootstrap sequence.
pub struct Bootstrapper<O, I, P, C = SystemClock> {
    config: BootstrapConfig,
    orchestrator: O,
    inventory: I,
    probe: P,
    clock: C,
    history: Vec<BootstrapPhase>,
}

impl Bootstrapper<DockerCompose, DockerInventory, MysqlProbe, SystemClock> {
    /// Bootstrapper wired to the `docker` CLI and a real `MySQL` server.
    #[must_use]
    pub fn docker(config: BootstrapConfig) -> Self {
        let orchestrator =
            DockerCompose::new(config.project_dir.clone(), config.compose_file.clone());
        Self::new(config, orchestrator, DockerInventory, MysqlProbe, SystemClock)
    }
}

impl<O, I, P, C> Bootstrapper<O, I, P, C>
where
    O: Orchestrator,
    I: ServiceInventory,
    P: DatabaseProbe,
    C: Clock,
{
    #[must_use]
    pub fn new(
        config: BootstrapConfig,
        orchestrator: O,
        inventory: I,
        probe: P,
        clock: C,
    ) -> Self {
        Self {
            config,
            orchestrator,
            inventory,
            probe,
            clock,
            history: vec![BootstrapPhase::Idle],
        }
    }

    #[must_use]
    pub const fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    #[must_use]
    pub const fn orchestrator(&self) -> &O {
        &self.orchestrator
    }

    #[must_use]
    pub const fn inventory(&self) -> &I {
        &self.inventory
    }

    #[must_use]
    pub const fn probe(&self) -> &P {
        &self.probe
    }

    /// The phase the last run reached.
    #[must_use]
    pub fn phase(&self) -> &BootstrapPhase {
        self.history.last().unwrap_or(&BootstrapPhase::Idle)
    }

    /// Every phase entered since construction, in order.
    #[must_use]
    pub fn history(&self) -> &[BootstrapPhase] {
        &self.history
    }

    fn enter(&mut self, phase: BootstrapPhase) {
        info!("Bootstrap phase: {phase}");
        self.history.push(phase);
    }

    fn fail(&mut self, err: BootstrapError) -> BootstrapError {
        self.enter(BootstrapPhase::Failed(err.to_string()));
        err
    }

    /// Runs the full sequence: reset, launch, await containers, await the
    /// database, seed.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::OrchestrationFailure`] if the environment
    /// cannot be launched and [`BootstrapError::ReadinessTimeout`] if either
    /// readiness check runs out of time. Seed problems are reported in
    /// [`Environment::seed`] instead.
    pub fn run(&mut self) -> Result<Environment, BootstrapError> {
        self.enter(BootstrapPhase::Resetting);
        self.reset();

        self.enter(BootstrapPhase::Launching);
        if let Err(err) = self.launch() {
            return Err(self.fail(err));
        }

        self.enter(BootstrapPhase::AwaitingContainers);
        let services = self.config.services.clone();
        let services = match self.await_services(&services, self.config.container_timeout) {
            Ok(services) => services,
            Err(err) => return Err(self.fail(err)),
        };

        self.enter(BootstrapPhase::AwaitingDatabase);
        let database = self.config.database.clone();
        if let Err(err) = self.await_database(&database, self.config.database_timeout) {
            return Err(self.fail(err));
        }

        self.enter(BootstrapPhase::Seeding);
        let seed = self.seed_database(&self.config.seed_path());

        self.enter(BootstrapPhase::Ready);
        Ok(Environment {
            services,
            seed,
            database,
        })
    }

    /// Runs the full sequence and tears the environment down again if it
    /// never became ready, unless `keep` is set.
    ///
    /// # Errors
    ///
    /// Returns the error [`Bootstrapper::run`] failed with, after teardown.
    pub fn run_or_teardown(&mut self, keep: bool) -> Result<Environment, BootstrapError> {
        self.run().inspect_err(|err| {
            if keep {
                warn!("Leaving the failed environment running: {err}");
            } else {
                warn!("Tearing down the failed environment: {err}");
                self.reset();
            }
        })
    }

    /// Tears down any previous environment and its volumes.
    ///
    /// Never fails: with no previous environment there is nothing to tear
    /// down, and a fresh launch can proceed either way.
    pub fn reset(&self) {
        info!("Stopping existing containers");
        if let Err(err) = self.orchestrator.down() {
            warn!("Ignoring failed teardown: {err}");
        }
    }

    /// Starts the environment.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::OrchestrationFailure`] if compose cannot be
    /// invoked or exits non-zero.
    pub fn launch(&self) -> Result<(), BootstrapError> {
        info!("Starting Docker Compose");
        self.orchestrator.up()
    }

    /// Waits until every name in `expected` is a running container.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::ReadinessTimeout`] naming the missing
    /// services if `timeout` elapses first.
    pub fn await_services(
        &self,
        expected: &[String],
        timeout: Duration,
    ) -> Result<ServiceMap, BootstrapError> {
        info!("Waiting for containers: {}", expected.join(", "));
        let policy = PollPolicy::new(self.config.poll_interval, timeout);

        let result = poll_until(&self.clock, policy, |attempt| {
            let running = self.inventory.running().unwrap_or_else(|err| {
                debug!("Inventory attempt {attempt} failed: {err}");
                Vec::new()
            });
            let services = ServiceMap::observe(expected, &running);
            if services.is_ready() {
                Ok(services)
            } else {
                debug!(
                    "Attempt {attempt}: still waiting for {}",
                    services.missing().join(", ")
                );
                Err(services)
            }
        });

        match result {
            Ok(services) => {
                info!("All containers are up");
                Ok(services)
            }
            Err(expired) => Err(BootstrapError::ReadinessTimeout {
                check: ReadinessCheck::Containers,
                detail: format!(
                    "missing {} after {} attempts",
                    expired.last.missing().join(", "),
                    expired.attempts
                ),
            }),
        }
    }

    /// Waits until the database accepts a connection.
    ///
    /// Every connection failure is retried, including authentication
    /// failures. Each successful probe connection is dropped immediately.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::ReadinessTimeout`] with the last connection
    /// error if `timeout` elapses first.
    pub fn await_database(
        &self,
        database: &DatabaseConfig,
        timeout: Duration,
    ) -> Result<(), BootstrapError> {
        info!("Waiting for database at {}", database.redacted_url());
        let policy = PollPolicy::new(self.config.poll_interval, timeout);

        let result = poll_until(&self.clock, policy, |attempt| {
            self.probe.connect(database).map(drop).inspect_err(|err| {
                debug!("Connection attempt {attempt} failed: {err}");
            })
        });

        match result {
            Ok(()) => {
                info!("Database is ready");
                Ok(())
            }
            Err(expired) => Err(BootstrapError::ReadinessTimeout {
                check: ReadinessCheck::Database,
                detail: format!("{} after {} attempts", expired.last, expired.attempts),
            }),
        }
    }

    /// Applies the seed file at `path` to the configured database.
    ///
    /// A missing file is skipped. Statement failures are logged and recorded
    /// in the returned report; they never abort the bootstrap.
    #[must_use]
    pub fn seed_database(&self, path: &Path) -> SeedReport {
        apply_seed_file(path, || self.probe.connect(&self.config.database))
    }
}
