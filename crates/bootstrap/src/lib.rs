// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Environment bootstrapper for the Badrage integration stack.
//!
//! This crate brings the Docker Compose environment (a `MySQL` server and a
//! phpMyAdmin UI) into a state where dependent tests can safely run.
//!
//! ## Bootstrap Sequence
//!
//! 1. **Reset** — `docker compose down -v`, best-effort
//! 2. **Launch** — `docker compose up --no-build -d`, fatal on failure
//! 3. **Await containers** — poll the running-container inventory
//! 4. **Await database** — poll by opening real `MySQL` connections
//! 5. **Seed** — apply the seed file statement by statement, never fatal
//!
//! Each step is exposed on [`Bootstrapper`] so callers can run them
//! individually, and [`Bootstrapper::run`] drives the whole sequence while
//! recording every [`BootstrapPhase`] it passes through.
//!
//! ## Seams
//!
//! The outside world is reached through three traits:
//!
//! - [`Orchestrator`] — compose down/up ([`DockerCompose`] in production)
//! - [`ServiceInventory`] — running containers ([`DockerInventory`])
//! - [`DatabaseProbe`] — database sessions ([`MysqlProbe`])
//!
//! Polling goes through a [`Clock`] so tests never wait on a real timer.
//!
//! ## Testing Philosophy
//!
//! - Standard tests (`cargo test`) use fakes and in-memory `SQLite`
//! - Tests against the live stack are marked `#[ignore]`
//! - The live stack is orchestrated by `cargo xtask test-integration`

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod bootstrapper;
mod compose;
mod config;
mod database;
mod error;
mod inventory;
mod retry;
mod seed;

#[cfg(test)]
mod tests;

pub use bootstrapper::{BootstrapPhase, Bootstrapper, Environment};
pub use compose::{DockerCompose, ExpressionExt, Orchestrator};
pub use config::{BootstrapConfig, DEFAULT_SEED_FILE, DEFAULT_SERVICES, DatabaseConfig};
pub use database::{DatabaseProbe, MysqlProbe, SeedSession};
pub use error::{BootstrapError, ReadinessCheck};
pub use inventory::{ContainerHandle, DockerInventory, ServiceInventory, ServiceMap};
pub use retry::{Clock, PollPolicy, PollTimeout, SystemClock, poll_until};
pub use seed::{SeedReport, apply_statements, split_statements};
