// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation and Environment Orchestration
//!
//! ### Environment Commands
//!
//! - `cargo xtask bootstrap` — Reset, launch, await and seed the compose stack
//! - `cargo xtask reset` — Tear the compose stack and its volumes down
//! - `cargo xtask seed` — Apply the seed file to an already running database
//! - `cargo xtask test-integration` — Bootstrap, then run the live tests
//!
//! ### Implementation Details
//!
//! The `test-integration` command:
//! - Runs the full bootstrap sequence (fails fast if the stack never comes up)
//! - Sets `DATABASE_URL`, `BADRAGE_TEST_BACKEND` and the bootstrapped
//!   `BADRAGE_SERVICES` / `BADRAGE_DB_*` values for the test process
//! - Executes explicitly ignored `live_tests` via the `--ignored` flag
//! - Tears the stack down afterwards unless `--keep` is given
//!
//! Every environment option can also be set through a `BADRAGE_*` variable,
//! see `cargo xtask bootstrap --help`.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::path::PathBuf;
use std::time::Duration;

use badrage_bootstrap::{
    BootstrapConfig, Bootstrapper, DEFAULT_SEED_FILE, DEFAULT_SERVICES, DatabaseConfig,
    Environment, ExpressionExt,
};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Lint formatting and clippy
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests that need no infrastructure
    #[command(visible_alias = "t")]
    Test,

    /// Reset, launch, await and seed the compose environment
    #[command(visible_alias = "up")]
    Bootstrap(EnvironmentArgs),

    /// Tear down the compose environment and its volumes
    #[command(visible_alias = "down")]
    Reset(EnvironmentArgs),

    /// Apply the seed file to the running database
    Seed(EnvironmentArgs),

    /// Bootstrap the environment and run the live integration tests
    #[command(visible_alias = "ti")]
    TestIntegration {
        #[command(flatten)]
        environment: EnvironmentArgs,

        /// Leave the environment running after the tests
        #[arg(long)]
        keep: bool,
    },
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintFormatting => lint_format(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::Bootstrap(environment) => bootstrap(&environment),
            Self::Reset(environment) => reset(&environment),
            Self::Seed(environment) => seed(&environment),
            Self::TestIntegration { environment, keep } => test_integration(&environment, keep),
        }
    }
}

/// Where the environment lives and how to reach it.
#[derive(Clone, Debug, clap::Args)]
struct EnvironmentArgs {
    /// Directory containing the compose file
    #[arg(long, env = "BADRAGE_PROJECT_DIR", default_value = ".")]
    project_dir: PathBuf,

    /// Compose file, if not the default one in the project directory
    #[arg(short = 'f', long, env = "BADRAGE_COMPOSE_FILE")]
    compose_file: Option<PathBuf>,

    /// Container names that must be running
    #[arg(
        long = "service",
        env = "BADRAGE_SERVICES",
        value_delimiter = ',',
        default_values = DEFAULT_SERVICES
    )]
    services: Vec<String>,

    #[arg(long, env = "BADRAGE_DB_HOST", default_value = "127.0.0.1")]
    db_host: String,

    #[arg(long, env = "BADRAGE_DB_PORT", default_value_t = 3306)]
    db_port: u16,

    #[arg(long, env = "BADRAGE_DB_USER", default_value = "user")]
    db_user: String,

    #[arg(long, env = "BADRAGE_DB_PASSWORD", default_value = "password", hide_env_values = true)]
    db_password: String,

    #[arg(long, env = "BADRAGE_DB_NAME", default_value = "badrage_database")]
    db_name: String,

    /// Seed file, relative to the project directory
    #[arg(long, env = "BADRAGE_SEED_FILE", default_value = DEFAULT_SEED_FILE)]
    seed_file: PathBuf,

    /// Seconds between readiness checks
    #[arg(long, default_value_t = 3)]
    poll_interval: u64,

    /// Seconds to wait for the containers
    #[arg(long, default_value_t = 30)]
    container_timeout: u64,

    /// Seconds to wait for the database
    #[arg(long, default_value_t = 30)]
    database_timeout: u64,
}

impl EnvironmentArgs {
    fn config(&self) -> BootstrapConfig {
        BootstrapConfig {
            project_dir: self.project_dir.clone(),
            compose_file: self.compose_file.clone(),
            services: self.services.clone(),
            database: DatabaseConfig {
                host: self.db_host.clone(),
                port: self.db_port,
                user: self.db_user.clone(),
                password: self.db_password.clone(),
                database: self.db_name.clone(),
            },
            seed_file: self.seed_file.clone(),
            poll_interval: Duration::from_secs(self.poll_interval),
            container_timeout: Duration::from_secs(self.container_timeout),
            database_timeout: Duration::from_secs(self.database_timeout),
        }
    }
}

/// Run CI checks (lint, build, test)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Lint formatting and clippy
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Run the workspace tests; live tests stay ignored
fn test() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Check Docker is reachable before touching the environment
fn check_docker() -> Result<()> {
    tracing::info!("Checking Docker availability");
    cmd!("docker", "--version")
        .run_with_trace()
        .wrap_err("Docker is not available. Please install Docker.")?;
    Ok(())
}

fn log_environment(environment: &Environment) {
    for (service, handle) in environment.services.iter() {
        if let Some(handle) = handle {
            tracing::info!("{service}: {} ({}, {})", handle.id, handle.image, handle.state);
        }
    }

    let seed = &environment.seed;
    if seed.skipped {
        tracing::warn!("Seed file {} was not found", seed.path.display());
    } else if !seed.is_clean() {
        tracing::warn!(
            "Seed applied with {} of {} statements failing",
            seed.failed(),
            seed.statements
        );
    }

    tracing::info!("Database ready at {}", environment.database.redacted_url());
}

/// Reset, launch, await and seed the compose environment
fn bootstrap(args: &EnvironmentArgs) -> Result<()> {
    check_docker()?;
    let mut bootstrapper = Bootstrapper::docker(args.config());
    let environment = bootstrapper
        .run()
        .wrap_err("Failed to bootstrap the environment")?;
    log_environment(&environment);
    Ok(())
}

/// Tear down the compose environment and its volumes
fn reset(args: &EnvironmentArgs) -> Result<()> {
    check_docker()?;
    Bootstrapper::docker(args.config()).reset();
    Ok(())
}

/// Apply the seed file to the running database
///
/// Statement failures are reported but do not fail the command, matching
/// how seeding behaves during a full bootstrap.
fn seed(args: &EnvironmentArgs) -> Result<()> {
    let config = args.config();
    let seed_path = config.seed_path();
    let report = Bootstrapper::docker(config).seed_database(&seed_path);

    tracing::info!(
        "Seed finished: {} executed, {} failed, {} total",
        report.executed,
        report.failed(),
        report.statements
    );
    Ok(())
}

/// Bootstrap the environment and run the live integration tests
///
/// ## What This Command Does
///
/// 1. Validates Docker is available
/// 2. Runs the full bootstrap sequence
/// 3. Sets required environment variables:
///    - `DATABASE_URL`: `MySQL` connection string
///    - `BADRAGE_TEST_BACKEND`: Set to "mysql"
///    - `BADRAGE_SERVICES` and `BADRAGE_DB_*`: what was bootstrapped
/// 4. Runs the ignored `live_tests` of both library crates
/// 5. Tears the environment down (always, even when the bootstrap or the
///    tests fail) unless `--keep`
///
/// ## Failures
///
/// The command fails if:
/// - Docker is not available
/// - The compose stack fails to start
/// - The containers or the database do not become ready within timeout
/// - Any live test fails
fn test_integration(args: &EnvironmentArgs, keep: bool) -> Result<()> {
    check_docker()?;
    let mut bootstrapper = Bootstrapper::docker(args.config());
    let environment = bootstrapper
        .run_or_teardown(keep)
        .wrap_err("Failed to bootstrap the integration environment")?;
    log_environment(&environment);

    // Filter to live_tests so the regular suite is not run twice
    tracing::info!("Running live integration tests");
    let test_result = cmd!(
        "cargo",
        "test",
        "--package",
        "badrage-bootstrap",
        "--package",
        "badrage-fixtures",
        "live_tests",
        "--",
        "--ignored",
        "--test-threads=1"
    )
    .env("DATABASE_URL", environment.database.url())
    .env("BADRAGE_TEST_BACKEND", "mysql")
    .env("BADRAGE_SERVICES", args.services.join(","))
    .env("BADRAGE_DB_HOST", &environment.database.host)
    .env("BADRAGE_DB_PORT", environment.database.port.to_string())
    .env("BADRAGE_DB_USER", &environment.database.user)
    .env("BADRAGE_DB_PASSWORD", &environment.database.password)
    .env("BADRAGE_DB_NAME", &environment.database.database)
    .run_with_trace();

    if keep {
        tracing::info!("Leaving environment running (--keep)");
    } else {
        bootstrapper.reset();
    }

    test_result.wrap_err("Live integration tests failed")?;

    tracing::info!("Live integration tests completed successfully");
    Ok(())
}
