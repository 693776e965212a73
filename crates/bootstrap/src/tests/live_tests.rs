// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests against the live compose stack.
//!
//! These are marked `#[ignore]` and run only via
//! `cargo xtask test-integration`, which bootstraps the stack first and
//! exports `BADRAGE_TEST_BACKEND=mysql` together with the services and
//! connection details it bootstrapped.

use std::env;
use std::time::Duration;

use crate::{
    BootstrapConfig, Bootstrapper, DatabaseConfig, DatabaseProbe, DockerInventory, MysqlProbe,
    ServiceInventory,
};

/// # Panics
///
/// Panics if `BADRAGE_TEST_BACKEND` is not set to `mysql`.
fn verify_live_test_environment() {
    let backend = env::var("BADRAGE_TEST_BACKEND").expect(
        "BADRAGE_TEST_BACKEND not set - live tests must be run via `cargo xtask test-integration`",
    );
    assert_eq!(backend, "mysql", "BADRAGE_TEST_BACKEND must be 'mysql'");
}

/// # Panics
///
/// Panics if `name` is not set, indicating missing infrastructure.
fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        panic!("{name} not set - live tests must be run via `cargo xtask test-integration`")
    })
}

/// The configuration the running stack was bootstrapped with.
fn live_config() -> BootstrapConfig {
    verify_live_test_environment();
    BootstrapConfig {
        services: required("BADRAGE_SERVICES")
            .split(',')
            .map(ToString::to_string)
            .collect(),
        database: DatabaseConfig {
            host: required("BADRAGE_DB_HOST"),
            port: required("BADRAGE_DB_PORT")
                .parse()
                .expect("BADRAGE_DB_PORT must be a port number"),
            user: required("BADRAGE_DB_USER"),
            password: required("BADRAGE_DB_PASSWORD"),
            database: required("BADRAGE_DB_NAME"),
        },
        ..BootstrapConfig::default()
    }
}

#[test]
#[ignore = "requires the compose stack via cargo xtask test-integration"]
fn test_live_config_matches_database_url() {
    let config = live_config();

    assert_eq!(config.database.url(), required("DATABASE_URL"));
}

#[test]
#[ignore = "requires the compose stack via cargo xtask test-integration"]
fn test_live_containers_up() {
    let config = live_config();

    let running = DockerInventory.running().unwrap();

    for service in config.services {
        assert!(
            running.iter().any(|h| h.name == service),
            "Container {service} not found"
        );
    }
}

#[test]
#[ignore = "requires the compose stack via cargo xtask test-integration"]
fn test_live_database_accepts_connections() {
    let config = live_config();

    let result = MysqlProbe.connect(&config.database);

    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[test]
#[ignore = "requires the compose stack via cargo xtask test-integration"]
fn test_live_await_database_is_idempotent() {
    let config = live_config();
    let bootstrapper = Bootstrapper::docker(config.clone());

    for _ in 0..2 {
        bootstrapper
            .await_database(&config.database, Duration::from_secs(5))
            .unwrap();
    }
}
