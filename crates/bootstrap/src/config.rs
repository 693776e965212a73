// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bootstrap configuration.
//!
//! All connection details are carried explicitly so that several isolated
//! environments (different ports, schemas, compose projects) can be driven
//! from the same process.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default services declared by the compose file.
pub const DEFAULT_SERVICES: [&str; 2] = ["mysql_server", "phpmyadmin"];

/// Default seed file, relative to the compose project directory.
pub const DEFAULT_SEED_FILE: &str = "badrage-migration.sql";

/// Connection parameters for the database under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 3306,
            user: String::from("user"),
            password: String::from("password"),
            database: String::from("badrage_database"),
        }
    }
}

impl DatabaseConfig {
    /// Connection URL in the form accepted by diesel's `MySQL` backend.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }

    /// Same as [`Self::url`] with the password masked, for logging.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        format!(
            "mysql://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// Everything a bootstrap run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Directory the compose commands run in.
    pub project_dir: PathBuf,
    /// Explicit compose file; `None` lets compose discover it.
    pub compose_file: Option<PathBuf>,
    /// Container names that must be running before the database is probed.
    pub services: Vec<String>,
    pub database: DatabaseConfig,
    /// Seed file; relative paths resolve against `project_dir`.
    pub seed_file: PathBuf,
    pub poll_interval: Duration,
    pub container_timeout: Duration,
    pub database_timeout: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            compose_file: None,
            services: DEFAULT_SERVICES.iter().map(ToString::to_string).collect(),
            database: DatabaseConfig::default(),
            seed_file: PathBuf::from(DEFAULT_SEED_FILE),
            poll_interval: Duration::from_secs(3),
            container_timeout: Duration::from_secs(30),
            database_timeout: Duration::from_secs(30),
        }
    }
}

impl BootstrapConfig {
    /// Resolved location of the seed file.
    #[must_use]
    pub fn seed_path(&self) -> PathBuf {
        resolve(&self.project_dir, &self.seed_file)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
