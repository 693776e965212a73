// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database sessions for readiness probing and seeding.
//!
//! A session is opened per operation and dropped when that operation ends;
//! nothing holds a connection across bootstrap steps.

use diesel::connection::SimpleConnection;
use diesel::{Connection, MysqlConnection};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::BootstrapError;

/// Executes one raw SQL statement, committing it immediately.
pub trait SeedSession {
    /// # Errors
    ///
    /// Returns the database's error message if the statement fails.
    fn execute_statement(&mut self, statement: &str) -> Result<(), String>;
}

impl<C: SimpleConnection> SeedSession for C {
    fn execute_statement(&mut self, statement: &str) -> Result<(), String> {
        self.batch_execute(statement).map_err(|e| e.to_string())
    }
}

/// Opens sessions against the database under test.
pub trait DatabaseProbe {
    type Session: SeedSession;

    /// Opens a new session.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Connectivity`] if the connection cannot be
    /// established, for whatever reason.
    fn connect(&self, config: &DatabaseConfig) -> Result<Self::Session, BootstrapError>;
}

/// [`DatabaseProbe`] backed by diesel's `MySQL` backend.
///
/// `MySQL` runs in autocommit mode unless a transaction is opened, so every
/// seed statement is committed as soon as it executes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlProbe;

impl DatabaseProbe for MysqlProbe {
    type Session = MysqlConnection;

    fn connect(&self, config: &DatabaseConfig) -> Result<Self::Session, BootstrapError> {
        debug!("Connecting to {}", config.redacted_url());
        Ok(MysqlConnection::establish(&config.url())?)
    }
}
