// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The `users` table: create, insert, look up by email, round trip.
//!
//! The table definition is portable between `SQLite` and `MySQL`, so it can
//! be created on demand when the seed file did not provide it.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info};

use crate::error::FixtureError;
use crate::records::SyntheticUser;

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (\
     name VARCHAR(255) NOT NULL, \
     email VARCHAR(255) NOT NULL UNIQUE, \
     password VARCHAR(255) NOT NULL)";

#[derive(QueryableByName)]
struct UserRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    email: String,
    #[diesel(sql_type = Text)]
    password: String,
}

impl From<UserRow> for SyntheticUser {
    fn from(row: UserRow) -> Self {
        Self {
            name: row.name,
            email: row.email,
            password: row.password,
        }
    }
}

backend_fn! {
/// Inserts one user row.
///
/// # Errors
///
/// Returns an error if the insert fails, including on a duplicate email.
fn insert_user(conn: &mut _, user: &SyntheticUser) -> Result<(), FixtureError> {
    diesel::sql_query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
        .bind::<Text, _>(&user.name)
        .bind::<Text, _>(&user.email)
        .bind::<Text, _>(&user.password)
        .execute(conn)?;
    Ok(())
}
}

backend_fn! {
/// Looks a user up by email.
///
/// # Errors
///
/// Returns an error if the query fails. Returns `Ok(None)` if no row matches.
fn find_user_by_email(conn: &mut _, email: &str) -> Result<Option<SyntheticUser>, FixtureError> {
    let rows: Vec<UserRow> =
        diesel::sql_query("SELECT name, email, password FROM users WHERE email = ?")
            .bind::<Text, _>(email)
            .load(conn)?;
    Ok(rows.into_iter().next().map(SyntheticUser::from))
}
}

/// Backend operations needed by the round trip.
///
/// Implemented for `SqliteConnection` and `MysqlConnection` so that
/// [`round_trip_user`] is written once.
pub trait FixtureBackend: SimpleConnection {
    /// Creates the `users` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    fn ensure_users_table(&mut self) -> Result<(), FixtureError> {
        self.batch_execute(CREATE_USERS_TABLE)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails, including on a duplicate email.
    fn insert_user(&mut self, user: &SyntheticUser) -> Result<(), FixtureError>;

    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn find_user_by_email(&mut self, email: &str) -> Result<Option<SyntheticUser>, FixtureError>;
}

impl FixtureBackend for SqliteConnection {
    fn insert_user(&mut self, user: &SyntheticUser) -> Result<(), FixtureError> {
        insert_user_sqlite(self, user)
    }

    fn find_user_by_email(&mut self, email: &str) -> Result<Option<SyntheticUser>, FixtureError> {
        find_user_by_email_sqlite(self, email)
    }
}

impl FixtureBackend for MysqlConnection {
    fn insert_user(&mut self, user: &SyntheticUser) -> Result<(), FixtureError> {
        insert_user_mysql(self, user)
    }

    fn find_user_by_email(&mut self, email: &str) -> Result<Option<SyntheticUser>, FixtureError> {
        find_user_by_email_mysql(self, email)
    }
}

fn compare(field: &'static str, expected: &str, actual: &str) -> Result<(), FixtureError> {
    if expected.as_bytes() == actual.as_bytes() {
        Ok(())
    } else {
        Err(FixtureError::Mismatch {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Inserts `user` and reads it back by email.
///
/// # Errors
///
/// Returns [`FixtureError::NotFound`] if the row cannot be read back,
/// [`FixtureError::Mismatch`] naming the first differing field, or
/// [`FixtureError::Database`] if a query fails.
pub fn round_trip_user<C: FixtureBackend>(
    conn: &mut C,
    user: &SyntheticUser,
) -> Result<SyntheticUser, FixtureError> {
    debug!("Inserting synthetic user {}", user.email);
    conn.insert_user(user)?;

    let stored = conn
        .find_user_by_email(&user.email)?
        .ok_or_else(|| FixtureError::NotFound {
            key: user.email.clone(),
        })?;

    compare("name", &user.name, &stored.name)?;
    compare("email", &user.email, &stored.email)?;
    compare("password", &user.password, &stored.password)?;

    info!("Round trip verified for {}", user.email);
    Ok(stored)
}
