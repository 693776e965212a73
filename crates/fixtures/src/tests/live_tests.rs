// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Round trips against the live `MySQL` server.
//!
//! Run via `cargo xtask test-integration`, which bootstraps the compose
//! stack and sets `DATABASE_URL` and `BADRAGE_TEST_BACKEND`.

use diesel::{Connection, MysqlConnection};
use std::env;

use crate::{FixtureBackend, SyntheticUser, round_trip_user};

/// # Panics
///
/// Panics if `DATABASE_URL` is not set, indicating missing infrastructure.
fn get_mysql_url() -> String {
    env::var("DATABASE_URL")
        .expect("DATABASE_URL not set - live tests must be run via `cargo xtask test-integration`")
}

/// # Panics
///
/// Panics if `BADRAGE_TEST_BACKEND` is not set to `mysql`.
fn verify_live_test_environment() {
    let backend = env::var("BADRAGE_TEST_BACKEND").expect(
        "BADRAGE_TEST_BACKEND not set - live tests must be run via `cargo xtask test-integration`",
    );
    assert_eq!(backend, "mysql", "BADRAGE_TEST_BACKEND must be 'mysql'");
}

fn connect() -> MysqlConnection {
    verify_live_test_environment();
    let mut conn = MysqlConnection::establish(&get_mysql_url()).unwrap();
    conn.ensure_users_table().unwrap();
    conn
}

#[test]
#[ignore = "requires MySQL via cargo xtask test-integration"]
fn test_live_user_round_trip() {
    let mut conn = connect();
    let user = SyntheticUser::random();

    let stored = round_trip_user(&mut conn, &user).unwrap();

    assert_eq!(stored, user);
}

#[test]
#[ignore = "requires MySQL via cargo xtask test-integration"]
fn test_live_batch_round_trip() {
    let mut conn = connect();

    for user in SyntheticUser::random_batch(10) {
        round_trip_user(&mut conn, &user).unwrap();
    }
}

#[test]
#[ignore = "requires MySQL via cargo xtask test-integration"]
fn test_live_duplicate_email_rejected() {
    let mut conn = connect();
    let user = SyntheticUser::random();
    conn.insert_user(&user).unwrap();

    assert!(conn.insert_user(&user).is_err());
}
