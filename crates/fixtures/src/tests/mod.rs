// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod live_tests;
mod records_tests;

use diesel::{Connection, SqliteConnection};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::FixtureBackend;

/// In-memory `SQLite` database with the `users` table in place.
pub fn create_test_connection() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    conn.ensure_users_table().unwrap();
    conn
}

/// Reproducible generator for records that must not change between runs.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
