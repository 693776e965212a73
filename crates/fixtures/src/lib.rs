// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Synthetic records and insert-then-verify checks.
//!
//! Downstream tests generate random records, insert them through diesel and
//! read them back by their unique key. A round trip passes only when every
//! field comes back byte-for-byte identical.
//!
//! ## Backends
//!
//! The same queries run against `SQLite` (standard `cargo test`) and `MySQL`
//! (the live compose stack, `#[ignore]`d tests run by
//! `cargo xtask test-integration`).

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

/// Macro to generate monomorphic backend-specific query functions.
///
/// This macro generates two separate functions from a single function body:
/// - One suffixed with `_sqlite` taking `&mut SqliteConnection`
/// - One suffixed with `_mysql` taking `&mut MysqlConnection`
///
/// Diesel needs a concrete backend to type-check `sql_query` binds, so the
/// body is duplicated rather than made generic. `SqliteConnection` and
/// `MysqlConnection` must be in scope where the macro is invoked.
macro_rules! backend_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $conn:ident : &mut _
            $(, $param:ident : $param_ty:ty)* $(,)?
        ) -> $ret:ty
        $body:block
    ) => {
        pastey::paste! {
            // Generate SQLite version
            $(#[$meta])*
            $vis fn [<$name _sqlite>] (
                $conn: &mut SqliteConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body

            // Generate MySQL version
            $(#[$meta])*
            $vis fn [<$name _mysql>] (
                $conn: &mut MysqlConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body
        }
    };
}

mod error;
mod records;
mod users;

#[cfg(test)]
mod tests;

pub use error::FixtureError;
pub use records::SyntheticUser;
pub use users::{FixtureBackend, round_trip_user};
