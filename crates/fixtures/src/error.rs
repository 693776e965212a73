// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors from fixture insertion and verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixtureError {
    /// A query failed.
    #[error("Database error: {0}")]
    Database(String),

    /// No row exists for the key that was just inserted.
    #[error("No record found for {key}")]
    NotFound { key: String },

    /// A row came back but a field differs from what was inserted.
    #[error("Field `{field}` mismatch: inserted {expected:?}, read {actual:?}")]
    Mismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
}

impl From<diesel::result::Error> for FixtureError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err.to_string())
    }
}
