// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Synthetic record generation.

use rand::seq::IndexedRandom;
use rand::{Rng, RngExt};

const FIRST_NAMES: [&str; 12] = [
    "Amelia", "Bruno", "Chiara", "Dmitri", "Esther", "Farid", "Greta", "Hiro", "Ines", "Jonas",
    "Keira", "Luca",
];

const LAST_NAMES: [&str; 12] = [
    "Alvarez", "Bianchi", "Chen", "Dubois", "Eriksen", "Fischer", "Garcia", "Haddad", "Ivanova",
    "Jensen", "Kowalski", "Laurent",
];

const DOMAINS: [&str; 4] = ["example.com", "example.org", "example.net", "test.local"];

const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

const PASSWORD_LENGTH: usize = 16;

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, choices: &[&'a str]) -> &'a str {
    choices.choose(rng).copied().unwrap_or_default()
}

/// A user row with a unique email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SyntheticUser {
    /// Generates a user from `rng`.
    ///
    /// The email embeds a 64-bit random tag, so two generated users collide
    /// only if the generator repeats itself.
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let first = pick(rng, &FIRST_NAMES);
        let last = pick(rng, &LAST_NAMES);
        let domain = pick(rng, &DOMAINS);
        let tag: u64 = rng.random();

        let password = (0..PASSWORD_LENGTH)
            .map(|_| char::from(PASSWORD_ALPHABET[rng.random_range(0..PASSWORD_ALPHABET.len())]))
            .collect();

        Self {
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}.{tag:016x}@{domain}",
                first.to_lowercase(),
                last.to_lowercase()
            ),
            password,
        }
    }

    /// Generates a user from the thread-local random generator.
    #[must_use]
    pub fn random() -> Self {
        Self::generate(&mut rand::rng())
    }

    /// Generates `count` users from the thread-local random generator.
    #[must_use]
    pub fn random_batch(count: usize) -> Vec<Self> {
        (0..count).map(|_| Self::random()).collect()
    }
}
