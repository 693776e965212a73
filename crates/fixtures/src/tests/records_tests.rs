// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashSet;

use super::seeded_rng;
use crate::SyntheticUser;

#[test]
fn test_same_seed_same_user() {
    let a = SyntheticUser::generate(&mut seeded_rng(7));
    let b = SyntheticUser::generate(&mut seeded_rng(7));

    assert_eq!(a, b);
}

#[test]
fn test_email_is_derived_from_name() {
    let user = SyntheticUser::generate(&mut seeded_rng(42));

    let (first, last) = user.name.split_once(' ').unwrap();
    let prefix = format!("{}.{}.", first.to_lowercase(), last.to_lowercase());
    assert!(user.email.starts_with(&prefix), "{user:?}");

    let (local, domain) = user.email.split_once('@').unwrap();
    let tag = local.rsplit('.').next().unwrap();
    assert_eq!(tag.len(), 16);
    assert!(tag.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(domain.contains('.'));
}

#[test]
fn test_password_shape() {
    let user = SyntheticUser::generate(&mut seeded_rng(3));

    assert_eq!(user.password.len(), 16);
    assert!(user.password.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn test_emails_are_unique_across_a_batch() {
    let mut rng = seeded_rng(1);
    let users: Vec<SyntheticUser> = (0..500)
        .map(|_| SyntheticUser::generate(&mut rng))
        .collect();

    let emails: HashSet<&str> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails.len(), users.len());
}

#[test]
fn test_thread_random_users_differ() {
    let users = SyntheticUser::random_batch(20);

    let emails: HashSet<&str> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails.len(), 20);
}

#[test]
fn test_names_and_domains_cover_the_lists() {
    let mut rng = seeded_rng(99);
    let users: Vec<SyntheticUser> = (0..500)
        .map(|_| SyntheticUser::generate(&mut rng))
        .collect();

    let first_names: HashSet<&str> = users
        .iter()
        .filter_map(|u| u.name.split_once(' ').map(|(first, _)| first))
        .collect();
    let domains: HashSet<&str> = users
        .iter()
        .filter_map(|u| u.email.split_once('@').map(|(_, domain)| domain))
        .collect();

    assert_eq!(first_names.len(), 12);
    assert_eq!(domains.len(), 4);
}
