// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Running-container inventory.
//!
//! The inventory answers one question: which container names are running
//! right now. [`ServiceMap`] compares that answer against the expected
//! service names.

use std::collections::BTreeMap;

use duct::cmd;
use serde::Deserialize;

use crate::compose::ExpressionExt;
use crate::error::BootstrapError;

/// A running container as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: String,
}

/// Lists the containers that are currently running.
pub trait ServiceInventory {
    /// # Errors
    ///
    /// Returns [`BootstrapError::InventoryQuery`] if the runtime cannot be
    /// queried or its answer cannot be parsed.
    fn running(&self) -> Result<Vec<ContainerHandle>, BootstrapError>;
}

/// [`ServiceInventory`] backed by `docker ps`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerInventory;

impl ServiceInventory for DockerInventory {
    fn running(&self) -> Result<Vec<ContainerHandle>, BootstrapError> {
        let output = cmd!("docker", "ps", "--format", "{{json .}}")
            .stderr_null()
            .read_with_trace()
            .map_err(|e| BootstrapError::InventoryQuery(e.to_string()))?;
        parse_ps_output(&output)
    }
}

/// One line of `docker ps --format '{{json .}}'`.
#[derive(Debug, Deserialize)]
struct PsLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names")]
    names: String,
    #[serde(rename = "Image", default)]
    image: String,
    #[serde(rename = "State", default)]
    state: String,
}

/// Parses `docker ps` JSON-lines output.
///
/// A container listed under several comma-separated names yields one handle
/// per name. Blank lines are ignored.
///
/// # Errors
///
/// Returns [`BootstrapError::InventoryQuery`] if any line is not valid JSON.
pub fn parse_ps_output(output: &str) -> Result<Vec<ContainerHandle>, BootstrapError> {
    let mut handles = Vec::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let parsed: PsLine = serde_json::from_str(line)
            .map_err(|e| BootstrapError::InventoryQuery(format!("{e}: {line}")))?;

        for name in parsed
            .names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            handles.push(ContainerHandle {
                id: parsed.id.clone(),
                name: name.to_string(),
                image: parsed.image.clone(),
                state: parsed.state.clone(),
            });
        }
    }

    Ok(handles)
}

/// Expected service name to its discovered handle, if any.
///
/// Rebuilt from scratch on every poll so a container that disappears between
/// polls is reported as missing again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceMap {
    entries: BTreeMap<String, Option<ContainerHandle>>,
}

impl ServiceMap {
    /// Matches `expected` names against the running handles.
    #[must_use]
    pub fn observe(expected: &[String], running: &[ContainerHandle]) -> Self {
        let entries = expected
            .iter()
            .map(|service| {
                let handle = running.iter().find(|h| &h.name == service).cloned();
                (service.clone(), handle)
            })
            .collect();
        Self { entries }
    }

    /// True when every expected service has a handle.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.entries.values().all(Option::is_some)
    }

    /// Expected services with no running container, in name order.
    #[must_use]
    pub fn missing(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, handle)| handle.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    #[must_use]
    pub fn get(&self, service: &str) -> Option<&ContainerHandle> {
        self.entries.get(service).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn contains(&self, service: &str) -> bool {
        self.get(service).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ContainerHandle>)> {
        self.entries
            .iter()
            .map(|(name, handle)| (name.as_str(), handle.as_ref()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
