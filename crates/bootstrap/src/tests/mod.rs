// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod live_tests;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::{
    BootstrapConfig, BootstrapError, Bootstrapper, Clock, ContainerHandle, DatabaseConfig,
    DatabaseProbe, Orchestrator, SeedSession, ServiceInventory,
};

/// Clock that only moves when something sleeps on it.
pub struct ManualClock {
    now: Cell<Instant>,
    slept: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
            slept: RefCell::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.slept.borrow().iter().sum()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
        self.slept.borrow_mut().push(duration);
    }
}

impl Clock for Rc<ManualClock> {
    fn now(&self) -> Instant {
        self.as_ref().now()
    }

    fn sleep(&self, duration: Duration) {
        self.as_ref().sleep(duration);
    }
}

/// Records compose calls and fails them on request.
#[derive(Default)]
pub struct FakeOrchestrator {
    pub calls: RefCell<Vec<&'static str>>,
    pub fail_down: bool,
    pub fail_up: bool,
}

impl Orchestrator for FakeOrchestrator {
    fn down(&self) -> Result<(), BootstrapError> {
        self.calls.borrow_mut().push("down");
        if self.fail_down {
            return Err(BootstrapError::OrchestrationFailure {
                command: String::from("docker compose down -v"),
                reason: String::from("no such project"),
            });
        }
        Ok(())
    }

    fn up(&self) -> Result<(), BootstrapError> {
        self.calls.borrow_mut().push("up");
        if self.fail_up {
            return Err(BootstrapError::OrchestrationFailure {
                command: String::from("docker compose up --no-build -d"),
                reason: String::from("exited with status 1"),
            });
        }
        Ok(())
    }
}

/// Containers that show up after a given number of inventory queries.
#[derive(Default)]
pub struct FakeInventory {
    appears_at: BTreeMap<String, u32>,
    queries: Cell<u32>,
    pub broken_until: u32,
}

impl FakeInventory {
    /// Every named container is running from the first query on.
    pub fn with_running(names: &[&str]) -> Self {
        let mut inventory = Self::default();
        for name in names {
            inventory = inventory.appearing(name, 1);
        }
        inventory
    }

    /// `name` is listed from the `query`-th inventory query onwards.
    pub fn appearing(mut self, name: &str, query: u32) -> Self {
        self.appears_at.insert(name.to_string(), query);
        self
    }

    pub fn queries(&self) -> u32 {
        self.queries.get()
    }
}

impl ServiceInventory for FakeInventory {
    fn running(&self) -> Result<Vec<ContainerHandle>, BootstrapError> {
        let query = self.queries.get() + 1;
        self.queries.set(query);

        if query <= self.broken_until {
            return Err(BootstrapError::InventoryQuery(String::from(
                "Cannot connect to the Docker daemon",
            )));
        }

        Ok(self
            .appears_at
            .iter()
            .filter(|(_, at)| **at <= query)
            .map(|(name, _)| handle(name))
            .collect())
    }
}

pub fn handle(name: &str) -> ContainerHandle {
    ContainerHandle {
        id: format!("{name}-id"),
        name: name.to_string(),
        image: String::from("test/image:latest"),
        state: String::from("running"),
    }
}

/// Session that records statements and fails the ones it is told to.
pub struct RecordingSession {
    log: Rc<RefCell<Vec<String>>>,
    fail_all: bool,
}

impl SeedSession for RecordingSession {
    fn execute_statement(&mut self, statement: &str) -> Result<(), String> {
        self.log.borrow_mut().push(statement.to_string());
        if self.fail_all {
            Err(String::from("Table 'roles' already exists"))
        } else {
            Ok(())
        }
    }
}

/// Database that accepts connections after a number of refusals.
pub struct FakeProbe {
    /// `None` refuses forever.
    pub accept_after: Option<u32>,
    pub attempts: Cell<u32>,
    pub fail_statements: bool,
    pub executed: Rc<RefCell<Vec<String>>>,
}

impl FakeProbe {
    pub fn accepting() -> Self {
        Self::accepting_after(0)
    }

    pub fn accepting_after(refusals: u32) -> Self {
        Self {
            accept_after: Some(refusals),
            attempts: Cell::new(0),
            fail_statements: false,
            executed: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn refusing() -> Self {
        Self {
            accept_after: None,
            ..Self::accepting()
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }
}

impl DatabaseProbe for FakeProbe {
    type Session = RecordingSession;

    fn connect(&self, _config: &DatabaseConfig) -> Result<Self::Session, BootstrapError> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);

        match self.accept_after {
            Some(refusals) if attempt > refusals => Ok(RecordingSession {
                log: Rc::clone(&self.executed),
                fail_all: self.fail_statements,
            }),
            _ => Err(BootstrapError::Connectivity(String::from(
                "Can't connect to MySQL server on '127.0.0.1:3306' (111)",
            ))),
        }
    }
}

pub type TestBootstrapper =
    Bootstrapper<FakeOrchestrator, FakeInventory, FakeProbe, Rc<ManualClock>>;

pub fn create_test_config() -> BootstrapConfig {
    BootstrapConfig {
        project_dir: std::env::temp_dir(),
        seed_file: "badrage-test-seed-that-does-not-exist.sql".into(),
        ..BootstrapConfig::default()
    }
}

pub fn create_test_bootstrapper(
    config: BootstrapConfig,
    orchestrator: FakeOrchestrator,
    inventory: FakeInventory,
    probe: FakeProbe,
) -> (TestBootstrapper, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new());
    let bootstrapper = Bootstrapper::new(config, orchestrator, inventory, probe, Rc::clone(&clock));
    (bootstrapper, clock)
}
