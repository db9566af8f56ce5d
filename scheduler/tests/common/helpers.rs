//! Test helpers and builder patterns for scheduler tests
//!
//! The fakes keep their state behind `Arc<Mutex<..>>` so a test can hold a
//! clone and inspect what the supervisor did with it.

use async_trait::async_trait;
use scheduler::core::{RunCompletion, WorkerAssignment, WorkerEvent, WorkerEventKind, WorkerHandle};
use scheduler::{Observer, ResultsStore, SchedulerError, SchedulerResult, Supervisor, WorkerLauncher};
use shared::{ObserverUpdate, RunOptions, TestDescriptor, TestStatus, WorkerMessage};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

use super::fixtures::TestFixtures;

/// Results store kept in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    tests: Vec<TestDescriptor>,
    saves: usize,
}

impl MemoryStore {
    pub fn with_tests(names: &[&str]) -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().tests = TestFixtures::idle_tests(names);
        store
    }

    pub fn tests(&self) -> Vec<TestDescriptor> {
        self.inner.lock().unwrap().tests.clone()
    }

    pub fn status(&self, name: &str) -> Option<TestStatus> {
        self.tests().into_iter().find(|test| test.name == name).map(|test| test.status)
    }

    pub fn saves(&self) -> usize {
        self.inner.lock().unwrap().saves
    }
}

#[async_trait]
impl ResultsStore for MemoryStore {
    async fn load(&self) -> SchedulerResult<Vec<TestDescriptor>> {
        Ok(self.tests())
    }

    async fn save(&self, tests: &[TestDescriptor]) -> SchedulerResult<()> {
        let mut state = self.inner.lock().unwrap();
        state.tests = tests.to_vec();
        state.saves += 1;
        Ok(())
    }
}

/// One worker the fake launcher pretended to start
pub struct Launched {
    pub assignment: WorkerAssignment,
    pub kill_rx: oneshot::Receiver<()>,
}

/// Launcher that records assignments instead of spawning processes
///
/// With `auto_complete` every launched worker immediately reports each of
/// its tests as passed and exits, like a real worker would.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    launched: Arc<Mutex<Vec<Launched>>>,
    failing_slots: Arc<Mutex<HashSet<usize>>>,
    auto_complete: bool,
}

impl FakeLauncher {
    pub fn auto_completing() -> Self {
        Self {
            auto_complete: true,
            ..Self::default()
        }
    }

    pub fn fail_slots(&self, slots: &[usize]) {
        self.failing_slots.lock().unwrap().extend(slots.iter().copied());
    }

    /// Assignments of every launch so far, across runs
    pub fn assignments(&self) -> Vec<WorkerAssignment> {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .map(|launched| launched.assignment.clone())
            .collect()
    }

    /// Assigned test lists of the workers of run `generation`, by slot
    pub fn partition(&self, generation: u64) -> Vec<Vec<String>> {
        self.assignments()
            .into_iter()
            .filter(|assignment| assignment.generation == generation)
            .map(|assignment| assignment.tests)
            .collect()
    }

    /// Whether the worker of `generation`/`slot` was asked to terminate
    pub fn was_killed(&self, generation: u64, slot: usize) -> bool {
        let mut launched = self.launched.lock().unwrap();
        launched
            .iter_mut()
            .find(|l| l.assignment.generation == generation && l.assignment.slot == slot)
            .map(|l| l.kill_rx.try_recv().is_ok())
            .unwrap_or(false)
    }
}

#[async_trait]
impl WorkerLauncher for FakeLauncher {
    async fn launch(
        &self,
        assignment: WorkerAssignment,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) -> SchedulerResult<WorkerHandle> {
        if self.failing_slots.lock().unwrap().contains(&assignment.slot) {
            return Err(SchedulerError::WorkerSpawnFailed {
                slot: assignment.slot,
                message: "No such file or directory".to_string(),
            });
        }

        if self.auto_complete {
            let generation = assignment.generation;
            let slot = assignment.slot;
            let tests = assignment.tests.clone();
            tokio::spawn(async move {
                for name in tests {
                    // Go through the wire format like a real worker
                    let line = WorkerMessage::TestCompleted {
                        test: TestFixtures::passed(&name),
                    }
                    .to_line()
                    .unwrap();
                    let WorkerMessage::TestCompleted { test } = WorkerMessage::from_line(&line).unwrap();
                    let _ = events.send(WorkerEvent {
                        generation,
                        slot,
                        kind: WorkerEventKind::TestCompleted(test),
                    });
                }
                let _ = events.send(WorkerEvent {
                    generation,
                    slot,
                    kind: WorkerEventKind::Exited { code: Some(0) },
                });
            });
        }

        let (kill_tx, kill_rx) = oneshot::channel();
        let handle = WorkerHandle::new(assignment.slot, assignment.tests.clone(), kill_tx);
        self.launched.lock().unwrap().push(Launched { assignment, kill_rx });
        Ok(handle)
    }
}

/// Observer that keeps every update it receives
#[derive(Default)]
pub struct RecordingObserver {
    updates: Mutex<Vec<ObserverUpdate>>,
}

impl RecordingObserver {
    pub fn updates(&self) -> Vec<ObserverUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Latest snapshot as (tests, running)
    pub fn last_snapshot(&self) -> Option<(Vec<TestDescriptor>, bool)> {
        self.updates().into_iter().rev().find_map(|update| match update {
            ObserverUpdate::Snapshot { tests, running } => Some((tests, running)),
            _ => None,
        })
    }

    pub fn summaries(&self) -> Vec<ObserverUpdate> {
        self.updates()
            .into_iter()
            .filter(|update| matches!(update, ObserverUpdate::Summary { .. }))
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn publish(&self, update: ObserverUpdate) -> SchedulerResult<()> {
        self.updates.lock().unwrap().push(update);
        Ok(())
    }
}

/// Builder pattern for creating a supervisor with in-memory collaborators
pub struct SupervisorBuilder {
    store: MemoryStore,
    launcher: FakeLauncher,
}

impl SupervisorBuilder {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::with_tests(&TestFixtures::FIVE_TESTS),
            launcher: FakeLauncher::default(),
        }
    }

    /// Replace the known tests
    pub fn with_tests(mut self, names: &[&str]) -> Self {
        self.store = MemoryStore::with_tests(names);
        self
    }

    /// Make the launcher fail for these slots
    pub fn with_failing_slots(self, slots: &[usize]) -> Self {
        self.launcher.fail_slots(slots);
        self
    }

    pub fn build(self) -> Harness {
        let (supervisor, events_rx) = Supervisor::new(self.store.clone(), self.launcher.clone());
        Harness {
            supervisor,
            events_rx,
            store: self.store,
            launcher: self.launcher,
            observer: Arc::new(RecordingObserver::default()),
        }
    }
}

impl Default for SupervisorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A supervisor plus handles on all of its fakes
pub struct Harness {
    pub supervisor: Supervisor<MemoryStore, FakeLauncher>,
    pub events_rx: mpsc::UnboundedReceiver<WorkerEvent>,
    pub store: MemoryStore,
    pub launcher: FakeLauncher,
    pub observer: Arc<RecordingObserver>,
}

impl Harness {
    pub async fn start(&mut self, names: &[&str], workers: usize) -> RunCompletion {
        let options = RunOptions {
            worker_count: workers,
            ..RunOptions::default()
        };
        self.supervisor
            .start_run(TestFixtures::names(names), self.observer.clone(), options)
            .await
            .unwrap()
    }

    /// Deliver a completion for the current run
    pub async fn report(&mut self, slot: usize, test: TestDescriptor) {
        let generation = self.supervisor.generation();
        self.report_for(generation, slot, test).await;
    }

    pub async fn report_for(&mut self, generation: u64, slot: usize, test: TestDescriptor) {
        self.supervisor
            .handle_event(WorkerEvent {
                generation,
                slot,
                kind: WorkerEventKind::TestCompleted(test),
            })
            .await
            .unwrap();
    }

    /// Deliver an exit for the current run
    pub async fn exit(&mut self, slot: usize) {
        let generation = self.supervisor.generation();
        self.exit_for(generation, slot).await;
    }

    pub async fn exit_for(&mut self, generation: u64, slot: usize) {
        self.supervisor
            .handle_event(WorkerEvent {
                generation,
                slot,
                kind: WorkerEventKind::Exited { code: Some(0) },
            })
            .await
            .unwrap();
    }

    pub fn status(&self, name: &str) -> TestStatus {
        self.supervisor
            .catalog()
            .get(name)
            .map(|test| test.status)
            .unwrap_or_else(|| panic!("unknown test {name}"))
    }
}
