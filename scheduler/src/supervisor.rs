//! Run supervisor
//!
//! Owns the catalog and the active run. Starting a run retires the previous
//! one, partitions the selected tests across worker slots and launches one
//! worker per slot. Worker events are applied one at a time by the
//! coordinator through [`Supervisor::handle_event`].

use shared::{
    process_debug, process_error, process_info, process_warn, ObserverUpdate, ProcessId,
    RunOptions, RunSummary,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::core::{
    effective_worker_count, round_robin, RunCompletion, RunState, TestCatalog, WorkerAssignment,
    WorkerEvent, WorkerEventKind,
};
use crate::error::SchedulerResult;
use crate::traits::{Observer, ResultsStore, WorkerLauncher};

pub struct Supervisor<S, L>
where
    S: ResultsStore,
    L: WorkerLauncher,
{
    pub(crate) store: S,
    launcher: L,
    pub(crate) catalog: TestCatalog,
    pub(crate) run: Option<RunState>,
    generation: u64,
    events_tx: mpsc::UnboundedSender<WorkerEvent>,
}

impl<S, L> Supervisor<S, L>
where
    S: ResultsStore,
    L: WorkerLauncher,
{
    /// Create a supervisor and the receiving end of its worker event channel
    pub fn new(store: S, launcher: L) -> (Self, mpsc::UnboundedReceiver<WorkerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let supervisor = Self {
            store,
            launcher,
            catalog: TestCatalog::default(),
            run: None,
            generation: 0,
            events_tx,
        };
        (supervisor, events_rx)
    }

    pub fn catalog(&self) -> &TestCatalog {
        &self.catalog
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Generation of the most recently started run
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    /// Start a run over the requested tests, preempting any active run
    ///
    /// The returned completion resolves once every launched worker has
    /// exited, or as cancelled if the run is stopped first.
    pub async fn start_run(
        &mut self,
        test_names: HashSet<String>,
        observer: Arc<dyn Observer>,
        options: RunOptions,
    ) -> SchedulerResult<RunCompletion> {
        if let Err(e) = self.stop().await {
            process_error!(ProcessId::current(), error = %e, "❌ Failed to persist stopped run");
        }

        let tests = self.store.load().await?;
        self.catalog.reconcile(tests);
        let pending = self.catalog.select_for_run(&test_names);

        self.generation += 1;
        let generation = self.generation;

        let snapshot = ObserverUpdate::Snapshot {
            tests: self.catalog.snapshot(),
            running: !pending.is_empty(),
        };
        if let Err(e) = observer.publish(snapshot) {
            process_warn!(ProcessId::current(), error = %e, "⚠️ Could not publish run snapshot");
        }

        if pending.is_empty() {
            process_info!(ProcessId::current(), "📭 Run {} has no known tests to execute", generation);
            return Ok(RunCompletion::ready(RunSummary {
                time: 0,
                count: 0,
                threads: 0,
            }));
        }

        let threads = effective_worker_count(options.worker_count, pending.len());
        let assignments = round_robin(&pending, threads);
        process_info!(
            ProcessId::current(),
            "🚀 Starting run {} with {} tests on {} workers",
            generation,
            pending.len(),
            threads
        );

        let (completion_tx, completion) = RunCompletion::channel();
        let mut run = RunState::new(generation, pending, threads, observer, completion_tx);
        let worker_options = RunOptions {
            worker_count: threads,
            ..options
        };

        for (slot, tests) in assignments.into_iter().enumerate() {
            let assignment = WorkerAssignment {
                generation,
                slot,
                tests,
                options: worker_options.clone(),
            };
            match self.launcher.launch(assignment, self.events_tx.clone()).await {
                Ok(handle) => run.add_worker(handle),
                Err(e) => {
                    process_error!(ProcessId::current(), error = %e, "❌ Worker slot {} did not start", slot);
                }
            }
        }

        if run.is_finished() {
            process_warn!(ProcessId::current(), "⚠️ No worker of run {} started", generation);
            run.complete();
        } else {
            self.run = Some(run);
        }
        Ok(completion)
    }

    /// Apply one worker event to the active run
    ///
    /// Events of any other generation are ignored. A persistence failure is
    /// returned after the snapshot has been published; the run continues.
    pub async fn handle_event(&mut self, event: WorkerEvent) -> SchedulerResult<()> {
        let Some(run) = self.run.as_mut() else {
            process_debug!(ProcessId::current(), "Ignoring event from idle scheduler: {:?}", event.kind);
            return Ok(());
        };
        if run.generation() != event.generation {
            process_debug!(
                ProcessId::current(),
                "Ignoring stale event from run {} (active {})",
                event.generation,
                run.generation()
            );
            return Ok(());
        }

        match event.kind {
            WorkerEventKind::TestCompleted(test) => {
                if !run.owns(event.slot, &test.name) {
                    process_warn!(
                        ProcessId::current(),
                        "⚠️ Worker {} reported test '{}' it was not assigned",
                        event.slot,
                        test.name
                    );
                    return Ok(());
                }
                let name = test.name.clone();
                let status = test.status;
                if !self.catalog.merge(test) {
                    return Ok(());
                }
                process_info!(ProcessId::current(), "🧪 {} {} (worker {})", name, status, event.slot);

                let saved = self.store.save(self.catalog.tests()).await;
                let snapshot = ObserverUpdate::Snapshot {
                    tests: self.catalog.snapshot(),
                    running: true,
                };
                if let Err(e) = run.publish(snapshot) {
                    process_warn!(ProcessId::current(), error = %e, "⚠️ Could not publish progress");
                }
                saved
            }
            WorkerEventKind::Exited { code } => {
                if run.worker_exited(event.slot) {
                    process_debug!(
                        ProcessId::current(),
                        "Worker {} exited with {:?}, {} still running",
                        event.slot,
                        code,
                        run.running()
                    );
                }
                if run.is_finished() {
                    if let Some(run) = self.run.take() {
                        let summary = run.complete();
                        process_info!(
                            ProcessId::current(),
                            "🏁 Run {} finished: {} tests on {} workers in {} ms",
                            event.generation,
                            summary.count,
                            summary.threads,
                            summary.time
                        );
                    }
                }
                Ok(())
            }
        }
    }

    /// Snapshot of every known test
    ///
    /// When idle the set of known tests is refreshed from the store.
    pub async fn list(&mut self) -> SchedulerResult<ObserverUpdate> {
        if self.run.is_none() {
            let tests = self.store.load().await?;
            self.catalog.reconcile(tests);
        }
        Ok(ObserverUpdate::Snapshot {
            tests: self.catalog.snapshot(),
            running: self.run.is_some(),
        })
    }
}
