//! Cancellation of the active run

use shared::{process_debug, process_info, ProcessId};

use crate::error::SchedulerResult;
use crate::supervisor::Supervisor;
use crate::traits::{ResultsStore, WorkerLauncher};

impl<S, L> Supervisor<S, L>
where
    S: ResultsStore,
    L: WorkerLauncher,
{
    /// Stop the active run, if any
    ///
    /// Every worker is sent a kill request and the run is discarded at once;
    /// its tests that are still pending become unsettled and the store is
    /// saved. Workers may still be exiting when this returns. Their late
    /// events carry the discarded generation and are ignored.
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(run) = self.run.take() else {
            process_debug!(ProcessId::current(), "Stop requested with no active run");
            return Ok(());
        };

        let generation = run.generation();
        let workers = run.workers().len();
        let pending = run.cancel();
        let unsettled = self.catalog.mark_unsettled(&pending);

        process_info!(
            ProcessId::current(),
            "🛑 Stopped run {}: {} workers killed, {} tests unsettled",
            generation,
            workers,
            unsettled
        );

        self.store.save(self.catalog.tests()).await
    }
}
