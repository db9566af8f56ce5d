//! Coordinator loop
//!
//! The single task that owns the supervisor. Observer requests, worker
//! events and the shutdown signal are multiplexed in one `select!` loop and
//! every handler runs to completion before the next message is taken.

use shared::{
    logging, process_debug, process_error, process_warn, ObserverRequest, ProcessId, RunOptions,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use webserver::ClientEnvelope;

use crate::core::{RunCompletion, RunOutcome, WorkerEvent};
use crate::error::SchedulerResult;
use crate::services::ChannelObserver;
use crate::supervisor::Supervisor;
use crate::traits::{Observer, ResultsStore, WorkerLauncher};

pub struct Coordinator<S, L>
where
    S: ResultsStore + 'static,
    L: WorkerLauncher + 'static,
{
    supervisor: Supervisor<S, L>,
    events_rx: mpsc::UnboundedReceiver<WorkerEvent>,
    requests_rx: mpsc::Receiver<ClientEnvelope>,

    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl<S, L> Coordinator<S, L>
where
    S: ResultsStore + 'static,
    L: WorkerLauncher + 'static,
{
    pub fn new(store: S, launcher: L, requests_rx: mpsc::Receiver<ClientEnvelope>) -> Self {
        let (supervisor, events_rx) = Supervisor::new(store, launcher);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            supervisor,
            events_rx,
            requests_rx,
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn supervisor(&self) -> &Supervisor<S, L> {
        &self.supervisor
    }

    /// Get shutdown sender for external shutdown requests
    pub fn get_shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Process requests and worker events until shutdown
    pub async fn run(&mut self) -> SchedulerResult<()> {
        loop {
            tokio::select! {
                Some(envelope) = self.requests_rx.recv() => {
                    let client_id = envelope.client_id.clone();
                    let observer: Arc<dyn Observer> =
                        Arc::new(ChannelObserver::new(envelope.client_id, envelope.updates));
                    if let Err(e) = self.handle_request(envelope.request, observer).await {
                        process_error!(ProcessId::current(), "❌ Error handling request from {}: {}", client_id, e);
                    }
                },

                Some(event) = self.events_rx.recv() => {
                    if let Err(e) = self.supervisor.handle_event(event).await {
                        process_error!(ProcessId::current(), "❌ Error applying worker event: {}", e);
                    }
                },

                Some(_) = self.shutdown_rx.recv() => {
                    self.shutdown().await?;
                    break;
                },

                else => break,
            }
        }

        Ok(())
    }

    /// Execute one observer request on behalf of `observer`
    pub async fn handle_request(
        &mut self,
        request: ObserverRequest,
        observer: Arc<dyn Observer>,
    ) -> SchedulerResult<()> {
        match request {
            ObserverRequest::Run {
                test_names,
                no_headless,
                threads_count,
                replay_speed,
            } => {
                let options = RunOptions {
                    no_headless,
                    worker_count: threads_count,
                    replay_speed,
                };
                self.start(test_names.into_iter().collect(), observer, options)
                    .await
            }
            ObserverRequest::RunSingle {
                test_name,
                replay_speed,
            } => {
                let options = RunOptions {
                    no_headless: true,
                    worker_count: 1,
                    replay_speed: replay_speed.unwrap_or(1.0),
                };
                self.start(HashSet::from([test_name]), observer, options)
                    .await
            }
            ObserverRequest::Stop => self.supervisor.stop().await,
            ObserverRequest::List => {
                let snapshot = self.supervisor.list().await?;
                observer.publish(snapshot)
            }
        }
    }

    async fn start(
        &mut self,
        test_names: HashSet<String>,
        observer: Arc<dyn Observer>,
        options: RunOptions,
    ) -> SchedulerResult<()> {
        let completion = self
            .supervisor
            .start_run(test_names, observer.clone(), options)
            .await?;
        publish_summary_when_done(completion, observer);
        Ok(())
    }

    async fn shutdown(&mut self) -> SchedulerResult<()> {
        logging::log_shutdown(ProcessId::current(), "shutdown requested");
        self.supervisor.stop().await
    }
}

/// Wait for a run off the coordinator task and publish its summary
///
/// A cancelled run publishes nothing.
pub fn publish_summary_when_done(
    completion: RunCompletion,
    observer: Arc<dyn Observer>,
) -> JoinHandle<RunOutcome> {
    tokio::spawn(async move {
        let outcome = completion.await;
        match &outcome {
            RunOutcome::Completed(summary) => {
                if let Err(e) = observer.publish(summary.clone().into()) {
                    process_warn!(ProcessId::current(), "⚠️ Could not publish run summary: {}", e);
                }
            }
            RunOutcome::Cancelled => {
                process_debug!(ProcessId::current(), "Run was cancelled, no summary published");
            }
        }
        outcome
    })
}
