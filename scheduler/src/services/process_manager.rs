//! Real worker process launcher
//!
//! Spawns one `worker` process per slot, reads its JSON line stream from
//! stdout and turns it into [`WorkerEvent`]s. Each process is watched by its
//! own task until it exits.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};

use crate::core::{WorkerAssignment, WorkerEvent, WorkerEventKind, WorkerHandle};
use crate::error::{SchedulerError, SchedulerResult};
use crate::traits::WorkerLauncher;
use shared::{encode_test_list, process_debug, process_warn, WorkerMessage};

/// Launches worker processes from a binary on disk
#[derive(Debug, Clone)]
pub struct RealWorkerLauncher {
    worker_bin: PathBuf,
    scripts_dir: PathBuf,
    log_level: String,
}

impl RealWorkerLauncher {
    pub fn new(worker_bin: impl Into<PathBuf>) -> Self {
        Self {
            worker_bin: worker_bin.into(),
            scripts_dir: PathBuf::from("tests"),
            log_level: "info".to_string(),
        }
    }

    /// Configure the directory workers read test scripts from (fluent API)
    pub fn with_scripts_dir(mut self, scripts_dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = scripts_dir.into();
        self
    }

    /// Configure log level passed to workers (fluent API)
    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }

    pub fn worker_bin(&self) -> &Path {
        &self.worker_bin
    }

    /// Build the command line for one worker
    pub fn build_command(&self, assignment: &WorkerAssignment) -> SchedulerResult<Command> {
        let tests = encode_test_list(&assignment.tests)?;

        let mut cmd = Command::new(&self.worker_bin);
        cmd.arg(tests)
            .arg(assignment.options.replay_speed.to_string())
            .arg("--id")
            .arg(assignment.slot.to_string())
            .arg("--scripts-dir")
            .arg(&self.scripts_dir)
            .arg("--log-level")
            .arg(&self.log_level);
        if assignment.options.no_headless {
            cmd.arg("--no-headless");
        }

        // stdout carries results; worker logs go straight to our stderr
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Own process group so a kill also reaches the commands it started
        #[cfg(unix)]
        cmd.process_group(0);

        Ok(cmd)
    }
}

/// Default worker binary: `worker` next to the running executable
pub fn default_worker_bin() -> SchedulerResult<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| SchedulerError::config(format!("no parent directory for {}", exe.display())))?;
    Ok(dir.join(format!("worker{}", std::env::consts::EXE_SUFFIX)))
}

#[async_trait]
impl WorkerLauncher for RealWorkerLauncher {
    async fn launch(
        &self,
        assignment: WorkerAssignment,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) -> SchedulerResult<WorkerHandle> {
        let mut cmd = self.build_command(&assignment)?;
        let child = cmd.spawn().map_err(|e| SchedulerError::WorkerSpawnFailed {
            slot: assignment.slot,
            message: format!("{}: {e}", self.worker_bin.display()),
        })?;

        process_debug!(
            shared::ProcessId::current(),
            "🏭 Spawned worker_{} (PID: {}) with {} tests",
            assignment.slot,
            child.id().unwrap_or(0),
            assignment.tests.len()
        );

        let (kill_tx, kill_rx) = oneshot::channel();
        tokio::spawn(supervise_worker(
            child,
            assignment.generation,
            assignment.slot,
            events,
            kill_rx,
        ));

        Ok(WorkerHandle::new(assignment.slot, assignment.tests, kill_tx))
    }
}

/// Forward a worker's output until it exits, then report the exit
async fn supervise_worker(
    mut child: Child,
    generation: u64,
    slot: usize,
    events: mpsc::UnboundedSender<WorkerEvent>,
    mut kill_rx: oneshot::Receiver<()>,
) {
    let mut kill_seen = false;

    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            let kill_now = tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        forward_line(&line, generation, slot, &events);
                        false
                    }
                    Ok(None) => break,
                    Err(e) => {
                        process_warn!(shared::ProcessId::current(), "⚠️ Lost output of worker_{}: {}", slot, e);
                        break;
                    }
                },
                result = &mut kill_rx, if !kill_seen => {
                    kill_seen = true;
                    result.is_ok()
                }
            };
            if kill_now {
                terminate(&mut child, slot);
            }
        }
    }

    let code = loop {
        let kill_now = tokio::select! {
            status = child.wait() => break status.ok().and_then(|status| status.code()),
            result = &mut kill_rx, if !kill_seen => {
                kill_seen = true;
                result.is_ok()
            }
        };
        if kill_now {
            terminate(&mut child, slot);
        }
    };

    process_debug!(shared::ProcessId::current(), "Worker_{} exited with {:?}", slot, code);
    let _ = events.send(WorkerEvent {
        generation,
        slot,
        kind: WorkerEventKind::Exited { code },
    });
}

fn forward_line(line: &str, generation: u64, slot: usize, events: &mpsc::UnboundedSender<WorkerEvent>) {
    if line.trim().is_empty() {
        return;
    }
    match WorkerMessage::from_line(line) {
        Ok(WorkerMessage::TestCompleted { test }) => {
            let _ = events.send(WorkerEvent {
                generation,
                slot,
                kind: WorkerEventKind::TestCompleted(test),
            });
        }
        Err(_) => {
            process_debug!(shared::ProcessId::current(), "worker_{}: {}", slot, line);
        }
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child, slot: usize) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = child.id() {
        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => return,
            Err(e) => {
                process_warn!(shared::ProcessId::current(), "⚠️ killpg failed for worker_{}: {}", slot, e);
            }
        }
    }
    if let Err(e) = child.start_kill() {
        process_debug!(shared::ProcessId::current(), "Worker_{} already gone: {}", slot, e);
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child, slot: usize) {
    if let Err(e) = child.start_kill() {
        process_debug!(shared::ProcessId::current(), "Worker_{} already gone: {}", slot, e);
    }
}
