//! Executes recorded test scripts step by step

use async_trait::async_trait;
use chrono::Utc;
use shared::{process_debug, StepRecord, TestDescriptor, TestStatus};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::script::{script_path, ScriptStep, TestScript};
use crate::traits::TestExecutor;
use crate::types::ExecutionSettings;

/// Longest command output kept in a failed step's message
const OUTPUT_TAIL_CHARS: usize = 400;

pub struct ScriptExecutor {
    settings: ExecutionSettings,
}

impl ScriptExecutor {
    pub fn new(settings: ExecutionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    async fn run_step(&self, index: usize, step: &ScriptStep) -> StepRecord {
        let started = Instant::now();
        let (passed, message) = match step {
            ScriptStep::Run { command } => self.run_command(command).await,
            ScriptStep::Wait { ms } => {
                let scaled = *ms as f64 / self.settings.effective_speed();
                tokio::time::sleep(Duration::from_secs_f64(scaled / 1000.0)).await;
                (true, None)
            }
        };

        StepRecord {
            step: index,
            action: step.describe(),
            passed,
            message,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    async fn run_command(&self, command: &str) -> (bool, Option<String>) {
        let mut cmd = shell(command);
        cmd.env("HEADLESS", if self.settings.headless { "1" } else { "0" })
            .env("REPLAY_SPEED", self.settings.effective_speed().to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match cmd.output().await {
            Ok(output) if output.status.success() => (true, None),
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                let tail = tail(text.trim(), OUTPUT_TAIL_CHARS);
                let message = if tail.is_empty() {
                    output.status.to_string()
                } else {
                    format!("{}: {}", output.status, tail)
                };
                (false, Some(message))
            }
            Err(e) => (false, Some(format!("failed to start command: {e}"))),
        }
    }

    fn failed_before_start(name: &str, message: String) -> TestDescriptor {
        TestDescriptor {
            name: name.to_string(),
            status: TestStatus::Failed,
            results: vec![StepRecord {
                step: 0,
                action: "load script".to_string(),
                passed: false,
                message: Some(message),
                duration_ms: 0,
            }],
            finished_at: Some(Utc::now()),
        }
    }
}

#[async_trait]
impl TestExecutor for ScriptExecutor {
    async fn execute(&self, name: &str) -> TestDescriptor {
        let path = script_path(&self.settings.scripts_dir, name);
        let script = match TestScript::load(&path).await {
            Ok(script) => script,
            Err(e) => return Self::failed_before_start(name, e.to_string()),
        };

        let mut results = Vec::with_capacity(script.steps.len());
        let mut status = TestStatus::Passed;
        for (index, step) in script.steps.iter().enumerate() {
            let record = self.run_step(index, step).await;
            process_debug!(
                shared::ProcessId::current(),
                "{} step {} {} ({} ms)",
                name,
                index,
                if record.passed { "ok" } else { "failed" },
                record.duration_ms
            );
            let passed = record.passed;
            results.push(record);
            if !passed {
                status = TestStatus::Failed;
                break;
            }
        }

        TestDescriptor {
            name: name.to_string(),
            status,
            results,
            finished_at: Some(Utc::now()),
        }
    }
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Last `max` characters of `text`
fn tail(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    let start = text
        .char_indices()
        .nth(count - max)
        .map(|(index, _)| index)
        .unwrap_or(0);
    &text[start..]
}
