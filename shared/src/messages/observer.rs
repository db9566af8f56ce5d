//! Observer ↔ Scheduler messages
//!
//! Observers (browser clients on the websocket) send requests; the scheduler
//! answers asynchronously with snapshots and a terminal summary.

use serde::{Deserialize, Serialize};

use crate::types::{RunSummary, TestDescriptor};

fn default_threads() -> usize {
    1
}

fn default_replay_speed() -> f64 {
    1.0
}

/// Requests an observer may send to the scheduler
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObserverRequest {
    /// Run a subset of the known tests
    #[serde(rename_all = "camelCase")]
    Run {
        test_names: Vec<String>,
        #[serde(default)]
        no_headless: bool,
        #[serde(default = "default_threads")]
        threads_count: usize,
        #[serde(default = "default_replay_speed")]
        replay_speed: f64,
    },
    /// Run one test on one visible worker (recorder playback)
    #[serde(rename_all = "camelCase")]
    RunSingle {
        test_name: String,
        #[serde(default)]
        replay_speed: Option<f64>,
    },
    /// Cancel the active run, if any
    Stop,
    /// Ask for a snapshot of every known test
    List,
}

/// Updates the scheduler pushes to an observer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObserverUpdate {
    /// Full list of known tests with their current status
    Snapshot {
        tests: Vec<TestDescriptor>,
        running: bool,
    },
    /// Final summary once every worker of a run has exited
    Summary {
        time: u64,
        count: usize,
        threads: usize,
    },
    /// The request frame could not be understood
    Error { message: String },
}

impl From<RunSummary> for ObserverUpdate {
    fn from(summary: RunSummary) -> Self {
        ObserverUpdate::Summary {
            time: summary.time,
            count: summary.count,
            threads: summary.threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_request_from_browser_json() {
        let json = r#"{"type":"run","testNames":["a","b"],"noHeadless":true,"threadsCount":3,"replaySpeed":2.5}"#;
        let request: ObserverRequest = serde_json::from_str(json).unwrap();

        assert_eq!(
            request,
            ObserverRequest::Run {
                test_names: vec!["a".to_string(), "b".to_string()],
                no_headless: true,
                threads_count: 3,
                replay_speed: 2.5,
            }
        );
    }

    #[test]
    fn test_run_request_defaults() {
        let request: ObserverRequest = serde_json::from_str(r#"{"type":"run","testNames":[]}"#).unwrap();
        match request {
            ObserverRequest::Run { no_headless, threads_count, replay_speed, .. } => {
                assert!(!no_headless);
                assert_eq!(threads_count, 1);
                assert_eq!(replay_speed, 1.0);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_single_and_stop_requests() {
        let single: ObserverRequest = serde_json::from_str(r#"{"type":"runSingle","testName":"login"}"#).unwrap();
        assert_eq!(
            single,
            ObserverRequest::RunSingle { test_name: "login".to_string(), replay_speed: None }
        );

        let stop: ObserverRequest = serde_json::from_str(r#"{"type":"stop"}"#).unwrap();
        assert_eq!(stop, ObserverRequest::Stop);
    }

    #[test]
    fn test_summary_update_shape() {
        let update = ObserverUpdate::from(RunSummary { time: 1200, count: 5, threads: 2 });
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["type"], "summary");
        assert_eq!(value["time"], 1200);
        assert_eq!(value["count"], 5);
        assert_eq!(value["threads"], 2);
    }
}
