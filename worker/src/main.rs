//! Worker binary entry point
//!
//! Invoked by the scheduler as
//! `worker <comma-joined test names> <replay speed> [--no-headless] --id <slot>`.

use clap::Parser;
use std::path::PathBuf;

use shared::logging::{self, LogTarget};
use shared::{decode_test_list, process_debug, ProcessId};
use worker::{ExecutionSettings, ScriptExecutor, StdoutReporter, Worker, WorkerResult};

#[derive(Parser, Debug)]
#[command(name = "worker")]
#[command(about = "Executes recorded tests and streams their results to stdout")]
struct Args {
    /// Comma separated test names, run in this order
    tests: String,

    /// Replay speed multiplier for waits
    #[arg(default_value_t = 1.0)]
    speed: f64,

    /// Run with a visible browser instead of headless
    #[arg(long)]
    no_headless: bool,

    /// Worker slot assigned by the scheduler
    #[arg(long, default_value_t = 0)]
    id: usize,

    /// Directory of recorded test scripts
    #[arg(long, env = "WORKER_SCRIPTS_DIR", default_value = "./tests")]
    scripts_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "WORKER_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> WorkerResult<()> {
    let _ = dotenv::dotenv();
    let args = Args::parse();

    ProcessId::init_worker(args.id);
    // stdout is the result channel
    logging::init_tracing_with_level(Some(&args.log_level), LogTarget::Stderr);

    let tests = decode_test_list(&args.tests);
    logging::log_startup(ProcessId::current(), &format!("worker with {} tests", tests.len()));
    process_debug!(
        ProcessId::current(),
        "Scripts from {}, speed {}, headless {}",
        args.scripts_dir.display(),
        args.speed,
        !args.no_headless
    );

    let settings = ExecutionSettings::new(args.scripts_dir)
        .with_headless(!args.no_headless)
        .with_replay_speed(args.speed);
    let worker = Worker::new(tests, ScriptExecutor::new(settings), StdoutReporter::stdout());

    let reported = worker.run().await?;

    logging::log_success(ProcessId::current(), &format!("Reported {reported} tests"));
    Ok(())
}
