//! Main entry point for the scheduler binary
//!
//! Wires the real results store, worker launcher and web observer channel
//! into the coordinator loop.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tokio::sync::mpsc;

use scheduler::{
    services::{default_worker_bin, RealResultsStore, RealWorkerLauncher},
    Coordinator, SchedulerResult,
};
use shared::logging::{self, LogTarget};
use shared::{process_debug, process_error, ProcessId};
use webserver::WebServer;

/// Distributes test runs over worker processes and reports progress to browsers
#[derive(Parser, Debug)]
#[command(name = "scheduler")]
#[command(about = "Runs recorded tests across worker processes with live progress")]
pub struct Args {
    /// Address the observer web server binds to
    #[arg(long, env = "SCHEDULER_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Directory holding results.json
    #[arg(long, env = "SCHEDULER_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Directory of recorded test scripts (<name>.json)
    #[arg(long, env = "SCHEDULER_SCRIPTS_DIR", default_value = "./tests")]
    pub scripts_dir: PathBuf,

    /// Directory of the browser client served at /
    #[arg(long, env = "SCHEDULER_STATIC_DIR", default_value = "./static")]
    pub static_dir: PathBuf,

    /// Worker binary (defaults to `worker` next to this executable)
    #[arg(long, env = "SCHEDULER_WORKER_BIN")]
    pub worker_bin: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SCHEDULER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> SchedulerResult<()> {
    // Values from .env only fill variables that are not already set
    let _ = dotenv::dotenv();
    let args = Args::parse();

    ProcessId::init_scheduler();
    logging::init_tracing_with_level(Some(&args.log_level), LogTarget::Stdout);
    logging::log_startup(ProcessId::current(), "test scheduler");

    let worker_bin = match args.worker_bin {
        Some(path) => path,
        None => default_worker_bin()?,
    };
    process_debug!(ProcessId::current(), "Worker binary: {}", worker_bin.display());

    let store = RealResultsStore::new(&args.data_dir, &args.scripts_dir);
    let launcher = RealWorkerLauncher::new(worker_bin)
        .with_scripts_dir(&args.scripts_dir)
        .with_log_level(args.log_level.clone());

    let (requests_tx, requests_rx) = mpsc::channel(100);
    let mut coordinator = Coordinator::new(store, launcher, requests_rx);

    let listener = WebServer::bind(args.bind).await?;
    logging::log_success(ProcessId::current(), &format!("Observer channel on http://{}", args.bind));
    let server = WebServer::new(requests_tx, &args.static_dir);
    let server_shutdown = coordinator.get_shutdown_sender();
    tokio::spawn(async move {
        if let Err(e) = server.serve(listener).await {
            process_error!(ProcessId::current(), "❌ Web server stopped: {}", e);
            let _ = server_shutdown.send(()).await;
        }
    });

    // Set up graceful shutdown
    let shutdown_sender = coordinator.get_shutdown_sender();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_sender.send(()).await;
            }
            Err(err) => {
                logging::log_error(ProcessId::current(), "Signal handling", &err);
            }
        }
    });

    coordinator.run().await?;

    logging::log_success(ProcessId::current(), "Scheduler stopped gracefully");
    Ok(())
}
