//! Binary entry point: CLI parsing, pool construction, HTTP serving.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use wikitext_server::config::PoolConfig;
use wikitext_server::core::JobPool;
use wikitext_server::parser::WikitextParser;
use wikitext_server::server::{self, AppState};
use wikitext_server::util::telemetry;

/// Wikitext parsing server. Multiple instances can listen on different
/// ports behind a load balancer for further scale-out.
#[derive(Debug, Parser)]
#[command(name = "wikitext-server", version, about)]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "WIKITEXT_PORT", default_value_t = 3000)]
    port: u16,

    /// Host to bind.
    #[arg(long, env = "WIKITEXT_HOST", default_value = "localhost")]
    host: String,

    /// Per-job timeout in seconds.
    #[arg(long, env = "WIKITEXT_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Maximum number of workers in the pool; 0 means one per CPU.
    #[arg(long, env = "WIKITEXT_MAXWORKERS", default_value_t = 1)]
    maxworkers: usize,

    /// Bound on the job queue; unbounded when omitted.
    #[arg(long, env = "WIKITEXT_QUEUE_DEPTH")]
    queue_depth: Option<usize>,

    /// Seconds to wait per worker for in-flight jobs at shutdown.
    #[arg(long, env = "WIKITEXT_SHUTDOWN_GRACE", default_value_t = 2)]
    shutdown_grace: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let args = Args::parse();

    let max_workers = if args.maxworkers == 0 {
        num_cpus::get()
    } else {
        args.maxworkers
    };

    let mut config = PoolConfig::new()
        .with_max_workers(max_workers)
        .with_job_timeout(Duration::from_secs(args.timeout))
        .with_shutdown_grace(Duration::from_secs(args.shutdown_grace));
    if let Some(depth) = args.queue_depth {
        config = config.with_queue_depth(depth);
    }

    info!(max_workers, "starting worker pool");
    let pool = JobPool::new(config, WikitextParser::new())?;

    let state = Arc::new(AppState { pool });
    let app = server::build_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", args.host, args.port))?;
    info!(
        host = %args.host,
        port = args.port,
        timeout_secs = args.timeout,
        "server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    state.pool.shutdown();
    Ok(())
}

/// Resolves on ctrl-c, letting axum drain connections before the pool is
/// torn down.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
