//! SignVote server binary.

use std::sync::Arc;

use anyhow::Context;
use signvote_engine::{
    load_classifier, CommandSink, FeedbackSink, FeedbackWorker, GesturePipeline, LogSink,
};
use signvote_models::GesturePayload;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use signvote_server::{
    create_router, metrics, open_output, open_source, AppState, FrameRunner, ServerConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing()?;

    info!("Starting signvote");

    let config = ServerConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        source = %config.landmark_source,
        output = %config.record_output,
        "Server config"
    );

    // A malformed archive is fatal; a missing one degrades to geometry only.
    let learned = load_classifier(&config.model_path, config.engine.max_neighbors)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;

    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics().context("installing Prometheus recorder")?)
    } else {
        None
    };

    let sink = feedback_sink(config.feedback_command.as_deref());
    let feedback = FeedbackWorker::spawn(
        sink,
        config.feedback_queue_size,
        config.engine.message_cooldown,
    );

    let source = open_source(&config.landmark_source)
        .await
        .context("opening landmark source")?;
    let output = open_output(&config.record_output).context("opening record output")?;

    let (latest_tx, latest_rx) = watch::channel(GesturePayload::default());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let runner = FrameRunner::new(
        source,
        GesturePipeline::new(&config.engine, learned),
        output,
        latest_tx,
        feedback,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    info!("Listening on {}", config.bind_addr());

    let app = create_router(AppState::new(config, latest_rx), metrics_handle);

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                signal_tx.send_replace(true);
            }
            Err(e) => warn!(error = %e, "Failed to install CTRL+C handler"),
        }
    });

    let server_shutdown = wait_for_shutdown(shutdown_rx.clone());
    let server = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(server_shutdown)
            .await
    };
    let frames = async {
        let summary = runner.run(shutdown_rx).await;
        // The loop ending for any reason takes the HTTP server down with it.
        shutdown_tx.send_replace(true);
        summary
    };

    let (served, summary) = tokio::join!(server, frames);
    served.context("HTTP server failed")?;

    info!(
        frames = summary.frames,
        events = summary.events,
        records = summary.records,
        feedback_delivered = summary.feedback_delivered,
        reason = ?summary.reason,
        "Shutdown complete"
    );
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("signvote=info".parse()?);

    // Logs go to stderr; stdout may carry the record stream.
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

fn feedback_sink(command: Option<&str>) -> Arc<dyn FeedbackSink> {
    let Some(command) = command else {
        return Arc::new(LogSink);
    };
    match CommandSink::new(command) {
        Ok(sink) => {
            info!(program = %sink.program().display(), "Speech feedback enabled");
            Arc::new(sink)
        }
        Err(e) => {
            warn!(error = %e, "Speech program unavailable, logging feedback instead");
            Arc::new(LogSink)
        }
    }
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    // Sender dropped counts as shutdown too.
    let _ = shutdown.wait_for(|stop| *stop).await;
}
