use {super::*, controller::Controller, scanner::Scanner};

mod controller;
mod metrics;
mod scanner;

pub use metrics::{JsonFileSink, Metrics, MetricsSink, Snapshot, StopReason};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// A share the scanner proved against the current target, ready for
/// mining.submit.
#[derive(Debug, Clone, Serialize)]
pub struct ShareCandidate {
    pub job_id: String,
    pub extranonce2: Extranonce,
    pub ntime: Ntime,
    pub nonce: Nonce,
}

/// Runs the miner until a stop condition fires: connects, handshakes,
/// mines, and reconnects with exponential backoff on transient failures.
/// The metrics snapshot is written to the configured path no matter how
/// the run ends.
pub async fn run(config: MinerConfig, cancel: CancellationToken) -> Result<Snapshot> {
    let metrics = Arc::new(Metrics::new(Backend::default()));
    let deadline = config.duration.map(|duration| Instant::now() + duration);

    let mut backoff = INITIAL_BACKOFF;

    let result = loop {
        if cancel.is_cancelled() {
            metrics.stop(StopReason::Cancelled);
            break Ok(());
        }

        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            metrics.stop(StopReason::Duration);
            break Ok(());
        }

        match Controller::run(&config, metrics.clone(), cancel.clone(), deadline).await {
            Ok(()) => {
                if cancel.is_cancelled() {
                    metrics.stop(StopReason::Cancelled);
                }
                break Ok(());
            }
            Err(err) if err.is_transient() => {
                warn!(
                    "{}: connection failed: {err}; reconnecting in {backoff:?}",
                    config.endpoint
                );

                tokio::select! {
                    _ = cancel.cancelled() => {
                        metrics.stop(StopReason::Cancelled);
                        break Ok(());
                    }
                    _ = sleep(backoff) => {}
                }

                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
            Err(err) => {
                metrics.stop(StopReason::Fatal);
                break Err(err);
            }
        }
    };

    let snapshot = metrics.snapshot(&config);

    if let Some(path) = &config.out_path
        && let Err(err) = JsonFileSink::new(path).record(&snapshot)
    {
        error!("Failed to write metrics to {}: {err}", path.display());
    }

    match result {
        Ok(()) => Ok(snapshot),
        Err(err) => Err(anyhow!("{}: {err}", config.endpoint)),
    }
}
