use super::*;

const IDLE_WAIT: Duration = Duration::from_millis(100);
const STALE_WAIT: Duration = Duration::from_millis(50);
const LOG_EVERY: Duration = Duration::from_secs(5);

/// The scan half of a connection: snapshots the published job and
/// difficulty once per batch, assembles a header for the next extranonce2
/// and runs one bounded scan off the async threads. Yielding between
/// batches bounds how late a clean_jobs replacement can be observed to
/// one batch window.
pub(crate) struct Scanner {
    backend: Backend,
    batch_nonces: u32,
    cancel: CancellationToken,
    deadline: Option<Instant>,
    difficulty: Arc<Mutex<Option<Difficulty>>>,
    extranonce1: Extranonce,
    extranonce2: Extranonce,
    job_rx: watch::Receiver<Option<Job>>,
    max_shares: Option<u64>,
    metrics: Arc<Metrics>,
    mode: Mode,
    nonce_start: u32,
    share_tx: mpsc::Sender<ShareCandidate>,
    stale_after: Duration,
}

impl Scanner {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: &MinerConfig,
        extranonce1: Extranonce,
        extranonce2_size: usize,
        job_rx: watch::Receiver<Option<Job>>,
        difficulty: Arc<Mutex<Option<Difficulty>>>,
        metrics: Arc<Metrics>,
        share_tx: mpsc::Sender<ShareCandidate>,
        cancel: CancellationToken,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            backend: metrics.backend(),
            batch_nonces: config.batch_nonces,
            cancel,
            deadline,
            difficulty,
            extranonce1,
            extranonce2: Extranonce::zeros(extranonce2_size),
            job_rx,
            max_shares: config.max_shares,
            metrics,
            mode: config.mode,
            nonce_start: config.nonce_start,
            share_tx,
            stale_after: config.stale_after,
        }
    }

    fn next_extranonce2(&mut self) -> Extranonce {
        let extranonce2 = self.extranonce2.clone();
        self.extranonce2.increment_wrapping();
        extranonce2
    }

    fn should_stop(&self) -> bool {
        if self.cancel.is_cancelled() || self.share_tx.is_closed() {
            return true;
        }

        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.metrics.stop(StopReason::Duration);
            self.cancel.cancel();
            return true;
        }

        if let Some(max_shares) = self.max_shares
            && self.metrics.accepted() >= max_shares
        {
            self.metrics.stop(StopReason::MaxShares);
            self.cancel.cancel();
            return true;
        }

        false
    }

    pub(crate) async fn run(mut self) {
        let mut last_log = Instant::now();

        loop {
            if self.should_stop() {
                break;
            }

            let job = self.job_rx.borrow().clone();
            let difficulty = *self.difficulty.lock().await;

            let (Some(job), Some(difficulty)) = (job, difficulty) else {
                sleep(IDLE_WAIT).await;
                continue;
            };

            if job.is_stale(self.stale_after) {
                self.metrics.record_stale();
                sleep(STALE_WAIT).await;
                continue;
            }

            let extranonce2 = self.next_extranonce2();

            let prefix = match job.header_prefix(&self.extranonce1, &extranonce2) {
                Ok(prefix) => prefix,
                Err(err) => {
                    warn!("Skipping malformed job {}: {err}", job.notify.job_id);
                    sleep(IDLE_WAIT).await;
                    continue;
                }
            };

            let target = difficulty.to_target();
            let start = self.mode.start_nonce(self.nonce_start, &job.notify.job_id);
            let count = self.batch_nonces;
            let backend = self.backend;

            let Ok(found) =
                task::spawn_blocking(move || find_share(&prefix, &target, start, count, backend))
                    .await
            else {
                break;
            };

            let scanned = match found {
                Some(nonce) => u64::from(nonce.wrapping_sub(start)) + 1,
                None => u64::from(count),
            };
            self.metrics.add_hashes(scanned);

            if let Some(nonce) = found {
                debug!(
                    "Share candidate: job_id={} nonce={:08x}",
                    job.notify.job_id, nonce
                );

                let candidate = ShareCandidate {
                    job_id: job.notify.job_id.clone(),
                    extranonce2,
                    ntime: job.notify.ntime,
                    nonce: Nonce::from(nonce),
                };

                if self.share_tx.send(candidate).await.is_err() {
                    break;
                }
            }

            if last_log.elapsed() >= LOG_EVERY {
                info!(
                    "hashrate={} submitted={} accepted={} rejected={} difficulty={}",
                    HashRate::estimate(self.metrics.hashes(), self.metrics.uptime()),
                    self.metrics.submitted(),
                    self.metrics.accepted(),
                    self.metrics.rejected(),
                    difficulty,
                );
                last_log = Instant::now();
            }

            // Batch boundary: give the reader a chance to publish a new
            // job before the next snapshot.
            task::yield_now().await;
        }
    }
}
