use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Duration,
    MaxShares,
    Cancelled,
    Fatal,
}

impl Display for StopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Duration => write!(f, "duration"),
            StopReason::MaxShares => write!(f, "max_shares"),
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::Fatal => write!(f, "fatal"),
        }
    }
}

/// Run counters shared by the reader and scanner sides. Everything is
/// monotone and relaxed; the snapshot is taken after both tasks stop.
pub struct Metrics {
    backend: Backend,
    started: Instant,
    hashes: AtomicU64,
    submitted: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    jobs_seen: AtomicU64,
    stale_jobs: AtomicU64,
    last_difficulty: AtomicU64,
    stop_reason: OnceLock<StopReason>,
}

impl Metrics {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            started: Instant::now(),
            hashes: AtomicU64::new(0),
            submitted: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            jobs_seen: AtomicU64::new(0),
            stale_jobs: AtomicU64::new(0),
            last_difficulty: AtomicU64::new(f64::NAN.to_bits()),
            stop_reason: OnceLock::new(),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn add_hashes(&self, hashes: u64) {
        self.hashes.fetch_add(hashes, Ordering::Relaxed);
    }

    pub fn hashes(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }

    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn record_job(&self) {
        self.jobs_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self) {
        self.stale_jobs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stale_jobs(&self) -> u64 {
        self.stale_jobs.load(Ordering::Relaxed)
    }

    pub fn set_difficulty(&self, difficulty: Difficulty) {
        self.last_difficulty
            .store(difficulty.as_f64().to_bits(), Ordering::Relaxed);
    }

    pub fn difficulty(&self) -> Option<f64> {
        let difficulty = f64::from_bits(self.last_difficulty.load(Ordering::Relaxed));
        (!difficulty.is_nan()).then_some(difficulty)
    }

    /// First stop reason wins; later causes are consequences.
    pub fn stop(&self, reason: StopReason) {
        let _ = self.stop_reason.set(reason);
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason.get().copied()
    }

    pub fn snapshot(&self, config: &MinerConfig) -> Snapshot {
        let runtime = self.uptime();
        let hashes = self.hashes();
        let submitted = self.submitted();
        let accepted = self.accepted();
        let rejected = self.rejected();

        let rate = |numerator: u64, denominator: u64| {
            if denominator == 0 {
                0.0
            } else {
                numerator as f64 / denominator as f64
            }
        };

        Snapshot {
            endpoint: config.endpoint.clone(),
            username: config.username.clone(),
            runtime_secs: runtime.as_secs_f64(),
            hashes,
            mhs: HashRate::estimate(hashes, runtime).mhs(),
            backend: self.backend,
            submitted,
            accepted,
            rejected,
            accept_rate: rate(accepted, submitted),
            reject_rate: rate(rejected, submitted),
            yield_rate: rate(submitted, hashes),
            difficulty: self.difficulty(),
            jobs_seen: self.jobs_seen.load(Ordering::Relaxed),
            stale_jobs: self.stale_jobs(),
            stop_reason: self.stop_reason().unwrap_or(StopReason::Fatal),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub endpoint: String,
    pub username: String,
    pub runtime_secs: f64,
    pub hashes: u64,
    pub mhs: f64,
    pub backend: Backend,
    pub submitted: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub accept_rate: f64,
    pub reject_rate: f64,
    pub yield_rate: f64,
    pub difficulty: Option<f64>,
    pub jobs_seen: u64,
    pub stale_jobs: u64,
    pub stop_reason: StopReason,
}

pub trait MetricsSink {
    fn record(&self, snapshot: &Snapshot) -> Result;
}

pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetricsSink for JsonFileSink {
    fn record(&self, snapshot: &Snapshot) -> Result {
        fs::write(&self.path, serde_json::to_string_pretty(snapshot)? + "\n")?;
        Ok(())
    }
}
