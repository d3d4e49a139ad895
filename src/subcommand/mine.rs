use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Mine {
    #[arg(help = "Stratum <HOST:PORT>.")]
    endpoint: String,
    #[arg(long, help = "Stratum <USERNAME>.")]
    user: String,
    #[arg(long, help = "Stratum <PASSWORD>.")]
    password: Option<String>,
    #[arg(long, default_value_t = 10.0, help = "Socket read/write <TIMEOUT> in seconds.")]
    timeout: f64,
    #[arg(long, default_value_t = 0, help = "Baseline <NONCE_START> for each scan batch.")]
    nonce_start: u32,
    #[arg(long, default_value_t = 200_000, help = "Scan <NONCE_COUNT> nonces per batch.")]
    nonce_count: u32,
    #[arg(long, help = "Stop after <MAX_SHARES> accepted shares.")]
    max_shares: Option<u64>,
    #[arg(long, help = "Stop after <DURATION> seconds.")]
    duration: Option<f64>,
    #[arg(
        long,
        default_value_t = 120.0,
        help = "Skip jobs older than <STALE_SECONDS>."
    )]
    stale_seconds: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = Mode::Baseline,
        help = "Starting-nonce policy <MODE>."
    )]
    mode: Mode,
    #[arg(long, help = "Write the metrics snapshot to <OUT> as JSON.")]
    out: Option<PathBuf>,
    #[arg(
        long,
        help = "Send mining.suggest_difficulty <SUGGEST_DIFFICULTY> after authorizing."
    )]
    suggest_difficulty: Option<f64>,
}

impl Mine {
    pub(crate) async fn run(self, cancel_token: CancellationToken) -> Result {
        ensure!(self.timeout > 0.0, "timeout must be > 0");
        ensure!(self.nonce_count > 0, "nonce-count must be > 0");
        ensure!(self.stale_seconds >= 0.0, "stale-seconds must be >= 0");

        if let Some(difficulty) = self.suggest_difficulty {
            ensure!(
                difficulty.is_finite() && difficulty > 0.0,
                "suggest-difficulty must be finite and > 0"
            );
        }

        let config = MinerConfig {
            endpoint: self.endpoint,
            username: self.user,
            password: self.password,
            timeout: Duration::from_secs_f64(self.timeout),
            nonce_start: self.nonce_start,
            batch_nonces: self.nonce_count,
            max_shares: self.max_shares,
            duration: self.duration.map(Duration::from_secs_f64),
            stale_after: Duration::from_secs_f64(self.stale_seconds),
            mode: self.mode,
            suggest_difficulty: self.suggest_difficulty,
            out_path: self.out,
        };

        info!(
            "Connecting to {} with user {}",
            config.endpoint, config.username
        );

        let snapshot = miner::run(config, cancel_token).await?;

        println!("{}", serde_json::to_string_pretty(&snapshot)?);

        Ok(())
    }
}
