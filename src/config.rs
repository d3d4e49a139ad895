use super::*;

/// Starting-nonce policy for each bounded scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    #[default]
    Baseline,
    Vireon,
}

impl Mode {
    /// Baseline mode always scans from the configured start. Vireon mode
    /// derives a per-job start from the job id so concurrent runs against
    /// the same pool spread out over the nonce space.
    pub fn start_nonce(self, baseline: u32, job_id: &str) -> u32 {
        match self {
            Mode::Baseline => baseline,
            Mode::Vireon => LittleEndian::read_u32(&sha256(job_id.as_bytes())[0..4]),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Baseline => write!(f, "baseline"),
            Mode::Vireon => write!(f, "vireon"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub endpoint: String,
    pub username: String,
    pub password: Option<String>,
    pub timeout: Duration,
    pub nonce_start: u32,
    pub batch_nonces: u32,
    pub max_shares: Option<u64>,
    pub duration: Option<Duration>,
    pub stale_after: Duration,
    pub mode: Mode,
    pub suggest_difficulty: Option<f64>,
    pub out_path: Option<PathBuf>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:3333".into(),
            username: "vireon.worker".into(),
            password: None,
            timeout: Duration::from_secs(10),
            nonce_start: 0,
            batch_nonces: 200_000,
            max_shares: None,
            duration: None,
            stale_after: Duration::from_secs(120),
            mode: Mode::default(),
            suggest_difficulty: None,
            out_path: None,
        }
    }
}
