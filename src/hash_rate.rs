use super::*;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct HashRate(pub f64);

impl HashRate {
    pub const ZERO: Self = Self(0.0);

    pub fn estimate(hashes: u64, window: Duration) -> Self {
        if window.is_zero() {
            return Self::ZERO;
        }

        Self(hashes as f64 / window.as_secs_f64())
    }

    pub fn mhs(self) -> f64 {
        self.0 / 1e6
    }
}

impl Display for HashRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        si::format_si(self.0, "H/s", f)
    }
}
