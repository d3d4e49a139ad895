use super::*;

/// Share target at difficulty 1, the stratum baseline:
/// 0x00000000ffff0000...0000.
pub static DIFFICULTY_1_TARGET: LazyLock<U256> = LazyLock::new(|| {
    U256::from_big_endian(
        &hex::decode("00000000ffff0000000000000000000000000000000000000000000000000000")
            .expect("valid hex"),
    )
});

/// Pool-assigned share difficulty. The share target is
/// `DIFFICULTY_1_TARGET / difficulty`, computed with 256-bit integer
/// division rather than floats so large difficulties keep their
/// precision, and clamped to `[1, 2^256 - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Difficulty(f64);

impl Difficulty {
    pub fn as_f64(self) -> f64 {
        self.0
    }

    pub fn to_target(self) -> U256 {
        // Fractional difficulties are handled by scaling both sides of the
        // division into integers. The scale is capped at 2^32 - 1 so the
        // numerator stays inside 256 bits for any difficulty >= 1.
        const MAX_SCALE: u64 = 0xFFFF_FFFF;

        let max_by_difficulty = (u64::MAX as f64 / self.0).floor();
        let scale = max_by_difficulty.min(MAX_SCALE as f64).max(1.0) as u64;

        let numerator = DIFFICULTY_1_TARGET.saturating_mul(U256::from(scale));
        let denominator = (self.0 * scale as f64).round() as u64;

        if denominator == 0 {
            U256::MAX
        } else {
            (numerator / U256::from(denominator)).max(U256::one())
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty(1.0)
    }
}

impl From<f64> for Difficulty {
    fn from(difficulty: f64) -> Self {
        assert!(
            difficulty.is_finite() && difficulty > 0.0,
            "difficulty must be finite and > 0"
        );
        Difficulty(difficulty)
    }
}

impl From<u64> for Difficulty {
    fn from(difficulty: u64) -> Self {
        assert!(difficulty > 0, "difficulty must be > 0");
        Difficulty(difficulty as f64)
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        if self.0 < 1.0 || self.0.fract() != 0.0 {
            ser.serialize_f64(self.0)
        } else {
            ser.serialize_u64(self.0 as u64)
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Int(u64),
            Float(f64),
        }

        match Wire::deserialize(de)? {
            Wire::Int(u) => {
                if u == 0 {
                    return Err(de::Error::custom("difficulty must be > 0"));
                }
                Ok(Difficulty::from(u))
            }
            Wire::Float(x) => {
                if !x.is_finite() || x <= 0.0 {
                    return Err(de::Error::custom("difficulty must be finite and > 0"));
                }
                Ok(Difficulty::from(x))
            }
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0 >= 1.0 {
            si::format_si(self.0.floor(), "", f)
        } else if let Some(p) = f.precision() {
            write!(f, "{:.*}", p, self.0)
        } else {
            let s = format!("{:.8}", self.0);
            let s = s.trim_end_matches('0').trim_end_matches('.');
            f.write_str(s)
        }
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(difficulty: &str) -> Result<Self, Self::Err> {
        let x = difficulty.trim().parse::<f64>()?;
        ensure!(
            x.is_finite() && x > 0.0,
            "difficulty must be finite and > 0"
        );
        Ok(Difficulty(x))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::scan::meets_target, pretty_assertions::assert_eq};

    #[test]
    fn difficulty_1_target_is_the_stratum_baseline() {
        assert_eq!(Difficulty::from(1.0).to_target(), *DIFFICULTY_1_TARGET);
        assert_eq!(Difficulty::from(1u64).to_target(), *DIFFICULTY_1_TARGET);
    }

    #[test]
    fn target_halves_when_difficulty_doubles() {
        let d1 = Difficulty::from(1.0).to_target();
        let d2 = Difficulty::from(2.0).to_target();
        assert_eq!(d2, d1 / U256::from(2));
    }

    #[test]
    fn target_is_monotonically_nonincreasing_in_difficulty() {
        let difficulties = [0.001, 0.5, 1.0, 2.0, 1000.0, 1e9, 1e15, 1e20];
        for pair in difficulties.windows(2) {
            let lower = Difficulty::from(pair[0]).to_target();
            let higher = Difficulty::from(pair[1]).to_target();
            assert!(
                lower >= higher,
                "target({}) < target({})",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn share_meeting_higher_difficulty_meets_lower() {
        let easy = Difficulty::from(1.0);
        let hard = Difficulty::from(4096.0);

        let mut digest = hard.to_target().to_little_endian();
        digest[31] = 0;

        assert!(meets_target(&digest, &hard.to_target()));
        assert!(meets_target(&digest, &easy.to_target()));
    }

    #[test]
    fn tiny_difficulty_saturates_instead_of_overflowing() {
        let target = Difficulty::from(1e-12).to_target();
        assert!(target > *DIFFICULTY_1_TARGET);
    }

    #[test]
    fn huge_difficulty_clamps_to_at_least_one() {
        let target = Difficulty::from(1e300).to_target();
        assert!(target >= U256::one());
    }

    #[test]
    fn large_difficulty_keeps_integer_precision() {
        // 2^40 divides the baseline exactly, so integer division is exact.
        let target = Difficulty::from((1u64 << 40) as f64).to_target();
        assert_eq!(target, *DIFFICULTY_1_TARGET >> 40);
    }

    #[test]
    fn deserialize_from_int_or_float() {
        let a: Difficulty = serde_json::from_str("2").unwrap();
        let b: Difficulty = serde_json::from_str("2.0").unwrap();
        let c: Difficulty = serde_json::from_str("0.125").unwrap();

        assert_eq!(a.as_f64(), 2.0);
        assert_eq!(b.as_f64(), 2.0);
        assert_eq!(c.as_f64(), 0.125);
    }

    #[test]
    fn serde_rejects_bad_inputs() {
        for difficulty in ["0", "0.0", "-1", "-0.001"] {
            assert!(
                serde_json::from_str::<Difficulty>(difficulty).is_err(),
                "should reject {difficulty}"
            );
        }
    }

    #[test]
    fn serialize_shape() {
        assert_eq!(serde_json::to_string(&Difficulty::from(42u64)).unwrap(), "42");
        let fractional = serde_json::to_string(&Difficulty::from(0.5)).unwrap();
        assert!(fractional.contains('.'), "expected float form: {fractional}");
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Difficulty::from(1000u64)), "1 K");
        assert_eq!(format!("{}", Difficulty::from(0.5)), "0.5");
        assert_eq!(format!("{:.2}", Difficulty::from(0.126)), "0.13");
    }
}
