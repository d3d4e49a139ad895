use super::*;

/// Compact network target as it appears in the header, carried opaquely:
/// the share target comes from the pool difficulty, not from nbits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Nbits(pub u32);

impl FromStr for Nbits {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact = u32::from_str_radix(s, 16).context(ParseHexIntSnafu {
            input: s.to_string(),
        })?;
        Ok(Nbits(compact))
    }
}

impl fmt::Display for Nbits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<Nbits> for u32 {
    fn from(n: Nbits) -> u32 {
        n.0
    }
}

impl From<u32> for Nbits {
    fn from(n: u32) -> Nbits {
        Nbits(n)
    }
}
