use super::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Extranonce(Vec<u8>);

impl Extranonce {
    /// The all-zero counter start for a miner-chosen extranonce2 of the
    /// pool-mandated width.
    pub fn zeros(size: usize) -> Self {
        Self(vec![0u8; size])
    }

    /// Fixed-width big-endian increment, wrapping at the top of the range.
    pub fn increment_wrapping(&mut self) {
        for b in self.0.iter_mut().rev() {
            let (next, carry) = b.overflowing_add(1);
            *b = next;
            if !carry {
                return;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, InternalError> {
        Ok(Self(hex::decode(s).context(HexSnafu)?))
    }
}

impl Serialize for Extranonce {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Extranonce {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Self::from_hex(&s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl fmt::Display for Extranonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Extranonce {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_odd_length_hex() {
        assert!("abc".parse::<Extranonce>().is_err());
    }

    #[test]
    fn rejects_non_hex() {
        assert!("zz".parse::<Extranonce>().is_err());
    }

    #[test]
    fn valid_hex_roundtrip() {
        let extranonce: Extranonce = serde_json::from_str(r#""abcd""#).unwrap();
        assert_eq!(extranonce.len(), 2);
        assert_eq!(extranonce.to_hex(), "abcd");
        let ser = serde_json::to_string(&extranonce).unwrap();
        assert_eq!(ser, r#""abcd""#);
    }

    #[test]
    fn zeros_encodes_counter_in_exactly_that_many_bytes() {
        for size in 1..=8 {
            let extranonce = Extranonce::zeros(size);
            assert_eq!(extranonce.len(), size);
            assert_eq!(extranonce.to_hex(), "00".repeat(size));
        }
    }

    #[test]
    fn increment() {
        let mut extranonce = "00".parse::<Extranonce>().unwrap();
        extranonce.increment_wrapping();
        assert_eq!(extranonce.to_hex(), "01");
    }

    #[test]
    fn increment_with_carry() {
        let mut extranonce = "00ff".parse::<Extranonce>().unwrap();
        extranonce.increment_wrapping();
        assert_eq!(extranonce.to_hex(), "0100");
    }

    #[test]
    fn increment_wraps() {
        let mut extranonce = "ffff".parse::<Extranonce>().unwrap();
        extranonce.increment_wrapping();
        assert_eq!(extranonce.to_hex(), "0000");
        assert_eq!(extranonce.len(), 2);
    }

    #[test]
    fn increment_single_byte_width_wraps() {
        let mut extranonce = Extranonce::zeros(1);
        for _ in 0..256 {
            extranonce.increment_wrapping();
        }
        assert_eq!(extranonce.to_hex(), "00");
    }
}
