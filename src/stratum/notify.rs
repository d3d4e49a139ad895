use super::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Notify {
    pub job_id: String,
    pub prevhash: PrevHash,
    pub coinb1: String,
    pub coinb2: String,
    pub merkle_branches: Vec<MerkleNode>,
    pub version: Version,
    pub nbits: Nbits,
    pub ntime: Ntime,
    pub clean_jobs: bool,
}

impl Serialize for Notify {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(9))?;
        seq.serialize_element(&self.job_id)?;
        seq.serialize_element(&self.prevhash)?;
        seq.serialize_element(&self.coinb1)?;
        seq.serialize_element(&self.coinb2)?;
        seq.serialize_element(&self.merkle_branches)?;
        seq.serialize_element(&self.version)?;
        seq.serialize_element(&self.nbits)?;
        seq.serialize_element(&self.ntime)?;
        seq.serialize_element(&self.clean_jobs)?;
        seq.end()
    }
}

/// Pools are allowed to append params past clean_jobs; everything after
/// the ninth position is ignored.
impl<'de> Deserialize<'de> for Notify {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let params = Vec::<Value>::deserialize(deserializer)?;

        if params.len() < 9 {
            return Err(de::Error::custom(format!(
                "mining.notify expects at least 9 params, got {}",
                params.len()
            )));
        }

        fn field<T: serde::de::DeserializeOwned, E: de::Error>(
            value: &Value,
            name: &str,
        ) -> Result<T, E> {
            serde_json::from_value(value.clone())
                .map_err(|e| de::Error::custom(format!("bad {name}: {e}")))
        }

        Ok(Notify {
            job_id: field(&params[0], "job_id")?,
            prevhash: field(&params[1], "prevhash")?,
            coinb1: field(&params[2], "coinb1")?,
            coinb2: field(&params[3], "coinb2")?,
            merkle_branches: field(&params[4], "merkle_branch")?,
            version: field(&params[5], "version")?,
            nbits: field(&params[6], "nbits")?,
            ntime: field(&params[7], "ntime")?,
            clean_jobs: field(&params[8], "clean_jobs")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, serde_json::json};

    fn notify_params() -> Value {
        json!([
            "bf",
            "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000",
            "0200000001",
            "ffffffff",
            ["11".repeat(32), "22".repeat(32)],
            "20000000",
            "1d00ffff",
            "5f5e1000",
            true
        ])
    }

    #[test]
    fn deserialize() {
        let notify: Notify = serde_json::from_value(notify_params()).unwrap();

        assert_eq!(notify.job_id, "bf");
        assert_eq!(notify.coinb1, "0200000001");
        assert_eq!(notify.coinb2, "ffffffff");
        assert_eq!(notify.merkle_branches.len(), 2);
        assert_eq!(notify.version, Version(0x20000000));
        assert_eq!(notify.nbits, Nbits(0x1d00ffff));
        assert_eq!(notify.ntime, Ntime(0x5f5e1000));
        assert!(notify.clean_jobs);
    }

    #[test]
    fn roundtrip() {
        let notify: Notify = serde_json::from_value(notify_params()).unwrap();
        let serialized = serde_json::to_value(&notify).unwrap();
        assert_eq!(serialized, notify_params());

        let back: Notify = serde_json::from_value(serialized).unwrap();
        assert_eq!(back, notify);
    }

    #[test]
    fn extra_params_are_ignored() {
        let mut params = notify_params();
        params.as_array_mut().unwrap().push(json!("extension"));

        let notify: Notify = serde_json::from_value(params).unwrap();
        assert_eq!(notify.job_id, "bf");
    }

    #[test]
    fn too_few_params_rejected() {
        let mut params = notify_params();
        params.as_array_mut().unwrap().truncate(8);

        assert!(serde_json::from_value::<Notify>(params).is_err());
    }

    #[test]
    fn malformed_prevhash_rejected() {
        let mut params = notify_params();
        params.as_array_mut().unwrap()[1] = json!("abcd");

        assert!(serde_json::from_value::<Notify>(params).is_err());
    }
}
