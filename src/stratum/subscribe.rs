use super::*;

#[derive(Debug, PartialEq)]
pub struct Subscribe {
    pub user_agent: String,
}

impl Serialize for Subscribe {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&self.user_agent)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Subscribe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (user_agent,): (String,) = Deserialize::deserialize(deserializer)?;
        Ok(Subscribe { user_agent })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct SubscribeResult {
    pub subscriptions: Vec<(String, String)>,
    pub extranonce1: Extranonce,
    pub extranonce2_size: usize,
}

impl Serialize for SubscribeResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.subscriptions)?;
        seq.serialize_element(&self.extranonce1)?;
        seq.serialize_element(&self.extranonce2_size)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SubscribeResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (subscriptions, extranonce1, extranonce2_size) =
            <(Vec<(String, String)>, Extranonce, usize)>::deserialize(deserializer)?;

        Ok(SubscribeResult {
            subscriptions,
            extranonce1,
            extranonce2_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde::de::DeserializeOwned, serde_json::json};

    #[track_caller]
    fn case<T>(json: &str, expected: T)
    where
        T: DeserializeOwned + Serialize + PartialEq + std::fmt::Debug,
    {
        let parsed: T = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, expected, "deserialize equality");

        let ser = serde_json::to_string(&parsed).unwrap();
        let lhs: Value = serde_json::from_str(json).unwrap();
        let rhs: Value = serde_json::from_str(&ser).unwrap();
        assert_eq!(lhs, rhs, "semantic JSON equality");

        let back: T = serde_json::from_str(&ser).unwrap();
        assert_eq!(back, expected, "roundtrip equality");
    }

    #[test]
    fn subscribe_roundtrip() {
        case::<Subscribe>(
            r#"["vireon/0.1.0"]"#,
            Subscribe {
                user_agent: "vireon/0.1.0".into(),
            },
        );
    }

    #[test]
    fn subscribe_unexpected_params() {
        assert!(serde_json::from_str::<Subscribe>("[123]").is_err());
        assert!(serde_json::from_str::<Subscribe>("[]").is_err());
    }

    #[test]
    fn subscribe_result_roundtrip() {
        let result = SubscribeResult {
            subscriptions: vec![
                (
                    "mining.set_difficulty".into(),
                    "b4b6693b72a50c7116db18d6497cac52".into(),
                ),
                (
                    "mining.notify".into(),
                    "ae6812eb4cd7735a302a8a9dd95cf71f".into(),
                ),
            ],
            extranonce1: "08000002".parse().unwrap(),
            extranonce2_size: 4,
        };

        let json = r#"
            [
              [
                ["mining.set_difficulty","b4b6693b72a50c7116db18d6497cac52"],
                ["mining.notify","ae6812eb4cd7735a302a8a9dd95cf71f"]
              ],
              "08000002",
              4
            ]
        "#;

        case::<SubscribeResult>(json, result);
    }

    #[test]
    fn subscribe_result_empty_subscriptions() {
        let result = SubscribeResult {
            subscriptions: vec![],
            extranonce1: "deadbeef".parse().unwrap(),
            extranonce2_size: 8,
        };

        case::<SubscribeResult>(r#"[[], "deadbeef", 8]"#, result);
    }

    #[test]
    fn subscribe_result_serialize_shape() {
        let result = SubscribeResult {
            subscriptions: vec![("mining.notify".into(), "tag".into())],
            extranonce1: "01020304".parse().unwrap(),
            extranonce2_size: 8,
        };

        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v, json!([[["mining.notify", "tag"]], "01020304", 8]));
    }

    #[test]
    fn subscribe_result_bad_shape() {
        assert!(serde_json::from_str::<SubscribeResult>(r#"[[], "0102"]"#).is_err());
        assert!(serde_json::from_str::<SubscribeResult>("true").is_err());
    }
}
