use super::*;

/// One sibling hash from a mining.notify merkle branch, stored in wire
/// byte order (the pool's big-endian hex, undisturbed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct MerkleNode([u8; 32]);

impl MerkleNode {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }
}

impl FromStr for MerkleNode {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(InternalError::InvalidValue {
                reason: format!("merkle node must be 64 hex chars, got {}", s.len()),
            });
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).context(HexSnafu)?;
        Ok(MerkleNode(bytes))
    }
}

impl fmt::Display for MerkleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Recomputes the merkle root from the reassembled coinbase and the
/// pool-provided sibling hashes, returning little-endian bytes ready for
/// the header. Branch hex is reversed to little-endian before each
/// concatenation and intermediate hashes are tracked little-endian.
pub fn merkle_root(
    coinb1: &str,
    coinb2: &str,
    extranonce1: &Extranonce,
    extranonce2: &Extranonce,
    merkle_branches: &[MerkleNode],
) -> Result<[u8; 32], InternalError> {
    let coinbase =
        hex::decode(format!("{coinb1}{extranonce1}{extranonce2}{coinb2}")).context(HexSnafu)?;

    let mut root = sha256d(&coinbase);
    root.reverse();

    for branch in merkle_branches {
        let mut concat = [0u8; 64];
        concat[0..32].copy_from_slice(&root);
        concat[32..64].copy_from_slice(&branch.to_le_bytes());
        root = sha256d(&concat);
        root.reverse();
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn extranonce1() -> Extranonce {
        "01020304".parse().unwrap()
    }

    fn extranonce2() -> Extranonce {
        "00000000".parse().unwrap()
    }

    #[test]
    fn merkle_node_roundtrip() {
        let hex = "11".repeat(32);
        let node: MerkleNode = hex.parse().unwrap();
        assert_eq!(node.to_string(), hex);
    }

    #[test]
    fn merkle_node_rejects_bad_input() {
        assert!("11".parse::<MerkleNode>().is_err());
        assert!(("zz".repeat(32)).parse::<MerkleNode>().is_err());
    }

    #[test]
    fn empty_branches_is_reversed_coinbase_hash() {
        let got = merkle_root("0200000001", "ffffffff", &extranonce1(), &extranonce2(), &[])
            .unwrap();

        let coinbase = hex::decode("02000000010102030400000000ffffffff").unwrap();
        let mut want = sha256d(&coinbase);
        want.reverse();

        assert_eq!(got, want);
    }

    #[test]
    fn known_branch_vector() {
        let branches: Vec<MerkleNode> = ["11".repeat(32), "22".repeat(32)]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        let root = merkle_root(
            "0200000001",
            "ffffffff",
            &extranonce1(),
            &extranonce2(),
            &branches,
        )
        .unwrap();

        assert_eq!(
            hex::encode(root),
            "952342ad97a763a8ac60da98b45ff440f0d747dfe8c0581b8b8aa7229ab89b4f",
        );
    }

    #[test]
    fn branch_order_matters() {
        let forward: Vec<MerkleNode> = ["11".repeat(32), "22".repeat(32)]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let reversed: Vec<MerkleNode> = forward.iter().rev().copied().collect();

        let a = merkle_root("00", "00", &extranonce1(), &extranonce2(), &forward).unwrap();
        let b = merkle_root("00", "00", &extranonce1(), &extranonce2(), &reversed).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn rejects_non_hex_coinbase() {
        assert!(merkle_root("zz", "00", &extranonce1(), &extranonce2(), &[]).is_err());
    }
}
