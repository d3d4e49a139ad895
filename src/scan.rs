use super::*;

/// Which double-SHA-256 path the scanner runs. Midstate caches the
/// compression of the constant first 64 header bytes; scalar rehashes the
/// full 80 bytes per nonce and exists to pin the midstate path down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Scalar,
    #[default]
    Midstate,
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Scalar => write!(f, "scalar"),
            Backend::Midstate => write!(f, "midstate"),
        }
    }
}

/// True when the digest, read as a little-endian 256-bit integer the way
/// Bitcoin orders hashes, is at or below the target.
pub fn meets_target(digest: &[u8; 32], target: &U256) -> bool {
    meets_target_be(digest, &target.to_big_endian())
}

fn meets_target_be(digest: &[u8; 32], target_be: &[u8; 32]) -> bool {
    for i in 0..32 {
        let d = digest[31 - i];
        let t = target_be[i];
        if d != t {
            return d < t;
        }
    }
    true
}

/// Scans `count` nonces from `start_nonce` (wrapping mod 2^32) and returns
/// the first whose `sha256d(header76 || le32(nonce))` meets the target.
pub fn find_share(
    header76: &[u8; 76],
    target: &U256,
    start_nonce: u32,
    count: u32,
    backend: Backend,
) -> Option<u32> {
    let target_be = target.to_big_endian();

    match backend {
        Backend::Scalar => scan_scalar(header76, &target_be, start_nonce, count),
        Backend::Midstate => scan_midstate(header76, &target_be, start_nonce, count),
    }
}

fn scan_scalar(
    header76: &[u8; 76],
    target_be: &[u8; 32],
    start_nonce: u32,
    count: u32,
) -> Option<u32> {
    let mut message = [0u8; 80];
    message[0..76].copy_from_slice(header76);

    let mut nonce = start_nonce;
    for _ in 0..count {
        LittleEndian::write_u32(&mut message[76..80], nonce);

        if meets_target_be(&sha256d(&message), target_be) {
            return Some(nonce);
        }

        nonce = nonce.wrapping_add(1);
    }

    None
}

fn scan_midstate(
    header76: &[u8; 76],
    target_be: &[u8; 32],
    start_nonce: u32,
    count: u32,
) -> Option<u32> {
    let cached = midstate(header76[0..64].try_into().expect("76-byte header"));

    // Second block of the first pass: 12 constant tail bytes, the nonce
    // slot, then fixed padding for an 80-byte message (640 bits).
    let mut tail = [0u8; 64];
    tail[0..12].copy_from_slice(&header76[64..76]);
    tail[16] = 0x80;
    BigEndian::write_u64(&mut tail[56..64], 640);

    // Single block of the second pass: 32 digest bytes plus fixed padding
    // for a 32-byte message (256 bits).
    let mut block = [0u8; 64];
    block[32] = 0x80;
    BigEndian::write_u64(&mut block[56..64], 256);

    let mut nonce = start_nonce;
    for _ in 0..count {
        LittleEndian::write_u32(&mut tail[12..16], nonce);

        let mut first = cached;
        first.compress(&tail);
        block[0..32].copy_from_slice(&first.digest());

        let mut second = Midstate::iv();
        second.compress(&block);

        if meets_target_be(&second.digest(), target_be) {
            return Some(nonce);
        }

        nonce = nonce.wrapping_add(1);
    }

    None
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn easy_target() -> U256 {
        // 2^248 - 1: roughly one nonce in 256 qualifies.
        U256::MAX >> 8
    }

    #[test]
    fn both_backends_find_the_known_nonce() {
        let header76 = [0x01u8; 76];
        let target = easy_target();

        for backend in [Backend::Scalar, Backend::Midstate] {
            assert_eq!(
                find_share(&header76, &target, 0, 5000, backend),
                Some(250),
                "{backend}"
            );
        }
    }

    #[test]
    fn found_nonce_actually_meets_target() {
        let header76 = [0x01u8; 76];
        let target = easy_target();

        let nonce = find_share(&header76, &target, 0, 5000, Backend::Midstate).unwrap();

        let mut message = [0u8; 80];
        message[0..76].copy_from_slice(&header76);
        LittleEndian::write_u32(&mut message[76..80], nonce);

        assert!(meets_target(&sha256d(&message), &target));
    }

    #[test]
    fn backends_agree_across_ranges() {
        let mut header76 = [0u8; 76];
        for (i, byte) in header76.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(13).wrapping_add(7);
        }

        for (start, count) in [(0u32, 2000u32), (12345, 3000), (0xffff_ff00, 512), (9, 1)] {
            for target in [easy_target(), U256::MAX >> 16, U256::MAX] {
                assert_eq!(
                    find_share(&header76, &target, start, count, Backend::Scalar),
                    find_share(&header76, &target, start, count, Backend::Midstate),
                    "start={start} count={count}"
                );
            }
        }
    }

    #[test]
    fn zero_count_returns_none() {
        let header76 = [0x01u8; 76];
        assert_eq!(
            find_share(&header76, &U256::MAX, 0, 0, Backend::Midstate),
            None
        );
        assert_eq!(
            find_share(&header76, &U256::MAX, 0, 0, Backend::Scalar),
            None
        );
    }

    #[test]
    fn nonce_arithmetic_wraps() {
        let header76 = [0x01u8; 76];

        // Every nonce qualifies at the maximum target, so the range that
        // wraps past 2^32 - 1 must return its own start.
        assert_eq!(
            find_share(&header76, &U256::MAX, u32::MAX, 4, Backend::Midstate),
            Some(u32::MAX)
        );

        // A range straddling the wrap still finds the first qualifying
        // nonce on the far side.
        let scalar = find_share(
            &header76,
            &easy_target(),
            u32::MAX - 100,
            5000,
            Backend::Scalar,
        );
        let midstate = find_share(
            &header76,
            &easy_target(),
            u32::MAX - 100,
            5000,
            Backend::Midstate,
        );
        assert_eq!(scalar, midstate);
        if let Some(nonce) = scalar {
            assert!(nonce < 5000 || nonce >= u32::MAX - 100);
        }
    }

    #[test]
    fn digest_equal_to_target_meets_it() {
        let header76 = [0x01u8; 76];

        let mut message = [0u8; 80];
        message[0..76].copy_from_slice(&header76);
        LittleEndian::write_u32(&mut message[76..80], 250);

        let mut digest = sha256d(&message);
        digest.reverse();
        let target = U256::from_big_endian(&digest);

        digest.reverse();
        assert!(meets_target(&digest, &target));

        assert_eq!(
            find_share(&header76, &target, 250, 1, Backend::Midstate),
            Some(250)
        );
    }

    #[test]
    fn target_zero_matches_nothing_plausible() {
        let header76 = [0x01u8; 76];
        assert_eq!(
            find_share(&header76, &U256::zero(), 0, 1000, Backend::Midstate),
            None
        );
    }
}
