use super::*;

/// A mining.notify job plus the instant it arrived, so the scanner can
/// refuse work that has gone stale.
#[derive(Debug, Clone)]
pub struct Job {
    pub notify: Notify,
    pub received_at: Instant,
}

impl Job {
    pub fn new(notify: Notify) -> Self {
        Self {
            notify,
            received_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }

    pub fn is_stale(&self, stale_after: Duration) -> bool {
        self.age() > stale_after
    }

    /// The 76-byte header prefix for this job under the given extranonces:
    /// everything but the nonce, in hashing byte order.
    pub fn header_prefix(
        &self,
        extranonce1: &Extranonce,
        extranonce2: &Extranonce,
    ) -> Result<[u8; 76]> {
        let root = stratum::merkle_root(
            &self.notify.coinb1,
            &self.notify.coinb2,
            extranonce1,
            extranonce2,
            &self.notify.merkle_branches,
        )?;

        Ok(assemble_header_prefix(
            self.notify.version,
            self.notify.prevhash,
            &root,
            self.notify.ntime,
            self.notify.nbits,
        ))
    }
}

/// version(4 LE) || prevhash(32 reversed) || merkle root(32 LE) ||
/// ntime(4 LE) || nbits(4 LE). The nonce slot at bytes 76..80 is the
/// scanner's.
pub fn assemble_header_prefix(
    version: Version,
    prevhash: PrevHash,
    merkle_root_le: &[u8; 32],
    ntime: Ntime,
    nbits: Nbits,
) -> [u8; 76] {
    let mut header = [0u8; 76];

    LittleEndian::write_u32(&mut header[0..4], version.into());
    header[4..36].copy_from_slice(&prevhash.to_le_bytes());
    header[36..68].copy_from_slice(merkle_root_le);
    LittleEndian::write_u32(&mut header[68..72], ntime.into());
    LittleEndian::write_u32(&mut header[72..76], nbits.into());

    header
}
