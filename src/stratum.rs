use super::*;

use error::{HexSnafu, ParseHexIntSnafu};
use snafu::{ResultExt, Snafu};

mod authorize;
mod client;
mod error;
mod event;
mod extranonce;
mod merkle;
mod message;
mod nbits;
mod nonce;
mod notify;
mod ntime;
mod prevhash;
mod set_difficulty;
mod submit;
mod subscribe;
mod suggest_difficulty;
mod version;

pub use {
    authorize::Authorize,
    client::{Client, ClientConfig, ClientError, EventReceiver, SubmitOutcome},
    error::{InternalError, JsonRpcError},
    event::Event,
    extranonce::Extranonce,
    merkle::{MerkleNode, merkle_root},
    message::{Id, Message},
    nbits::Nbits,
    nonce::Nonce,
    notify::Notify,
    ntime::Ntime,
    prevhash::PrevHash,
    set_difficulty::SetDifficulty,
    submit::Submit,
    subscribe::{Subscribe, SubscribeResult},
    suggest_difficulty::SuggestDifficulty,
    version::Version,
};

/// Upper bound on a single JSON line from the pool. Anything longer is a
/// framing error and fails the connection.
pub const MAX_LINE_SIZE: usize = 1024 * 1024;
