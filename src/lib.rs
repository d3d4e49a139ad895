use {
    anyhow::{Error, anyhow, bail, ensure},
    arguments::Arguments,
    byteorder::{BigEndian, ByteOrder, LittleEndian},
    clap::Parser,
    config::{MinerConfig, Mode},
    difficulty::Difficulty,
    hash_rate::HashRate,
    job::Job,
    primitive_types::U256,
    scan::{Backend, find_share},
    serde::{
        Deserialize, Serialize, Serializer,
        de::{self, Deserializer},
        ser::SerializeSeq,
    },
    serde_json::Value,
    serde_with::{DeserializeFromStr, SerializeDisplay},
    sha256d::{Midstate, midstate, sha256, sha256d},
    std::{
        collections::BTreeMap,
        env,
        fmt::{self, Display, Formatter},
        fs,
        path::PathBuf,
        process,
        str::FromStr,
        sync::{
            Arc, LazyLock, OnceLock,
            atomic::{AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    },
    stratum::{
        Client, ClientConfig, ClientError, Event, Extranonce, Nbits, Nonce, Notify, Ntime,
        PrevHash, Submit, SubmitOutcome, SubscribeResult, Version,
    },
    tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter},
        net::TcpStream,
        runtime::Runtime,
        signal::ctrl_c,
        sync::{Mutex, broadcast, mpsc, oneshot, watch},
        task,
        time::sleep,
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
    tracing_subscriber::EnvFilter,
};

mod arguments;
pub mod config;
pub mod difficulty;
pub mod hash_rate;
pub mod job;
pub mod miner;
pub mod scan;
pub mod sha256d;
mod si;
pub mod stratum;
mod subcommand;

pub const USER_AGENT: &str = "vireon/0.1.0";

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Arguments::parse();

    match args.run() {
        Err(err) => {
            error!("error: {err}");

            if env::var_os("RUST_BACKTRACE")
                .map(|val| val == "1")
                .unwrap_or_default()
            {
                error!("{}", err.backtrace());
            }
            process::exit(1);
        }
        Ok(_) => {
            process::exit(0);
        }
    }
}
