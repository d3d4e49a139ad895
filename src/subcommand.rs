use super::*;

mod handshake;
mod mine;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
    #[command(about = "Connect, subscribe and authorize, then exit")]
    Handshake(handshake::Handshake),
    #[command(about = "Run the CPU miner against a stratum pool")]
    Mine(mine::Mine),
}

impl Subcommand {
    pub(crate) fn run(self) -> Result {
        let runtime = Runtime::new()?;

        let cancel_token = CancellationToken::new();

        runtime.spawn({
            let cancel_token = cancel_token.clone();
            async move {
                let _ = ctrl_c().await;
                info!("Received shutdown signal, stopping...");
                cancel_token.cancel();
            }
        });

        match self {
            Self::Handshake(handshake) => runtime.block_on(handshake.run(cancel_token)),
            Self::Mine(mine) => runtime.block_on(mine.run(cancel_token)),
        }
    }
}
