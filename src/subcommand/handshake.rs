use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Handshake {
    #[arg(help = "Stratum <HOST:PORT>.")]
    endpoint: String,
    #[arg(long, help = "Stratum <USERNAME>.")]
    user: String,
    #[arg(long, help = "Stratum <PASSWORD>.")]
    password: Option<String>,
    #[arg(long, default_value_t = 10.0, help = "Socket read/write <TIMEOUT> in seconds.")]
    timeout: f64,
}

impl Handshake {
    pub(crate) async fn run(self, cancel_token: CancellationToken) -> Result {
        ensure!(self.timeout > 0.0, "timeout must be > 0");

        let client = Client::new(ClientConfig {
            address: self.endpoint.clone(),
            username: self.user,
            password: self.password,
            user_agent: USER_AGENT.into(),
            timeout: Duration::from_secs_f64(self.timeout),
        });

        let subscribe = tokio::select! {
            _ = cancel_token.cancelled() => bail!("cancelled"),
            result = async {
                client.connect().await?;
                let subscribe = client.subscribe().await?;
                client.authorize().await?;
                Ok::<SubscribeResult, ClientError>(subscribe)
            } => result.map_err(|err| anyhow!("{}: {err}", self.endpoint))?,
        };

        client.disconnect().await;

        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "endpoint": self.endpoint,
                "authorized": true,
                "extranonce1": subscribe.extranonce1.to_hex(),
                "extranonce2_size": subscribe.extranonce2_size,
            }))?
        );

        Ok(())
    }
}
