use {
    super::*,
    actor::{ClientActor, ClientMessage},
};

mod actor;
mod error;

pub use error::ClientError;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub address: String,
    pub username: String,
    pub password: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected { reason: String },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted)
    }
}

pub struct EventReceiver(broadcast::Receiver<Event>);

impl EventReceiver {
    pub async fn recv(&mut self) -> Result<Event, ClientError> {
        self.0.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Lagged(count) => ClientError::EventsLagged { count },
            broadcast::error::RecvError::Closed => ClientError::EventChannelClosed,
        })
    }
}

/// Handle to the connection actor. The actor owns the socket, so every
/// outbound frame goes through one writer and replies are correlated to
/// waiters by id while notifications fan out on the event channel.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    tx: mpsc::Sender<ClientMessage>,
    events: broadcast::Sender<Event>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        let config = Arc::new(config);
        let (tx, rx) = mpsc::channel(32);
        let (events, _) = broadcast::channel(32);

        task::spawn(ClientActor::new(config.clone(), rx, events.clone()).run());

        Self { config, tx, events }
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    pub async fn connect(&self) -> Result<EventReceiver, ClientError> {
        // Subscribe before connecting so no notification can slip between
        // the socket opening and the caller listening.
        let receiver = EventReceiver(self.events.subscribe());

        let (respond_to, rx) = oneshot::channel();
        self.tx
            .send(ClientMessage::Connect { respond_to })
            .await
            .map_err(|_| ClientError::NotConnected)?;

        rx.await.context(error::ChannelRecvSnafu)??;

        Ok(receiver)
    }

    pub async fn disconnect(&self) {
        let (respond_to, rx) = oneshot::channel();
        if self
            .tx
            .send(ClientMessage::Disconnect { respond_to })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }

    async fn send_request(
        &self,
        method: &str,
        params: Value,
    ) -> Result<oneshot::Receiver<Result<Message, ClientError>>, ClientError> {
        let (respond_to, rx) = oneshot::channel();

        self.tx
            .send(ClientMessage::Request {
                method: method.to_string(),
                params,
                respond_to,
            })
            .await
            .map_err(|_| ClientError::NotConnected)?;

        Ok(rx)
    }

    async fn request(&self, method: &str, params: Value) -> Result<Message, ClientError> {
        let rx = self.send_request(method, params).await?;

        tokio::time::timeout(self.config.timeout, rx)
            .await
            .context(error::TimeoutSnafu)?
            .context(error::ChannelRecvSnafu)?
    }

    pub async fn subscribe(&self) -> Result<SubscribeResult, ClientError> {
        let params = serde_json::to_value(Subscribe {
            user_agent: self.config.user_agent.clone(),
        })
        .context(error::SerializationSnafu)?;

        let message = self.request("mining.subscribe", params).await?;

        let result = match message {
            Message::Response {
                result: Some(result),
                error: None,
                ..
            } => serde_json::from_value::<SubscribeResult>(result).map_err(|e| {
                ClientError::Protocol {
                    message: format!("bad mining.subscribe result: {e}"),
                }
            })?,
            Message::Response {
                error: Some(err), ..
            } => {
                return Err(ClientError::Protocol {
                    message: format!("mining.subscribe error: {err}"),
                });
            }
            _ => {
                return Err(ClientError::Protocol {
                    message: "mining.subscribe reply missing result".into(),
                });
            }
        };

        if !(1..=8).contains(&result.extranonce2_size) {
            return Err(ClientError::Protocol {
                message: format!(
                    "extranonce2 size {} outside [1, 8]",
                    result.extranonce2_size
                ),
            });
        }

        Ok(result)
    }

    pub async fn authorize(&self) -> Result<(), ClientError> {
        let params = serde_json::to_value(Authorize {
            username: self.config.username.clone(),
            password: Some(self.config.password.clone().unwrap_or_else(|| "x".into())),
        })
        .context(error::SerializationSnafu)?;

        let message = self.request("mining.authorize", params).await?;

        match message {
            Message::Response {
                result: Some(Value::Bool(true)),
                error: None,
                ..
            } => Ok(()),
            Message::Response {
                error: Some(err), ..
            } => Err(ClientError::Protocol {
                message: format!("mining.authorize error: {err}"),
            }),
            _ => Err(ClientError::Protocol {
                message: "authorize rejected".into(),
            }),
        }
    }

    /// Fire and forget: pools may answer, ignore, or answer much later.
    /// The eventual reply is consumed by the waiter without anyone
    /// blocking on it.
    pub async fn suggest_difficulty(&self, difficulty: f64) -> Result<(), ClientError> {
        let params = serde_json::to_value(SuggestDifficulty(Difficulty::from(difficulty)))
            .context(error::SerializationSnafu)?;

        let rx = self.send_request("mining.suggest_difficulty", params).await?;

        task::spawn(async move {
            if let Ok(Ok(reply)) = rx.await {
                debug!("mining.suggest_difficulty reply: {reply:?}");
            }
        });

        Ok(())
    }

    pub async fn submit(&self, submit: &Submit) -> Result<SubmitOutcome, ClientError> {
        let params = serde_json::to_value(submit).context(error::SerializationSnafu)?;

        let message = self.request("mining.submit", params).await?;

        match message {
            Message::Response {
                result: Some(Value::Bool(true)),
                error: None,
                ..
            } => Ok(SubmitOutcome::Accepted),
            Message::Response {
                error: Some(err), ..
            } => Ok(SubmitOutcome::Rejected {
                reason: err.to_string(),
            }),
            Message::Response {
                result: Some(Value::Bool(false)),
                reject_reason,
                ..
            } => Ok(SubmitOutcome::Rejected {
                reason: reject_reason.unwrap_or_else(|| "share rejected".into()),
            }),
            _ => Ok(SubmitOutcome::Rejected {
                reason: "non-boolean submit result".into(),
            }),
        }
    }
}
