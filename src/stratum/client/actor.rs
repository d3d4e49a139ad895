use super::*;

struct ConnectionState {
    writer: BufWriter<tokio::net::tcp::OwnedWriteHalf>,
    reader_handle: task::JoinHandle<()>,
}

enum IncomingMessage {
    Response { id: Id, message: Message },
    Notification { method: String, params: Value },
    Disconnected,
    Error(ClientError),
}

pub(super) enum ClientMessage {
    Connect {
        respond_to: oneshot::Sender<Result<(), ClientError>>,
    },
    Request {
        method: String,
        params: Value,
        respond_to: oneshot::Sender<Result<Message, ClientError>>,
    },
    Disconnect {
        respond_to: oneshot::Sender<()>,
    },
}

pub(super) struct ClientActor {
    config: Arc<ClientConfig>,
    rx: mpsc::Receiver<ClientMessage>,
    events: broadcast::Sender<Event>,
    id_counter: u64,
    pending: BTreeMap<Id, oneshot::Sender<Result<Message, ClientError>>>,
    connection: Option<ConnectionState>,
}

impl ClientActor {
    pub(super) fn new(
        config: Arc<ClientConfig>,
        rx: mpsc::Receiver<ClientMessage>,
        events: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            config,
            rx,
            events,
            id_counter: 0,
            pending: BTreeMap::new(),
            connection: None,
        }
    }

    pub(super) async fn run(mut self) {
        let (incoming_tx, mut incoming_rx) = mpsc::channel::<IncomingMessage>(32);

        loop {
            tokio::select! {
                Some(msg) = self.rx.recv() => {
                    match msg {
                        ClientMessage::Connect { respond_to } => {
                            let result = self.handle_connect(incoming_tx.clone()).await;
                            let _ = respond_to.send(result);
                        }
                        ClientMessage::Request { method, params, respond_to } => {
                            let id = self.next_id();
                            self.pending.insert(id.clone(), respond_to);

                            if let Err(e) = self.handle_request(id.clone(), method, params).await
                                && let Some(tx) = self.pending.remove(&id)
                            {
                                let _ = tx.send(Err(e));
                            }
                        }
                        ClientMessage::Disconnect { respond_to } => {
                            self.handle_disconnect().await;
                            let _ = respond_to.send(());
                        }
                    }
                }
                Some(msg) = incoming_rx.recv() => {
                    self.handle_incoming(msg).await;
                }
                else => {
                    debug!("Client actor shutting down");
                    self.handle_disconnect().await;
                    break;
                }
            }
        }
    }

    fn next_id(&mut self) -> Id {
        self.id_counter += 1;
        Id::Number(self.id_counter)
    }

    async fn handle_connect(
        &mut self,
        incoming_tx: mpsc::Sender<IncomingMessage>,
    ) -> Result<(), ClientError> {
        if self.connection.is_some() {
            self.handle_disconnect().await;
        }

        let stream = tokio::time::timeout(
            self.config.timeout,
            TcpStream::connect(&self.config.address),
        )
        .await
        .context(error::TimeoutSnafu)?
        .context(error::IoSnafu)?;

        let (reader, writer) = stream.into_split();
        let writer = BufWriter::new(writer);

        let reader_handle = task::spawn(async move {
            Self::reader_task(BufReader::new(reader), incoming_tx).await;
        });

        self.connection = Some(ConnectionState {
            writer,
            reader_handle,
        });

        debug!("Connected to {}", self.config.address);
        Ok(())
    }

    async fn handle_request(
        &mut self,
        id: Id,
        method: String,
        params: Value,
    ) -> Result<(), ClientError> {
        let connection = self.connection.as_mut().ok_or(ClientError::NotConnected)?;

        let message = Message::Request { id, method, params };

        let frame = serde_json::to_string(&message).context(error::SerializationSnafu)? + "\n";

        connection
            .writer
            .write_all(frame.as_bytes())
            .await
            .context(error::IoSnafu)?;

        connection.writer.flush().await.context(error::IoSnafu)?;

        Ok(())
    }

    async fn handle_disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.reader_handle.abort();
            debug!("Disconnected");
        }

        let pending = std::mem::take(&mut self.pending);
        for (_, tx) in pending {
            let _ = tx.send(Err(ClientError::NotConnected));
        }

        let _ = self.events.send(Event::Disconnected);
    }

    async fn handle_incoming(&mut self, msg: IncomingMessage) {
        match msg {
            IncomingMessage::Response { id, message } => {
                if let Some(tx) = self.pending.remove(&id) {
                    let _ = tx.send(Ok(message));
                } else {
                    warn!("Unmatched response ID={id}");
                }
            }
            IncomingMessage::Notification { method, params } => match method.as_str() {
                "mining.notify" => match serde_json::from_value::<Notify>(params) {
                    Ok(notify) => {
                        let _ = self.events.send(Event::Notify(notify));
                    }
                    Err(e) => warn!("Failed to parse mining.notify: {e}"),
                },
                "mining.set_difficulty" => match serde_json::from_value::<SetDifficulty>(params) {
                    Ok(set_difficulty) => {
                        let _ = self
                            .events
                            .send(Event::SetDifficulty(set_difficulty.difficulty()));
                    }
                    Err(e) => warn!("Failed to parse mining.set_difficulty: {e}"),
                },
                // Reserved for extranonce rotation, which this client does
                // not perform.
                "mining.set_extranonce" => debug!("Ignoring mining.set_extranonce"),
                _ => debug!("Ignoring notification: {method}"),
            },
            IncomingMessage::Disconnected => {
                self.handle_disconnect().await;
            }
            IncomingMessage::Error(err) => {
                error!("Connection failed: {err}");
                self.handle_disconnect().await;
            }
        }
    }

    async fn reader_task(
        mut reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
        incoming_tx: mpsc::Sender<IncomingMessage>,
    ) {
        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    let _ = incoming_tx.send(IncomingMessage::Disconnected).await;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    let _ = incoming_tx
                        .send(IncomingMessage::Error(ClientError::Io { source: e }))
                        .await;
                    break;
                }
            }

            if !line.ends_with('\n') {
                let _ = incoming_tx
                    .send(IncomingMessage::Error(ClientError::Frame {
                        reason: "EOF before line terminator".into(),
                    }))
                    .await;
                break;
            }

            if line.len() > MAX_LINE_SIZE {
                let _ = incoming_tx
                    .send(IncomingMessage::Error(ClientError::Frame {
                        reason: format!("line of {} bytes exceeds {MAX_LINE_SIZE}", line.len()),
                    }))
                    .await;
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let message: Message = match serde_json::from_str(trimmed) {
                Ok(message) => message,
                Err(e) => {
                    let _ = incoming_tx
                        .send(IncomingMessage::Error(ClientError::Frame {
                            reason: format!("invalid JSON line: {e}"),
                        }))
                        .await;
                    break;
                }
            };

            match message {
                Message::Response {
                    id,
                    result,
                    error,
                    reject_reason,
                } => {
                    let message = Message::Response {
                        id: id.clone(),
                        result,
                        error,
                        reject_reason,
                    };
                    let _ = incoming_tx
                        .send(IncomingMessage::Response { id, message })
                        .await;
                }
                Message::Notification { method, params } => {
                    let _ = incoming_tx
                        .send(IncomingMessage::Notification { method, params })
                        .await;
                }
                Message::Request { method, .. } => {
                    debug!("Ignoring server request: {method}");
                }
            }
        }
    }
}
