use super::*;

/// One connection's lifetime: handshake, then an event loop that publishes
/// jobs and difficulty to the scanner and plays submit replies back into
/// the counters. Returns Ok on a requested stop and Err when the
/// connection died and the caller should decide about reconnecting.
pub(crate) struct Controller;

impl Controller {
    pub(crate) async fn run(
        config: &MinerConfig,
        metrics: Arc<Metrics>,
        cancel: CancellationToken,
        deadline: Option<Instant>,
    ) -> Result<(), ClientError> {
        let client = Client::new(ClientConfig {
            address: config.endpoint.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            user_agent: USER_AGENT.into(),
            timeout: config.timeout,
        });

        let mut events = client.connect().await?;

        let subscribe = client.subscribe().await?;
        client.authorize().await?;

        info!(
            "Authorized: extranonce1={} extranonce2_size={}",
            subscribe.extranonce1, subscribe.extranonce2_size
        );

        if let Some(difficulty) = config.suggest_difficulty {
            client.suggest_difficulty(difficulty).await?;
        }

        let (job_tx, job_rx) = watch::channel(None);
        let difficulty = Arc::new(Mutex::new(None));
        let (share_tx, mut share_rx) = mpsc::channel(16);

        let scanner = Scanner::new(
            config,
            subscribe.extranonce1,
            subscribe.extranonce2_size,
            job_rx,
            difficulty.clone(),
            metrics.clone(),
            share_tx,
            cancel.clone(),
            deadline,
        );
        let scanner_handle = task::spawn(scanner.run());

        let result = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    break Ok(());
                },
                event = events.recv() => match event {
                    Ok(Event::Notify(notify)) => {
                        metrics.record_job();
                        if notify.clean_jobs {
                            debug!("clean_jobs set, abandoning prior work");
                        }
                        info!("New job: job_id={}", notify.job_id);
                        job_tx.send_replace(Some(Job::new(notify)));
                    }
                    Ok(Event::SetDifficulty(new_difficulty)) => {
                        *difficulty.lock().await = Some(new_difficulty);
                        metrics.set_difficulty(new_difficulty);
                        info!("Updated pool difficulty: {new_difficulty}");
                    }
                    Ok(Event::Disconnected) => {
                        break Err(ClientError::NotConnected);
                    }
                    Err(ClientError::EventsLagged { count }) => {
                        warn!("Event loop lagged, missed {count} messages");
                    }
                    Err(err) => break Err(err),
                },
                maybe = share_rx.recv() => match maybe {
                    Some(candidate) => {
                        match Self::submit(config, &client, &metrics, candidate).await {
                            Ok(accepted) => {
                                if let Some(max_shares) = config.max_shares
                                    && accepted >= max_shares
                                {
                                    metrics.stop(StopReason::MaxShares);
                                    cancel.cancel();
                                    break Ok(());
                                }
                            }
                            Err(err) => break Err(err),
                        }
                    }
                    None => break Ok(()),
                },
            }
        };

        drop(share_rx);
        drop(job_tx);
        let _ = scanner_handle.await;
        client.disconnect().await;

        result
    }

    /// Transmits one share and folds the pool's verdict into the
    /// counters, returning the accepted total so far.
    async fn submit(
        config: &MinerConfig,
        client: &Client,
        metrics: &Metrics,
        candidate: ShareCandidate,
    ) -> Result<u64, ClientError> {
        let submit = Submit {
            username: config.username.clone(),
            job_id: candidate.job_id.clone(),
            extranonce2: candidate.extranonce2,
            ntime: candidate.ntime,
            nonce: candidate.nonce,
        };

        metrics.record_submitted();

        match client.submit(&submit).await? {
            SubmitOutcome::Accepted => {
                let accepted = metrics.record_accepted();
                info!("Share accepted for job {}", candidate.job_id);
                Ok(accepted)
            }
            SubmitOutcome::Rejected { reason } => {
                metrics.record_rejected();
                warn!(
                    "Share rejected for job {} by {}: {reason}",
                    candidate.job_id, config.endpoint
                );
                Ok(metrics.accepted())
            }
        }
    }
}
