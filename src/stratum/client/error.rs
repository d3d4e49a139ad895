use super::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    #[snafu(display("Connection timeout: {source}"))]
    Timeout { source: tokio::time::error::Elapsed },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("Channel receive error: {source}"))]
    ChannelRecv {
        source: tokio::sync::oneshot::error::RecvError,
    },

    #[snafu(display("Serialization error: {source}"))]
    Serialization { source: serde_json::Error },

    #[snafu(display("Framing error: {reason}"))]
    Frame { reason: String },

    #[snafu(display("{message}"))]
    Protocol { message: String },

    #[snafu(display("Not connected"))]
    NotConnected,

    #[snafu(display("Event receiver lagged, missed {count} events"))]
    EventsLagged { count: u64 },

    #[snafu(display("Event channel closed"))]
    EventChannelClosed,
}

impl ClientError {
    /// Transient failures tear the connection down and are retried with
    /// backoff; the rest fail the run.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout { .. }
                | ClientError::Io { .. }
                | ClientError::ChannelRecv { .. }
                | ClientError::Frame { .. }
                | ClientError::NotConnected
                | ClientError::EventsLagged { .. }
                | ClientError::EventChannelClosed
        )
    }
}
