//! Errors of the dummy client

use fe2o3_amqp::{
    connection::{self, OpenError},
    link::{
        DetachError, DispositionError, ReceiverAttachError, RecvError, SendError,
        SenderAttachError,
    },
    session::{self, BeginError},
    types::messaging::Outcome,
};

/// Errors that can occur while configuring the client or talking to the broker
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An environment variable holds a value that cannot be used
    #[error("Invalid value {value:?} for {key}")]
    InvalidEnv {
        /// Name of the environment variable
        key: &'static str,
        /// The offending value
        value: String,
    },

    /// The broker url could not be built
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// Error opening the connection
    #[error(transparent)]
    Open(#[from] OpenError),

    /// Error beginning the session
    #[error(transparent)]
    Begin(#[from] BeginError),

    /// Error attaching the sender link
    #[error(transparent)]
    SenderAttach(#[from] SenderAttachError),

    /// Error attaching the receiver link
    #[error(transparent)]
    ReceiverAttach(#[from] ReceiverAttachError),

    /// Error sending a message
    #[error(transparent)]
    Send(#[from] SendError),

    /// Error receiving a message
    #[error(transparent)]
    Recv(#[from] RecvError),

    /// Error settling a delivery
    #[error(transparent)]
    Disposition(#[from] DispositionError),

    /// Error closing a link
    #[error(transparent)]
    Detach(#[from] DetachError),

    /// Error ending the session
    #[error(transparent)]
    SessionEnd(#[from] session::Error),

    /// Error closing the connection
    #[error(transparent)]
    ConnectionClose(#[from] connection::Error),

    /// The broker settled the delivery with something other than `Accepted`
    #[error("Delivery was not accepted {:?}", .0)]
    NotAccepted(Outcome),

    /// The message body is neither a string value nor UTF-8 data sections
    #[error("Unsupported message body: {0}")]
    UnsupportedBody(String),

    /// The payload is not valid JSON or does not have the expected shape
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The `cmd` object does not name a command
    #[error("Malformed command: {0}")]
    MalformedCommand(String),
}

/// A type alias for the result of the dummy client
pub type Result<T> = std::result::Result<T, Error>;
