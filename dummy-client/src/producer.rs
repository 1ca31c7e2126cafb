//! Sends payloads to the send queue

use fe2o3_amqp::{session::SessionHandle, types::messaging::Accepted, Sender};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    config::ConnectionConfig,
    endpoint::{unique_name, Endpoint},
    error::{Error, Result},
};

const SENDER_LINK_PREFIX: &str = "dummy-client-sender";

/// A sender link attached to one queue
pub struct Producer {
    queue: String,
    sender: Sender,
}

impl std::fmt::Debug for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl Producer {
    /// Attaches a sender link targeting `queue`
    pub async fn attach<R>(session: &mut SessionHandle<R>, queue: impl Into<String>) -> Result<Self> {
        let queue = queue.into();
        let sender = Sender::attach(session, unique_name(SENDER_LINK_PREFIX), queue.clone()).await?;
        debug!(queue = %queue, "sender attached");
        Ok(Self { queue, sender })
    }

    /// Sends the payload as a JSON string body and waits for the broker to accept it
    pub async fn send<P>(&mut self, payload: &P) -> Result<Accepted>
    where
        P: Serialize + Sync + ?Sized,
    {
        let msg = serde_json::to_string(payload)?;
        info!("producing message {}", msg);
        let outcome = self.sender.send(msg).await?;
        let accepted = outcome.accepted_or_else(Error::NotAccepted)?;
        info!("produced message successfully");
        Ok(accepted)
    }

    /// Detaches the link with closing semantics
    pub async fn close(self) -> Result<()> {
        self.sender.close().await?;
        Ok(())
    }
}

/// Sends one payload on a session that is already open
///
/// The link is closed even if sending fails.
pub async fn send_on<R, P>(session: &mut SessionHandle<R>, queue: &str, payload: &P) -> Result<()>
where
    P: Serialize + Sync + ?Sized,
{
    let mut producer = Producer::attach(session, queue).await?;
    let sent = producer.send(payload).await;
    let closed = producer.close().await;
    sent?;
    closed
}

/// Opens a connection, sends one payload to `queue` and shuts everything down
#[instrument(skip_all, fields(queue = %queue))]
pub async fn produce<P>(config: &ConnectionConfig, queue: &str, payload: &P) -> Result<()>
where
    P: Serialize + Sync + ?Sized,
{
    let mut endpoint = Endpoint::open(config).await?;
    let sent = send_on(endpoint.session_mut(), queue, payload).await;
    let closed = endpoint.close().await;
    sent?;
    closed
}
