//! Receives a single message from the receive queue and settles it
//!
//! Deliveries are settled manually. A message whose handler returns an error
//! is released so the broker can hand it out again; anything else is accepted.

use async_trait::async_trait;
use fe2o3_amqp::{
    session::SessionHandle,
    types::{messaging::message::Body, primitives::Value},
    Delivery, Receiver,
};
use tracing::{debug, error, info, instrument};

use crate::{
    body::body_text,
    config::ConnectionConfig,
    endpoint::{unique_name, Endpoint},
    error::Result,
};

const RECEIVER_LINK_PREFIX: &str = "dummy-client-receiver";

/// Processes a decoded JSON message
#[async_trait]
pub trait HandleMessage {
    /// An `Err` releases the delivery, `Ok` accepts it
    async fn handle(&mut self, message: serde_json::Value) -> Result<()>;
}

#[async_trait]
impl<F> HandleMessage for F
where
    F: FnMut(serde_json::Value) -> Result<()> + Send,
{
    async fn handle(&mut self, message: serde_json::Value) -> Result<()> {
        (self)(message)
    }
}

/// How a delivery is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The message was processed
    Accept,

    /// Processing failed, the broker may redeliver the message
    Release,
}

impl<T, E> From<&std::result::Result<T, E>> for Disposition {
    fn from(result: &std::result::Result<T, E>) -> Self {
        match result {
            Ok(_) => Disposition::Accept,
            Err(_) => Disposition::Release,
        }
    }
}

/// Parses `text` as JSON and hands it to `handler`
pub async fn process<H>(handler: &mut H, text: &str) -> Disposition
where
    H: HandleMessage + Send + ?Sized,
{
    let result = match serde_json::from_str(text) {
        Ok(message) => handler.handle(message).await,
        Err(err) => Err(err.into()),
    };

    let disposition = Disposition::from(&result);
    match result {
        Ok(()) => info!("consumed message successfully"),
        Err(err) => error!("consumed message error {}", err),
    }
    disposition
}

/// A receiver link with manual acknowledgement attached to one queue
pub struct Consumer {
    queue: String,
    receiver: Receiver,
}

impl std::fmt::Debug for Consumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl Consumer {
    /// Attaches a receiver link with `queue` as its source
    pub async fn attach<R>(session: &mut SessionHandle<R>, queue: impl Into<String>) -> Result<Self> {
        let queue = queue.into();
        let receiver = Receiver::builder()
            .name(unique_name(RECEIVER_LINK_PREFIX))
            .source(queue.clone())
            .auto_accept(false)
            .attach(session)
            .await?;
        debug!(queue = %queue, "receiver attached");
        Ok(Self { queue, receiver })
    }

    /// Waits for one delivery, processes it and settles it
    pub async fn consume_one<H>(&mut self, handler: &mut H) -> Result<Disposition>
    where
        H: HandleMessage + Send + ?Sized,
    {
        let delivery: Delivery<Body<Value>> = self.receiver.recv().await?;

        let disposition = match body_text(delivery.body()) {
            Ok(text) => {
                info!("consuming message {}", text);
                process(handler, &text).await
            }
            Err(err) => {
                error!("consumed message error {}", err);
                Disposition::Release
            }
        };

        match disposition {
            Disposition::Accept => self.receiver.accept(&delivery).await?,
            Disposition::Release => self.receiver.release(&delivery).await?,
        }
        Ok(disposition)
    }

    /// Detaches the link with closing semantics
    pub async fn close(self) -> Result<()> {
        self.receiver.close().await?;
        Ok(())
    }
}

/// Processes one message on a session that is already open
///
/// The link is closed whatever the outcome of processing.
pub async fn consume_on<R, H>(
    session: &mut SessionHandle<R>,
    queue: &str,
    handler: &mut H,
) -> Result<Disposition>
where
    H: HandleMessage + Send + ?Sized,
{
    let mut consumer = Consumer::attach(session, queue).await?;
    let consumed = consumer.consume_one(handler).await;
    let closed = consumer.close().await;
    let disposition = consumed?;
    closed?;
    Ok(disposition)
}

/// Opens a connection, processes one message from `queue` and shuts everything down
#[instrument(skip_all, fields(queue = %queue))]
pub async fn consume<H>(config: &ConnectionConfig, queue: &str, handler: &mut H) -> Result<Disposition>
where
    H: HandleMessage + Send + ?Sized,
{
    let mut endpoint = Endpoint::open(config).await?;
    let consumed = consume_on(endpoint.session_mut(), queue, handler).await;
    let closed = endpoint.close().await;
    let disposition = consumed?;
    closed?;
    Ok(disposition)
}
