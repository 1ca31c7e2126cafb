//! The `attrs`, `cmd` and `dummy` entry points

use fe2o3_amqp::session::SessionHandle;
use serde::Serialize;
use tracing::info;

use crate::{
    cli::Command,
    command::{CommandExecutor, ReplyRoute},
    config::{ConnectionConfig, Settings},
    consumer::{self, Consumer, Disposition},
    endpoint::Endpoint,
    error::Result,
    payload::Payload,
    producer,
};

/// Runs one command to completion
pub async fn run(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Attrs => {
            let payload = Payload::random_attrs(&mut rand::thread_rng());
            send(settings, &payload).await?;
            info!("sent attributes successfully");
        }
        Command::Cmd => {
            let disposition = cmd(settings).await?;
            info!(?disposition, "processed cmd");
        }
        Command::Dummy => {
            send(settings, &Payload::dummy()).await?;
            info!("sent dummy data successfully");
        }
    }
    Ok(())
}

/// Produces `payload` on the send queue, over the shared connection if there is one
pub async fn send<P>(settings: &Settings, payload: &P) -> Result<()>
where
    P: Serialize + Sync + ?Sized,
{
    match settings.shared_connection() {
        Some(config) => send_shared(&config, &settings.send_queue, payload).await,
        None => producer::produce(&settings.sender_connection(), &settings.send_queue, payload).await,
    }
}

async fn send_shared<P>(config: &ConnectionConfig, queue: &str, payload: &P) -> Result<()>
where
    P: Serialize + Sync + ?Sized,
{
    let mut endpoint = Endpoint::open(config).await?;
    let sent = producer::send_on(endpoint.session_mut(), queue, payload).await;
    let closed = endpoint.close().await;
    sent?;
    closed
}

/// Waits for one command on the receive queue and replies on the send queue
pub async fn cmd(settings: &Settings) -> Result<Disposition> {
    match settings.shared_connection() {
        Some(config) => cmd_shared(&config, settings).await,
        None => {
            let route = ReplyRoute::Connect(settings.sender_connection());
            let mut executor = CommandExecutor::new(route, settings.send_queue.clone());
            consumer::consume(
                &settings.receiver_connection(),
                &settings.receive_queue,
                &mut executor,
            )
            .await
        }
    }
}

async fn cmd_shared(config: &ConnectionConfig, settings: &Settings) -> Result<Disposition> {
    let mut endpoint = Endpoint::open(config).await?;
    let consumed = reply_on_session(endpoint.session_mut(), settings).await;
    let closed = endpoint.close().await;
    let disposition = consumed?;
    closed?;
    Ok(disposition)
}

/// Receives the command and sends its result over the same session
async fn reply_on_session(
    session: &mut SessionHandle<()>,
    settings: &Settings,
) -> Result<Disposition> {
    let mut consumer = Consumer::attach(&mut *session, settings.receive_queue.clone()).await?;
    let route = ReplyRoute::Session(session);
    let mut executor = CommandExecutor::new(route, settings.send_queue.clone());
    let consumed = consumer.consume_one(&mut executor).await;
    let closed = consumer.close().await;
    let disposition = consumed?;
    closed?;
    Ok(disposition)
}
