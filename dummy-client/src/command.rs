//! Executes received commands and produces their results

use async_trait::async_trait;
use fe2o3_amqp::session::SessionHandle;
use tracing::info;

use crate::{
    config::ConnectionConfig,
    consumer::HandleMessage,
    error::Result,
    payload::{CommandMessage, Payload},
    producer,
};

/// Where the `cmdexe` reply is sent through
pub enum ReplyRoute<'a> {
    /// A dedicated sender connection, opened per reply
    Connect(ConnectionConfig),

    /// The session the command was received on
    Session(&'a mut SessionHandle<()>),
}

impl std::fmt::Debug for ReplyRoute<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(config) => f.debug_tuple("Connect").field(config).finish(),
            Self::Session(_) => f.write_str("Session"),
        }
    }
}

/// Answers `{"cmd": {name: value}}` with `{"cmdexe": {name: "processed value"}}` on the send queue
#[derive(Debug)]
pub struct CommandExecutor<'a> {
    route: ReplyRoute<'a>,
    send_queue: String,
}

impl<'a> CommandExecutor<'a> {
    /// Replies through `route` to `send_queue`
    pub fn new(route: ReplyRoute<'a>, send_queue: impl Into<String>) -> Self {
        Self {
            route,
            send_queue: send_queue.into(),
        }
    }

    async fn reply(&mut self, payload: &Payload) -> Result<()> {
        match &mut self.route {
            ReplyRoute::Connect(config) => {
                producer::produce(config, &self.send_queue, payload).await
            }
            ReplyRoute::Session(session) => {
                producer::send_on(&mut **session, &self.send_queue, payload).await
            }
        }
    }
}

#[async_trait]
impl HandleMessage for CommandExecutor<'_> {
    async fn handle(&mut self, message: serde_json::Value) -> Result<()> {
        let command = CommandMessage::from_value(message)?;
        let reply = command.execute()?;
        info!(queue = %self.send_queue, "replying to command");
        self.reply(&reply).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{CommandExecutor, ReplyRoute};
    use crate::{
        config::Settings,
        consumer::{process, Disposition},
    };

    #[tokio::test]
    async fn malformed_command_is_released_before_replying() {
        // Port 1 is never reached because the command is rejected first
        let mut settings = Settings::default();
        settings.port = 1;
        let mut executor =
            CommandExecutor::new(ReplyRoute::Connect(settings.sender_connection()), "examples");

        let text = json!({"cmd": {}}).to_string();
        assert_eq!(process(&mut executor, &text).await, Disposition::Release);

        let text = json!({"attrs": {"temperature": 20.0}}).to_string();
        assert_eq!(process(&mut executor, &text).await, Disposition::Release);
    }
}
