//! A connection with a single session on top of it

use fe2o3_amqp::{connection::ConnectionHandle, session::SessionHandle, Connection, Session};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{config::ConnectionConfig, error::Result};

/// Prefix of the container id announced to the broker
pub const CONTAINER_ID_PREFIX: &str = "dummy-client";

/// An open connection and the session every link of the client lives on
pub struct Endpoint {
    connection: ConnectionHandle<()>,
    session: SessionHandle<()>,
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint").finish_non_exhaustive()
    }
}

impl Endpoint {
    /// Connects to the broker and begins a session
    #[instrument(skip_all, fields(host = %config.host, port = config.port, tls = config.use_tls))]
    pub async fn open(config: &ConnectionConfig) -> Result<Self> {
        let url = config.url()?;
        let container_id = unique_name(CONTAINER_ID_PREFIX);

        let mut connection = Connection::builder()
            .container_id(container_id)
            .sasl_profile(config.credentials.sasl_profile())
            .open(url.as_str())
            .await?;
        debug!("connection opened");

        let session = match Session::begin(&mut connection).await {
            Ok(session) => session,
            Err(err) => {
                let _ = connection.close().await;
                return Err(err.into());
            }
        };
        debug!("session begun");

        Ok(Self {
            connection,
            session,
        })
    }

    /// The session links are attached to
    pub fn session_mut(&mut self) -> &mut SessionHandle<()> {
        &mut self.session
    }

    /// Ends the session and closes the connection
    ///
    /// The connection is closed even if ending the session fails; the first
    /// error is returned.
    pub async fn close(mut self) -> Result<()> {
        let ended = self.session.end().await;
        let closed = self.connection.close().await;
        debug!("endpoint closed");
        ended?;
        closed?;
        Ok(())
    }
}

/// `prefix` followed by a random v4 uuid, used for container ids and link names
pub(crate) fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}
