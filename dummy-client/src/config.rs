//! Environment-driven configuration
//!
//! Every setting has a default so the client runs against a local broker with
//! no environment at all.

use fe2o3_amqp::sasl_profile::SaslProfile;
use tracing::Level;
use url::Url;

use crate::error::{Error, Result};

/// Username that selects the SASL ANONYMOUS mechanism
pub const ANONYMOUS: &str = "ANONYMOUS";

/// Default address of both the send and the receive queue
pub const DEFAULT_QUEUE: &str = "examples";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5672;

const AMQP_HOST: &str = "AMQP_HOST";
const AMQP_PORT: &str = "AMQP_PORT";
const AMQP_USE_TLS: &str = "AMQP_USE_TLS";
const AMQP_SENDER_USERNAME: &str = "AMQP_SENDER_USERNAME";
const AMQP_SENDER_PASSWORD: &str = "AMQP_SENDER_PASSWORD";
const AMQP_RECEIVER_USERNAME: &str = "AMQP_RECEIVER_USERNAME";
const AMQP_RECEIVER_PASSWORD: &str = "AMQP_RECEIVER_PASSWORD";
const AMQP_SEND_QUEUE: &str = "AMQP_SEND_QUEUE";
const AMQP_RECEIVE_QUEUE: &str = "AMQP_RECEIVE_QUEUE";
const AMQP_SHARE_CONNECTION: &str = "AMQP_SHARE_CONNECTION";
const AMQP_USERNAME: &str = "AMQP_USERNAME";
const AMQP_PASSWORD: &str = "AMQP_PASSWORD";
const AMQP_LOG_LEVEL: &str = "AMQP_LOG_LEVEL";

/// Username and password of one side of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// SASL username
    pub username: String,

    /// SASL password, may be empty
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: String::from(ANONYMOUS),
            password: String::new(),
        }
    }
}

impl Credentials {
    /// `ANONYMOUS` without a password maps to SASL ANONYMOUS, anything else to SASL PLAIN
    pub fn sasl_profile(&self) -> SaslProfile {
        if self.username == ANONYMOUS && self.password.is_empty() {
            SaslProfile::Anonymous
        } else {
            SaslProfile::Plain {
                username: self.username.clone(),
                password: self.password.clone(),
            }
        }
    }
}

/// Everything needed to open one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Broker host
    pub host: String,

    /// Broker port
    pub port: u16,

    /// Use `amqps` instead of `amqp`
    pub use_tls: bool,

    /// Credentials presented during SASL negotiation
    pub credentials: Credentials,
}

impl ConnectionConfig {
    /// `amqps` if TLS is enabled, `amqp` otherwise
    pub fn scheme(&self) -> &'static str {
        match self.use_tls {
            true => "amqps",
            false => "amqp",
        }
    }

    /// The broker url. Credentials are never part of it, they go into the SASL profile.
    pub fn url(&self) -> Result<Url> {
        let url = Url::parse(&format!("{}://{}:{}", self.scheme(), self.host, self.port))?;
        Ok(url)
    }
}

/// The whole client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Broker host
    pub host: String,

    /// Broker port
    pub port: u16,

    /// Use `amqps` instead of `amqp`
    pub use_tls: bool,

    /// Credentials of the producing side
    pub sender: Credentials,

    /// Credentials of the consuming side
    pub receiver: Credentials,

    /// Credentials of the single connection used by every link, if sharing is enabled
    pub shared: Option<Credentials>,

    /// Target address of the producer
    pub send_queue: String,

    /// Source address of the consumer
    pub receive_queue: String,

    /// Max level of the log output
    pub log_level: Level,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            use_tls: false,
            sender: Credentials::default(),
            receiver: Credentials::default(),
            shared: None,
            send_queue: String::from(DEFAULT_QUEUE),
            receive_queue: String::from(DEFAULT_QUEUE),
            log_level: Level::INFO,
        }
    }
}

impl Settings {
    /// Reads the settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`, which returns `None` for unset variables
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let credentials = |username_key: &str, password_key: &str| Credentials {
            username: var(username_key, ANONYMOUS),
            password: var(password_key, ""),
        };

        let port = match lookup(AMQP_PORT) {
            Some(value) => value.trim().parse().map_err(|_| Error::InvalidEnv {
                key: AMQP_PORT,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let log_level = match lookup(AMQP_LOG_LEVEL) {
            Some(value) => value.trim().parse().map_err(|_| Error::InvalidEnv {
                key: AMQP_LOG_LEVEL,
                value,
            })?,
            None => Level::INFO,
        };

        let shared = is_true(lookup(AMQP_SHARE_CONNECTION))
            .then(|| credentials(AMQP_USERNAME, AMQP_PASSWORD));

        Ok(Self {
            host: var(AMQP_HOST, DEFAULT_HOST),
            port,
            use_tls: is_true(lookup(AMQP_USE_TLS)),
            sender: credentials(AMQP_SENDER_USERNAME, AMQP_SENDER_PASSWORD),
            receiver: credentials(AMQP_RECEIVER_USERNAME, AMQP_RECEIVER_PASSWORD),
            shared,
            send_queue: var(AMQP_SEND_QUEUE, DEFAULT_QUEUE),
            receive_queue: var(AMQP_RECEIVE_QUEUE, DEFAULT_QUEUE),
            log_level,
        })
    }

    /// Connection used by the producer
    pub fn sender_connection(&self) -> ConnectionConfig {
        self.connection(&self.sender)
    }

    /// Connection used by the consumer
    pub fn receiver_connection(&self) -> ConnectionConfig {
        self.connection(&self.receiver)
    }

    /// Connection shared by every link, `None` unless `AMQP_SHARE_CONNECTION` is set
    pub fn shared_connection(&self) -> Option<ConnectionConfig> {
        self.shared.as_ref().map(|creds| self.connection(creds))
    }

    fn connection(&self, credentials: &Credentials) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            use_tls: self.use_tls,
            credentials: credentials.clone(),
        }
    }
}

fn is_true(value: Option<String>) -> bool {
    value
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use fe2o3_amqp::sasl_profile::SaslProfile;
    use tracing::Level;

    use super::{Credentials, Settings};
    use crate::error::Error;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings, Error> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, 5672);
        assert!(!settings.use_tls);
        assert_eq!(settings.send_queue, "examples");
        assert_eq!(settings.receive_queue, "examples");
        assert!(settings.shared_connection().is_none());
    }

    #[test]
    fn overrides_are_read() {
        let settings = settings_from(&[
            ("AMQP_HOST", "broker.example.com"),
            ("AMQP_PORT", "5671"),
            ("AMQP_USE_TLS", "True"),
            ("AMQP_SENDER_USERNAME", "device"),
            ("AMQP_SENDER_PASSWORD", "secret"),
            ("AMQP_RECEIVER_USERNAME", "reader"),
            ("AMQP_SEND_QUEUE", "attrs"),
            ("AMQP_RECEIVE_QUEUE", "cmd"),
            ("AMQP_LOG_LEVEL", "debug"),
        ])
        .unwrap();

        assert_eq!(settings.host, "broker.example.com");
        assert_eq!(settings.port, 5671);
        assert!(settings.use_tls);
        assert_eq!(
            settings.sender,
            Credentials {
                username: "device".into(),
                password: "secret".into()
            }
        );
        assert_eq!(settings.receiver.username, "reader");
        assert_eq!(settings.receiver.password, "");
        assert_eq!(settings.send_queue, "attrs");
        assert_eq!(settings.receive_queue, "cmd");
        assert_eq!(settings.log_level, Level::DEBUG);
    }

    #[test]
    fn tls_flag_only_accepts_true() {
        for value in ["1", "yes", "on", "false", ""] {
            let settings = settings_from(&[("AMQP_USE_TLS", value)]).unwrap();
            assert!(!settings.use_tls, "{value:?} must not enable tls");
        }
        let settings = settings_from(&[("AMQP_USE_TLS", "TRUE")]).unwrap();
        assert!(settings.use_tls);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = settings_from(&[("AMQP_PORT", "amqp")]).unwrap_err();
        match err {
            Error::InvalidEnv { key, value } => {
                assert_eq!(key, "AMQP_PORT");
                assert_eq!(value, "amqp");
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert!(settings_from(&[("AMQP_PORT", "70000")]).is_err());
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let settings = settings_from(&[
            ("AMQP_HOST", ""),
            ("AMQP_PORT", ""),
            ("AMQP_SENDER_USERNAME", ""),
            ("AMQP_RECEIVE_QUEUE", ""),
            ("AMQP_LOG_LEVEL", ""),
        ])
        .unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.sender_connection().url().unwrap().as_str(),
            "amqp://localhost:5672"
        );
        assert!(matches!(
            settings.sender.sasl_profile(),
            SaslProfile::Anonymous
        ));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        assert!(matches!(
            settings_from(&[("AMQP_LOG_LEVEL", "loud")]),
            Err(Error::InvalidEnv {
                key: "AMQP_LOG_LEVEL",
                ..
            })
        ));
    }

    #[test]
    fn url_follows_tls_flag() {
        let settings = settings_from(&[("AMQP_HOST", "broker"), ("AMQP_PORT", "5671")]).unwrap();
        let url = settings.sender_connection().url().unwrap();
        assert_eq!(url.as_str(), "amqp://broker:5671");

        let settings = settings_from(&[("AMQP_USE_TLS", "true")]).unwrap();
        let url = settings.receiver_connection().url().unwrap();
        assert_eq!(url.scheme(), "amqps");
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(5672));
    }

    #[test]
    fn invalid_host_fails_url() {
        let settings = settings_from(&[("AMQP_HOST", "bad host")]).unwrap();
        assert!(matches!(
            settings.sender_connection().url(),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn anonymous_without_password_selects_anonymous_mechanism() {
        let profile = Credentials::default().sasl_profile();
        assert!(matches!(profile, SaslProfile::Anonymous));

        let creds = Credentials {
            username: "ANONYMOUS".into(),
            password: "pw".into(),
        };
        assert!(matches!(creds.sasl_profile(), SaslProfile::Plain { .. }));

        let creds = Credentials {
            username: "guest".into(),
            password: "guest".into(),
        };
        match creds.sasl_profile() {
            SaslProfile::Plain { username, password } => {
                assert_eq!(username, "guest");
                assert_eq!(password, "guest");
            }
            _ => panic!("expected PLAIN"),
        }
    }

    #[test]
    fn shared_connection_uses_shared_credentials() {
        let settings = settings_from(&[
            ("AMQP_SHARE_CONNECTION", "true"),
            ("AMQP_USERNAME", "shared"),
            ("AMQP_PASSWORD", "pw"),
            ("AMQP_SENDER_USERNAME", "device"),
        ])
        .unwrap();

        let shared = settings.shared_connection().unwrap();
        assert_eq!(shared.credentials.username, "shared");
        assert_eq!(shared.credentials.password, "pw");
        assert_eq!(settings.sender_connection().credentials.username, "device");
    }
}
