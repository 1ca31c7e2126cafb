//! JSON payloads exchanged with the broker

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Lower bound of the simulated temperature
pub const MIN_TEMPERATURE: f64 = 20.0;

/// Upper bound (exclusive) of the simulated temperature
pub const MAX_TEMPERATURE: f64 = 35.0;

const DUMMY: &str = "dummy";

/// Measured attributes of the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// Temperature in degrees Celsius
    pub temperature: f64,
}

/// A message produced by the client
///
/// Serializes as a single-key object, eg. `{"attrs": {"temperature": 27.5}}`,
/// `{"cmdexe": {"ping": "processed hello"}}` or `{"dummy": "dummy"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    /// Device attributes
    Attrs(Attributes),

    /// Results of executed commands, keyed by command name
    CmdExe(Map<String, Value>),

    /// Placeholder data
    Dummy(String),
}

impl Payload {
    /// Attributes with a temperature drawn uniformly from `[MIN_TEMPERATURE, MAX_TEMPERATURE)`
    pub fn random_attrs<R: Rng>(rng: &mut R) -> Self {
        Self::Attrs(Attributes {
            temperature: rng.gen_range(MIN_TEMPERATURE..MAX_TEMPERATURE),
        })
    }

    /// The result of the command `name`
    pub fn cmd_exe(name: impl Into<String>, result: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(name.into(), Value::String(result.into()));
        Self::CmdExe(map)
    }

    /// `{"dummy": "dummy"}`
    pub fn dummy() -> Self {
        Self::Dummy(String::from(DUMMY))
    }
}

/// A command sent to the device, `{"cmd": {"<name>": <value>}}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandMessage {
    /// Commands keyed by name, in document order
    pub cmd: Map<String, Value>,
}

impl CommandMessage {
    /// Interprets an already parsed JSON message as a command
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Into::into)
    }

    /// The first command in document order
    pub fn first(&self) -> Result<(&str, &Value)> {
        self.cmd
            .iter()
            .next()
            .map(|(name, value)| (name.as_str(), value))
            .ok_or_else(|| Error::MalformedCommand(String::from("cmd object is empty")))
    }

    /// Executes the first command and returns the `cmdexe` reply
    pub fn execute(&self) -> Result<Payload> {
        let (name, value) = self.first()?;
        let arg = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(Payload::cmd_exe(name, format!("processed {}", arg)))
    }
}
