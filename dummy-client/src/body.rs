//! Turns a received AMQP body into the JSON text it carries

use fe2o3_amqp::types::{messaging::message::Body, primitives::Value};

use crate::error::{Error, Result};

/// Extracts the UTF-8 text of a message body
///
/// A string or binary `amqp-value` is taken as is, `data` sections are concatenated.
pub fn body_text(body: &Body<Value>) -> Result<String> {
    match body {
        Body::Value(value) => value_text(&value.0),
        Body::Data(batch) => {
            let bytes: Vec<u8> = batch.iter().flat_map(|data| data.0.iter().copied()).collect();
            utf8(bytes)
        }
        Body::Sequence(_) => Err(Error::UnsupportedBody(String::from("amqp-sequence"))),
        Body::Empty => Err(Error::UnsupportedBody(String::from("empty body"))),
    }
}

fn value_text(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Binary(b) => utf8(b.to_vec()),
        other => Err(Error::UnsupportedBody(format!("{:?}", other))),
    }
}

fn utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|err| Error::UnsupportedBody(err.to_string()))
}
