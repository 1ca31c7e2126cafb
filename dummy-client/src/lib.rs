#![deny(missing_docs, missing_debug_implementations)]
#![allow(clippy::result_large_err)]

//! A dummy AMQP 1.0 device client built on `fe2o3-amqp`
//!
//! The client either produces one JSON message (`attrs`, `dummy`) or consumes
//! one command and produces its result (`cmd`). Connection parameters come
//! from `AMQP_*` environment variables, see [`config::Settings`].
//!
//! ```rust,no_run
//! use dummy_client::{config::Settings, payload::Payload, producer};
//!
//! # async fn example() -> Result<(), dummy_client::Error> {
//! let settings = Settings::from_env()?;
//! producer::produce(&settings.sender_connection(), &settings.send_queue, &Payload::dummy()).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod body;
pub mod cli;
pub mod command;
pub mod config;
pub mod consumer;
pub mod endpoint;
pub mod error;
pub mod payload;
pub mod producer;

pub use consumer::{Disposition, HandleMessage};
pub use error::{Error, Result};
