//! seshet - state and persistence core of a modular IRC bot.
//!
//! The wire protocol lives elsewhere; this crate takes decoded
//! [`Event`](seshet_proto::Event)s and:
//! - records each one through the [`logging`] sink (redb or text files),
//! - keeps the users/channels membership graph in [`state`],
//! - gives every module its own persistent key space in [`store`].
//!
//! [`bot::Bot`] ties the three together; [`bot::BotHandle`] runs a bot on
//! its own task for concurrent callers.

pub mod bot;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod state;
pub mod store;
pub mod telemetry;

pub use bot::{Bot, BotHandle};
pub use config::Config;
pub use error::{HandlerError, HandlerResult};
pub use seshet_proto::{Event, EventKind, IrcStr};
