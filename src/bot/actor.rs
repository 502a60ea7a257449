//! Actor wrapper for a [`Bot`].
//!
//! The bot runs on its own blocking task and owns all session state.
//! Callers talk to it through a cloneable [`BotHandle`]; every event and
//! every query is a [`BotCommand`] on one queue, so readers never observe a
//! half-applied event.

use super::Bot;
use crate::error::{HandlerError, HandlerResult};
use crate::state::{Channel, Session, User};
use crate::store::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use seshet_proto::{Event, IrcStr};
use std::collections::BTreeSet;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Command queue depth.
pub const EVENT_QUEUE_SIZE: usize = 1024;

/// Commands processed by the bot task.
pub enum BotCommand {
    /// Log and apply one event. `reply_tx` receives the result if present.
    Event {
        event: Box<Event>,
        reply_tx: Option<oneshot::Sender<HandlerResult>>,
    },
    Nickname {
        reply_tx: oneshot::Sender<IrcStr>,
    },
    User {
        nick: IrcStr,
        reply_tx: oneshot::Sender<Option<User>>,
    },
    Channel {
        name: IrcStr,
        reply_tx: oneshot::Sender<Option<Channel>>,
    },
    ChannelsOf {
        nick: IrcStr,
        reply_tx: oneshot::Sender<Vec<IrcStr>>,
    },
    UniqueUsers {
        channel: IrcStr,
        reply_tx: oneshot::Sender<BTreeSet<IrcStr>>,
    },
    /// Clone of the whole session.
    Snapshot {
        reply_tx: oneshot::Sender<Session>,
    },
    StorageGet {
        key: String,
        reply_tx: oneshot::Sender<Option<Value>>,
    },
    /// `null` deletes the key.
    StorageSet {
        key: String,
        value: Value,
        reply_tx: oneshot::Sender<()>,
    },
    StorageDelete {
        key: String,
        reply_tx: oneshot::Sender<Option<Value>>,
    },
    /// Stop the task; pending commands behind this one are dropped.
    Shutdown,
}

/// Cloneable handle to a running bot.
#[derive(Clone)]
pub struct BotHandle {
    tx: mpsc::Sender<BotCommand>,
}

impl BotHandle {
    /// Move `bot` onto a blocking task. The join handle yields the bot back
    /// after shutdown or once every handle is dropped.
    pub fn spawn(bot: Bot) -> (Self, JoinHandle<Bot>) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_SIZE);
        let task = tokio::task::spawn_blocking(move || run(bot, rx));
        (Self { tx }, task)
    }

    /// Handle `event` and wait for the result.
    pub async fn handle(&self, event: Event) -> HandlerResult {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(BotCommand::Event {
            event: Box::new(event),
            reply_tx: Some(reply_tx),
        })
        .await?;
        reply_rx.await.map_err(|_| HandlerError::ActorGone)?
    }

    /// Queue `event` without waiting. Failures are logged by the task.
    pub async fn dispatch(&self, event: Event) -> HandlerResult {
        self.send(BotCommand::Event {
            event: Box::new(event),
            reply_tx: None,
        })
        .await
    }

    pub async fn nickname(&self) -> HandlerResult<IrcStr> {
        self.ask(|reply_tx| BotCommand::Nickname { reply_tx }).await
    }

    pub async fn user(&self, nick: impl Into<IrcStr>) -> HandlerResult<Option<User>> {
        let nick = nick.into();
        self.ask(|reply_tx| BotCommand::User { nick, reply_tx }).await
    }

    pub async fn channel(&self, name: impl Into<IrcStr>) -> HandlerResult<Option<Channel>> {
        let name = name.into();
        self.ask(|reply_tx| BotCommand::Channel { name, reply_tx }).await
    }

    pub async fn channels_of(&self, nick: impl Into<IrcStr>) -> HandlerResult<Vec<IrcStr>> {
        let nick = nick.into();
        self.ask(|reply_tx| BotCommand::ChannelsOf { nick, reply_tx })
            .await
    }

    pub async fn unique_users(
        &self,
        channel: impl Into<IrcStr>,
    ) -> HandlerResult<BTreeSet<IrcStr>> {
        let channel = channel.into();
        self.ask(|reply_tx| BotCommand::UniqueUsers { channel, reply_tx })
            .await
    }

    pub async fn snapshot(&self) -> HandlerResult<Session> {
        self.ask(|reply_tx| BotCommand::Snapshot { reply_tx }).await
    }

    /// Read a runtime storage value.
    pub async fn storage_get<T: DeserializeOwned>(&self, key: &str) -> HandlerResult<Option<T>> {
        let owned = key.to_string();
        let value = self
            .ask(|reply_tx| BotCommand::StorageGet {
                key: owned,
                reply_tx,
            })
            .await?;
        value
            .map(|value| {
                serde_json::from_value(value).map_err(|e| StoreError::Deserialization {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
            .map_err(HandlerError::from)
    }

    pub async fn storage_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> HandlerResult {
        let value = serde_json::to_value(value).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        let key = key.to_string();
        self.ask(|reply_tx| BotCommand::StorageSet {
            key,
            value,
            reply_tx,
        })
        .await
    }

    /// Remove a runtime storage key, returning whether it existed.
    pub async fn storage_delete(&self, key: &str) -> HandlerResult<bool> {
        let key = key.to_string();
        let removed = self
            .ask(|reply_tx| BotCommand::StorageDelete { key, reply_tx })
            .await?;
        Ok(removed.is_some())
    }

    pub async fn shutdown(&self) -> HandlerResult {
        self.send(BotCommand::Shutdown).await
    }

    async fn ask<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> BotCommand,
    ) -> HandlerResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx)).await?;
        reply_rx.await.map_err(|_| HandlerError::ActorGone)
    }

    async fn send(&self, command: BotCommand) -> HandlerResult {
        self.tx
            .send(command)
            .await
            .map_err(|_| HandlerError::ActorGone)
    }
}

/// The task loop. Replies to dropped receivers are ignored.
fn run(mut bot: Bot, mut rx: mpsc::Receiver<BotCommand>) -> Bot {
    while let Some(command) = rx.blocking_recv() {
        match command {
            BotCommand::Event { event, reply_tx } => {
                let result = bot.handle(&event);
                match reply_tx {
                    Some(reply_tx) => {
                        let _ = reply_tx.send(result);
                    }
                    None => {
                        if let Err(e) = result {
                            warn!(error = %e, code = e.error_code(), kind = %event.kind, "Event handling failed");
                        }
                    }
                }
            }
            BotCommand::Nickname { reply_tx } => {
                let _ = reply_tx.send(bot.session().nickname().clone());
            }
            BotCommand::User { nick, reply_tx } => {
                let _ = reply_tx.send(bot.session().user(nick).cloned());
            }
            BotCommand::Channel { name, reply_tx } => {
                let _ = reply_tx.send(bot.session().channel(name).cloned());
            }
            BotCommand::ChannelsOf { nick, reply_tx } => {
                let _ = reply_tx.send(bot.session().channels_of(nick));
            }
            BotCommand::UniqueUsers { channel, reply_tx } => {
                let _ = reply_tx.send(bot.session().unique_users(channel));
            }
            BotCommand::Snapshot { reply_tx } => {
                let _ = reply_tx.send(bot.session().clone());
            }
            BotCommand::StorageGet { key, reply_tx } => {
                let _ = reply_tx.send(bot.storage().get_value(&key).cloned());
            }
            BotCommand::StorageSet {
                key,
                value,
                reply_tx,
            } => {
                bot.storage_mut().set_value(&key, value);
                let _ = reply_tx.send(());
            }
            BotCommand::StorageDelete { key, reply_tx } => {
                let _ = reply_tx.send(bot.storage_mut().delete(&key));
            }
            BotCommand::Shutdown => break,
        }
    }
    debug!("Bot task stopped");
    bot
}
