//! Per-bot event pipeline.
//!
//! A [`Bot`] owns one [`Session`], one [`EventLogger`], a
//! [`RuntimeStorage`] and, when a database is configured, the namespace
//! [`Store`]. Events go through [`Bot::handle`]: logged first, then applied
//! to the session. For concurrent callers wrap the bot in a [`BotHandle`].

mod actor;
mod storage;

pub use actor::{BotCommand, BotHandle, EVENT_QUEUE_SIZE};
pub use storage::RuntimeStorage;

use crate::config::{self, Config, ConfigError};
use crate::db;
use crate::error::{HandlerError, HandlerResult};
use crate::logging::EventLogger;
use crate::state::Session;
use crate::store::{NamespaceHandle, Store};
use crate::telemetry::{EventTimer, spans};
use seshet_proto::{Event, EventKind};
use tracing::info;

#[derive(Debug)]
pub struct Bot {
    session: Session,
    logger: EventLogger,
    store: Option<Store>,
    storage: RuntimeStorage,
}

impl Bot {
    pub fn new(session: Session, logger: EventLogger, store: Option<Store>) -> Self {
        Self {
            session,
            logger,
            store,
            storage: RuntimeStorage::new(),
        }
    }

    /// Validate `config`, open the configured database (if any) and build
    /// every component.
    pub fn from_config(config: &Config) -> HandlerResult<Self> {
        config::validate(config).map_err(ConfigError::Invalid)?;

        let db = config
            .database
            .as_ref()
            .map(|d| db::open(&d.path))
            .transpose()?;
        let logger = EventLogger::from_config(config, db.clone())?;
        let store = db.map(Store::new).transpose()?;

        info!(
            nickname = %config.client.nickname,
            sink = %logger.sink_kind(),
            store = store.is_some(),
            "Bot initialized"
        );
        Ok(Self::new(Session::from_config(config), logger, store))
    }

    /// Log `event`, then apply it to the session.
    ///
    /// A logging failure aborts before the session is touched.
    pub fn handle(&mut self, event: &Event) -> HandlerResult {
        let span = spans::event(event.kind.as_str(), event.source.as_str(), event.target.as_str());
        let _enter = span.enter();
        let _timer = EventTimer::new(event.kind.as_str());

        self.log(event)?;
        self.session.apply(event);
        Ok(())
    }

    /// Quits and nick changes carry no channel; they are logged once per
    /// channel the user shares with the bot, all in one batch.
    fn log(&self, event: &Event) -> HandlerResult {
        let own_nick = self.session.nickname();

        let channels = match event.kind {
            EventKind::Quit | EventKind::Nick => self.session.channels_of(event.source.clone()),
            _ => Vec::new(),
        };
        if channels.is_empty() {
            self.logger.log(event, own_nick)?;
            return Ok(());
        }

        let scoped: Vec<Event> = channels
            .into_iter()
            .map(|channel| Event {
                target: channel,
                ..event.clone()
            })
            .collect();
        self.logger.log_all(&scoped, own_nick)?;
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn logger(&self) -> &EventLogger {
        &self.logger
    }

    pub fn store(&self) -> Option<&Store> {
        self.store.as_ref()
    }

    pub fn storage(&self) -> &RuntimeStorage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut RuntimeStorage {
        &mut self.storage
    }

    /// Namespace handle for a module.
    pub fn namespace(&self, name: &str) -> HandlerResult<NamespaceHandle> {
        let store = self.store.as_ref().ok_or(HandlerError::NoDatabase)?;
        Ok(store.namespace(name)?)
    }
}
