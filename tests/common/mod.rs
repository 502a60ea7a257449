//! Integration test common infrastructure.
//!
//! Builds bots and configs backed by temporary directories so tests never
//! touch the working tree.

#![allow(dead_code)]

use seshet::config::Config;
use seshet::{Bot, Event};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A bot plus the temp directory holding its files.
pub struct TestBot {
    pub bot: Bot,
    pub dir: TempDir,
}

impl TestBot {
    /// Bot writing text logs into a temp directory with the given
    /// `[logging.templates]` body.
    pub fn text(templates: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = text_config(dir.path(), templates);
        let bot = Bot::from_config(&config).expect("Failed to build bot");
        Self { bot, dir }
    }

    /// Bot with an on-disk redb database in a temp directory.
    pub fn structured() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = structured_config(dir.path());
        let bot = Bot::from_config(&config).expect("Failed to build bot");
        Self { bot, dir }
    }

    pub fn feed(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.bot.handle(&event).expect("Event handling failed");
        }
    }

    pub fn read_log(&self, file: &str) -> String {
        std::fs::read_to_string(self.dir.path().join("logs").join(file))
            .unwrap_or_else(|e| panic!("Failed to read log {file}: {e}"))
    }
}

pub fn text_config(dir: &Path, templates: &str) -> Config {
    let file = dir.join("logs").join("{target}.log");
    let toml = format!(
        "[client]\nnickname = 'Seshet'\n\n[logging]\nfile = '{}'\n\n[logging.templates]\n{}\n",
        file.display(),
        templates
    );
    Config::from_toml(&toml).expect("Invalid test config")
}

pub fn structured_config(dir: &Path) -> Config {
    let toml = format!(
        "[client]\nnickname = 'Seshet'\n\n[database]\npath = '{}'\n",
        db_path(dir).display()
    );
    Config::from_toml(&toml).expect("Invalid test config")
}

pub fn db_path(dir: &Path) -> PathBuf {
    dir.join("data").join("seshet.db")
}

/// The bot joining `channel` and receiving its names reply.
pub fn self_join(channel: &str, names: &[&str]) -> Vec<Event> {
    vec![
        Event::join("Seshet", channel),
        Event::names("irc.example.org", channel, names.iter().copied()),
    ]
}
