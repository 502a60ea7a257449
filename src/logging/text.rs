//! Formatted-text event log.

use super::template::{Clock, Template, Values, is_valid_time_format};
use super::{EventSink, LogError, SinkKind};
use crate::config::Config;
use seshet_proto::{Event, EventKind, IrcStr, irc_to_lower};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Writes one templated line per event to a templated path.
///
/// Event kinds without a template are dropped silently.
#[derive(Debug, Clone)]
pub struct TextSink {
    path: Template,
    templates: HashMap<EventKind, Template>,
    clock: Clock,
}

impl TextSink {
    pub fn new(config: &Config) -> Result<Self, LogError> {
        let locale = &config.locale;
        let offset = locale
            .offset()
            .ok_or_else(|| LogError::InvalidOffset(locale.utc_offset.clone()))?;
        for (field, value) in locale.formats() {
            if !is_valid_time_format(value) {
                return Err(LogError::InvalidFormat {
                    field,
                    value: value.to_string(),
                });
            }
        }

        let mut templates = HashMap::new();
        for (name, source) in &config.logging.templates {
            match name.parse::<EventKind>() {
                Ok(kind) => {
                    templates.insert(kind, Template::parse(source));
                }
                Err(e) => warn!(error = %e, "Ignoring log template"),
            }
        }

        Ok(Self {
            path: Template::parse(&config.logging.file),
            templates,
            clock: Clock::new(
                offset,
                &locale.date_fmt,
                &locale.time_fmt,
                &locale.short_datetime_fmt,
                &locale.long_datetime_fmt,
            ),
        })
    }

    /// The log line for `event`, newline included, or `None` if its kind
    /// has no template.
    pub fn render(&self, event: &Event, own_nick: &IrcStr) -> Option<String> {
        let template = self.templates.get(&event.kind)?;
        let target = display_target(event, own_nick);
        let mut line = template.render(&self.values(event, target));
        line.push('\n');
        Some(line)
    }

    /// The file `event` is written to.
    pub fn path_for(&self, event: &Event, own_nick: &IrcStr) -> PathBuf {
        let target = irc_to_lower(display_target(event, own_nick)).replace('/', "_");
        PathBuf::from(self.path.render(&self.values(event, &target)))
    }

    fn values<'a>(&self, event: &'a Event, target: &'a str) -> Values<'a> {
        let stamps = self.clock.stamps(event.time);
        Values {
            time: stamps.time,
            date: stamps.date,
            datetime_s: stamps.datetime_s,
            datetime_l: stamps.datetime_l,
            source: event.source.as_str(),
            target,
            msg: &event.message,
            hostmask: &event.hostmask,
            params: event.params.join(" "),
        }
    }
}

/// Private messages to the bot are shown under the sender's name.
fn display_target<'a>(event: &'a Event, own_nick: &IrcStr) -> &'a str {
    let private = matches!(event.kind, EventKind::Message | EventKind::Action)
        && event.target == *own_nick;
    if private {
        event.source.as_str()
    } else {
        event.target.as_str()
    }
}

impl EventSink for TextSink {
    /// Every line is rendered and every directory created before the first
    /// write, so a bad path fails the batch with nothing written.
    fn append_all(&self, events: &[Event], own_nick: &IrcStr) -> Result<(), LogError> {
        let mut batch: Vec<(PathBuf, String)> = Vec::new();
        for event in events {
            let Some(line) = self.render(event, own_nick) else {
                debug!(kind = %event.kind, "No template, event not written");
                continue;
            };
            let path = self.path_for(event, own_nick);
            match batch.iter_mut().find(|(p, _)| *p == path) {
                Some((_, lines)) => lines.push_str(&line),
                None => batch.push((path, line)),
            }
        }

        for (path, _) in &batch {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut files = batch
            .iter()
            .map(|(path, lines)| {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok((file, lines))
            })
            .collect::<Result<Vec<_>, std::io::Error>>()?;

        for (file, lines) in &mut files {
            file.write_all(lines.as_bytes())?;
        }
        Ok(())
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Text
    }
}
