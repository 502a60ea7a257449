//! Event log configuration.

use serde::Deserialize;
use seshet_proto::EventKind;
use std::collections::HashMap;

use super::defaults::{default_log_file, default_templates};

/// Event log configuration.
///
/// Only consulted by the formatted-text sink; with a `[database]` section
/// every event goes to the structured log instead.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Destination path template. May embed any line placeholder, usually
    /// `{target}` and `{date}` to split logs per channel and day.
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Line template per event kind (`message`, `join`, ...). Kinds without
    /// a template are not written.
    #[serde(default = "default_template_map")]
    pub templates: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            templates: default_template_map(),
        }
    }
}

impl LoggingConfig {
    /// The line template for `kind`, if one is configured.
    pub fn template_for(&self, kind: EventKind) -> Option<&str> {
        self.templates
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(kind.as_str()))
            .map(|(_, template)| template.as_str())
    }
}

fn default_template_map() -> HashMap<String, String> {
    default_templates()
        .into_iter()
        .map(|(kind, template)| (kind.to_string(), template.to_string()))
        .collect()
}
