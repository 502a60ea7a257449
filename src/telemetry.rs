//! Tracing setup and span helpers.

use crate::config::DebugConfig;
use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `debug.verbosity` when set. Output goes to stderr,
/// or is appended to `debug.file` without colors. Calling this more than
/// once is harmless; later calls are ignored.
pub fn init_tracing(debug: &DebugConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&debug.verbosity))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let _ = match &debug.file {
        Some(path) => {
            if let Some(parent) = std::path::Path::new(path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.try_init(),
    };
    Ok(())
}

/// Guard that traces how long one event took to handle.
pub struct EventTimer {
    kind: &'static str,
    start: Instant,
}

impl EventTimer {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }
}

impl Drop for EventTimer {
    fn drop(&mut self) {
        let micros = self.start.elapsed().as_micros() as u64;
        tracing::trace!(kind = self.kind, micros, "Event handled");
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, debug_span};

    /// Create a span for handling one event.
    pub fn event(kind: &str, source: &str, target: &str) -> Span {
        if target.is_empty() {
            debug_span!("event", kind = %kind, source = %source)
        } else {
            debug_span!("event", kind = %kind, source = %source, target = %target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let debug = |verbosity: &str| DebugConfig {
            verbosity: verbosity.to_string(),
            file: None,
        };
        init_tracing(&debug("debug")).unwrap();
        init_tracing(&debug("not a filter [[")).unwrap();
    }

    #[test]
    fn test_debug_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug/seshet-debug.log");
        let debug = DebugConfig {
            verbosity: "info".to_string(),
            file: Some(path.display().to_string()),
        };
        init_tracing(&debug).unwrap();
        assert!(path.exists());
    }
}
