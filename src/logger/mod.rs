pub mod console_sink;
pub mod memory_sink;
pub mod types;

pub use self::console_sink::ConsoleLogSink;
pub use self::memory_sink::{LogBuffer, MemoryLogSink};
pub use self::types::{DecisionLogEntry, DecisionLogSink};

use crate::config::LoggingConfig;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Fans decisions out to the configured sinks, each on its own task.
pub struct DecisionLogger {
    sinks: Vec<mpsc::Sender<DecisionLogEntry>>,
}

impl DecisionLogger {
    /// Builds the named sinks from `config` plus any `extra_sinks`.
    ///
    /// `memory` is not built here; the caller creates it so it can keep the buffer.
    pub fn new(config: LoggingConfig, extra_sinks: Vec<Box<dyn DecisionLogSink>>) -> Arc<Self> {
        let mut sinks = Vec::new();

        for sink_type in &config.decision_log_sinks {
            match sink_type.as_str() {
                "console" => {
                    sinks.push(Self::spawn_sink(Box::new(ConsoleLogSink::new(config.clone()))))
                }
                "memory" => {}
                other => warn!("Unknown decision log sink type: {}", other),
            }
        }

        for sink in extra_sinks {
            sinks.push(Self::spawn_sink(sink));
        }

        Arc::new(Self { sinks })
    }

    fn spawn_sink(sink: Box<dyn DecisionLogSink>) -> mpsc::Sender<DecisionLogEntry> {
        let (tx, mut rx) = mpsc::channel::<DecisionLogEntry>(1000);
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                sink.log(&entry);
            }
        });
        tx
    }

    pub fn log(&self, entry: DecisionLogEntry) {
        let Some((last, rest)) = self.sinks.split_last() else {
            return;
        };
        // Fire and forget, don't block caller if buffer full
        for sink in rest {
            let _ = sink.try_send(entry.clone());
        }
        let _ = last.try_send(entry);
    }
}
