use crate::config::LoggingConfig;
use crate::logger::types::{DecisionLogEntry, DecisionLogSink};
use tracing::info;

pub struct ConsoleLogSink {
    config: LoggingConfig,
}

impl ConsoleLogSink {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }
}

impl DecisionLogSink for ConsoleLogSink {
    fn log(&self, entry: &DecisionLogEntry) {
        if !self.config.log_decisions {
            return;
        }

        if self.config.format == "json" {
            info!(
                target: "routing_decision",
                client = %entry.client_ip,
                host = %entry.host,
                url = ?entry.url,
                method = %entry.method,
                transport = %entry.transport,
                generation = entry.generation,
                lat_us = entry.latency_us
            );
        } else {
            info!(
                "{} {} -> {} ({}) [gen {}, {}us]",
                entry.client_ip,
                entry.host,
                entry.method,
                entry.transport,
                entry.generation,
                entry.latency_us
            );
        }
    }
}
