//! Initialization helpers for the application startup.

use crate::config::{Config, LoggingConfig};
use crate::engine::{PolicyConfiguration, PolicyHandle, PolicyManager};
use crate::logger::{DecisionLogSink, LogBuffer, MemoryLogSink};
use crate::stats::StatsCollector;
use tracing::{error, info};

/// Sets up the tracing subscriber with the configured filters.
///
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn setup_logging(config: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = config.level.clone();

        // Keep HTTP client internals quiet unless asked for
        for noisy in ["hyper", "reqwest"] {
            if !filter.contains(noisy) {
                filter.push_str(&format!(",{noisy}=warn"));
            }
        }

        tracing_subscriber::EnvFilter::new(filter)
    });

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

/// Creates the in-memory decision sink when `memory` is among the configured sinks.
///
/// Returns the sinks to hand to the `DecisionLogger` and the buffer the API reads.
pub fn init_memory_sink(config: &Config) -> (Vec<Box<dyn DecisionLogSink>>, Option<LogBuffer>) {
    let wants_memory = config
        .logging
        .decision_log_sinks
        .iter()
        .any(|s| s == "memory");

    if !wants_memory {
        return (Vec::new(), None);
    }

    info!(
        "Memory decision sink enabled (capacity {}).",
        config.logging.memory_capacity
    );
    let sink = MemoryLogSink::new(config.logging.memory_capacity);
    let buffer = sink.clone_buffer();
    (vec![Box::new(sink)], Some(buffer))
}

/// Runs the first refresh. A failure leaves the degenerate default policy
/// in place so routing keeps working.
pub async fn init_policy(manager: &dyn PolicyManager, stats: &StatsCollector) -> PolicyHandle {
    match manager.refresh().await {
        Ok(policy) => {
            stats.inc_refreshes();
            let handle = PolicyHandle::default();
            handle.publish(policy);
            handle
        }
        Err(e) => {
            stats.inc_refresh_failures();
            error!(
                "Initial policy refresh failed, starting with the default policy: {}",
                e
            );
            PolicyHandle::new(PolicyConfiguration::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RoutingMethod, StandardManager};

    #[test]
    fn test_memory_sink_only_when_configured() {
        let config = Config::default();
        let (sinks, buffer) = init_memory_sink(&config);
        assert!(sinks.is_empty());
        assert!(buffer.is_none());

        let mut config = Config::default();
        config.logging.decision_log_sinks = vec!["memory".to_string()];
        let (sinks, buffer) = init_memory_sink(&config);
        assert_eq!(sinks.len(), 1);
        assert!(buffer.is_some());
    }

    #[tokio::test]
    async fn test_init_policy_falls_back_on_error() {
        let stats = StatsCollector::new();
        let mut config = Config::default();
        config
            .sources
            .blocked
            .insert("gone".to_string(), "/nonexistent/list.txt".to_string());

        let handle = init_policy(&StandardManager::new(config), &stats).await;
        let snap = handle.load();
        assert_eq!(snap.generation, 0);
        assert_eq!(snap.policy, PolicyConfiguration::default());
        assert_eq!(stats.get_snapshot().refresh_failures, 1);

        let handle = init_policy(&StandardManager::new(Config::default()), &stats).await;
        let snap = handle.load();
        assert_eq!(snap.generation, 1);
        assert_eq!(snap.policy.classify("alkasir.com"), RoutingMethod::Blocked);
        assert_eq!(stats.get_snapshot().refreshes, 1);
    }
}
