use crate::engine::RoutingMethod;
use serde::Serialize;

/// One classification served to a caller.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionLogEntry {
    pub client_ip: String,
    pub host: String,
    pub url: Option<String>,
    pub method: RoutingMethod,
    pub transport: String,
    pub generation: u64,
    pub latency_us: u64,
}

pub trait DecisionLogSink: Send + Sync {
    fn log(&self, entry: &DecisionLogEntry);
}
