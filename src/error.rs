//! Error types for policy generation and refresh.

use thiserror::Error;

/// Malformed or incomplete policy input.
///
/// Returned before any configuration or artifact is produced, so the
/// previously published policy stays active.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown routing method: {0}")]
    UnknownMethod(String),

    #[error("unsupported protocol {protocol:?} for method {method}")]
    UnsupportedProtocol { method: String, protocol: String },

    #[error("method {0} requires a proxy address")]
    MissingAddress(String),

    #[error("the direct method must use the DIRECT transport, got {0:?}")]
    DirectNotDirect(String),

    #[error("invalid host pattern {pattern:?} in {list} list")]
    InvalidPattern { list: &'static str, pattern: String },

    #[error("invalid top-level domain label {0:?}")]
    InvalidTopLevel(String),
}

/// Failure while rebuilding the policy from its sources.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read host list '{name}' from {path}: {source}")]
    Read {
        name: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch host list '{name}' from {url}: {source}")]
    Fetch {
        name: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("host list '{name}' at {url} returned HTTP {status}")]
    Status {
        name: String,
        url: String,
        status: u16,
    },
}
