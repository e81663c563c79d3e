use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use crate::engine::TopLevelDomainTable;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// Method name → transport. Unknown names are rejected when the policy is built.
    #[serde(default)]
    pub methods: BTreeMap<String, MethodConfig>,

    #[serde(default = "default_top_level_domains")]
    pub top_level_domains: Vec<String>,

    #[serde(default)]
    pub direct_hosts: Vec<String>,

    #[serde(default)]
    pub blocked_hosts: Vec<String>,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub updates: UpdateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MethodConfig {
    pub protocol: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Named host-list sources. Values are file paths or http(s) URLs.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub direct: HashMap<String, String>,
    #[serde(default)]
    pub blocked: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UpdateConfig {
    #[serde(default = "default_update_interval")]
    pub interval_hours: u64,
    #[serde(default = "default_concurrent_downloads")]
    pub concurrent_downloads: usize,
}

impl UpdateConfig {
    /// Time between scheduled refreshes, clamped to one hour ..= one year.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.clamp(1, 24 * 365) * 3600)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_decisions")]
    pub log_decisions: bool,
    #[serde(default = "default_decision_log_sinks")]
    pub decision_log_sinks: Vec<String>,
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enable")]
    pub enable: bool,
    #[serde(default = "default_log_interval")]
    pub log_interval_seconds: u64,
}

// Defaults
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8088
}
fn default_top_level_domains() -> Vec<String> {
    TopLevelDomainTable::STANDARD
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_update_interval() -> u64 {
    24
}
fn default_concurrent_downloads() -> usize {
    4
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_log_decisions() -> bool {
    true
}
fn default_decision_log_sinks() -> Vec<String> {
    vec!["console".to_string()]
}
fn default_memory_capacity() -> usize {
    100
}
fn default_stats_enable() -> bool {
    true
}
fn default_log_interval() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            methods: BTreeMap::new(),
            top_level_domains: default_top_level_domains(),
            direct_hosts: vec![],
            blocked_hosts: vec![],
            sources: SourcesConfig::default(),
            updates: UpdateConfig::default(),
            logging: LoggingConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_update_interval(),
            concurrent_downloads: default_concurrent_downloads(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_decisions: default_log_decisions(),
            decision_log_sinks: default_decision_log_sinks(),
            memory_capacity: default_memory_capacity(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enable: default_stats_enable(),
            log_interval_seconds: default_log_interval(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config TOML")
    }

    /// Direct-list sources ordered by name.
    pub fn direct_sources_sorted(&self) -> Vec<(String, String)> {
        sorted(&self.sources.direct)
    }

    /// Blocked-list sources ordered by name.
    pub fn blocked_sources_sorted(&self) -> Vec<(String, String)> {
        sorted(&self.sources.blocked)
    }
}

fn sorted(map: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut list: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    list.sort_by(|a, b| a.0.cmp(&b.0));
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.port, 8088);
        assert!(config.blocked_hosts.is_empty());
        assert_eq!(config.top_level_domains.len(), 8);
        assert!(config.methods.is_empty());
        assert_eq!(config.logging.decision_log_sinks, vec!["console"]);
        assert_eq!(config.updates.concurrent_downloads, 4);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            port = 9000
            direct_hosts = ["taobao.com"]
            blocked_hosts = []
            top_level_domains = ["com"]

            [methods.blocked]
            protocol = "socks5"
            address = "127.0.0.1:4488"

            [methods.default]
            protocol = "direct"

            [sources.blocked]
            zz-local = "hostlists/local-blocked.txt"
            central = "https://example.org/blocked.txt"

            [updates]
            interval_hours = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.direct_hosts, vec!["taobao.com"]);
        assert!(config.blocked_hosts.is_empty());
        assert_eq!(
            config.methods.get("blocked"),
            Some(&MethodConfig {
                protocol: "socks5".to_string(),
                address: Some("127.0.0.1:4488".to_string()),
            })
        );
        assert_eq!(config.methods["default"].address, None);
        assert_eq!(
            config
                .blocked_sources_sorted()
                .into_iter()
                .map(|(name, _)| name)
                .collect::<Vec<_>>(),
            vec!["central", "zz-local"]
        );
        assert_eq!(config.updates.interval_hours, 6);
        assert_eq!(config.updates.concurrent_downloads, 4);
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        assert!(Config::parse("port = \"eighty\"").is_err());
    }

    #[test]
    fn test_update_interval() {
        let mut updates = UpdateConfig::default();
        assert_eq!(updates.interval(), Duration::from_secs(24 * 3600));

        updates.interval_hours = 0;
        assert_eq!(updates.interval(), Duration::from_secs(3600));

        updates.interval_hours = u64::MAX;
        assert_eq!(updates.interval(), Duration::from_secs(24 * 365 * 3600));
    }
}
