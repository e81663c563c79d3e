use super::generator::{is_valid_pattern, normalize_pattern, PolicyBuilder};
use super::policy::PolicyConfiguration;
use super::traits::PolicyManager;
use crate::config::Config;
use crate::error::RefreshError;
use futures::{stream, StreamExt};
use reqwest::Client;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::io::StreamReader;
use tracing::{error, info, warn};
use url::Url;

/// Hosts that are always routed through the blocked method.
pub const ALWAYS_BLOCKED: &[&str] = &["alkasir.com"];

/// Builds policies from the inline lists in [`Config`] plus its named
/// file/URL sources.
///
/// Inline entries must be valid or the refresh fails. Unusable lines in
/// sources are skipped with a warning.
pub struct StandardManager {
    config: Config,
    client: Client,
}

impl StandardManager {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::builder()
                .user_agent(concat!("pac-router/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Everything that does not need I/O: methods, TLDs and inline hosts.
    pub fn base_builder(&self) -> PolicyBuilder {
        let mut builder = PolicyBuilder::new()
            .top_level_domains(&self.config.top_level_domains)
            .direct_hosts(&self.config.direct_hosts)
            .blocked_hosts(ALWAYS_BLOCKED)
            .blocked_hosts(&self.config.blocked_hosts);
        for (name, method) in &self.config.methods {
            builder = builder.method(name, &method.protocol, method.address.clone());
        }
        builder
    }

    fn parse_line(name: &str, line_no: usize, raw: &str) -> Option<String> {
        let pattern = normalize_pattern(raw)?;
        if !is_valid_pattern(&pattern) {
            warn!(
                "Skipping unusable entry {:?} in host list '{}' (line {})",
                raw.trim(),
                name,
                line_no
            );
            return None;
        }
        Some(pattern)
    }

    fn parse_list_content(name: &str, text: &str) -> Vec<String> {
        text.lines()
            .enumerate()
            .filter_map(|(idx, line)| Self::parse_line(name, idx + 1, line))
            .collect()
    }

    fn is_remote(location: &str) -> bool {
        Url::parse(location)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    async fn read_source(
        client: &Client,
        name: String,
        location: String,
    ) -> Result<Vec<String>, RefreshError> {
        let entries = if Self::is_remote(&location) {
            info!("Fetching host list '{}' from {}", name, location);
            Self::fetch_remote(client, &name, &location).await?
        } else {
            info!("Reading host list '{}' from {}", name, location);
            let text = tokio::fs::read_to_string(&location).await.map_err(|source| {
                RefreshError::Read {
                    name: name.clone(),
                    path: location.clone(),
                    source,
                }
            })?;
            Self::parse_list_content(&name, &text)
        };

        info!("Parsed {} entries from '{}'", entries.len(), name);
        Ok(entries)
    }

    async fn fetch_remote(
        client: &Client,
        name: &str,
        url: &str,
    ) -> Result<Vec<String>, RefreshError> {
        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|source| RefreshError::Fetch {
                name: name.to_string(),
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RefreshError::Status {
                name: name.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let stream = resp
            .bytes_stream()
            .map(|result| result.map_err(std::io::Error::other));
        let reader = StreamReader::new(stream);
        let mut lines = BufReader::new(reader).lines();
        let mut entries = Vec::new();
        let mut line_no = 0;

        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|source| RefreshError::Read {
                    name: name.to_string(),
                    path: url.to_string(),
                    source,
                })?;
            let Some(line) = line else {
                break;
            };
            line_no += 1;
            if let Some(host) = Self::parse_line(name, line_no, &line) {
                entries.push(host);
            }
        }

        Ok(entries)
    }

    /// Reads `sources` concurrently. Results come back in source order.
    async fn load_sources(
        &self,
        sources: Vec<(String, String)>,
    ) -> Result<Vec<Vec<String>>, RefreshError> {
        let tasks = sources.into_iter().map(|(name, location)| {
            let client = self.client.clone();
            async move { Self::read_source(&client, name, location).await }
        });

        let results: Vec<Result<Vec<String>, RefreshError>> = stream::iter(tasks)
            .buffered(self.config.updates.concurrent_downloads.max(1))
            .collect()
            .await;

        results.into_iter().collect()
    }
}

#[async_trait::async_trait]
impl PolicyManager for StandardManager {
    async fn refresh(&self) -> Result<PolicyConfiguration, RefreshError> {
        info!("Refreshing routing policy...");

        let loaded = async {
            let direct = self.load_sources(self.config.direct_sources_sorted()).await?;
            let blocked = self.load_sources(self.config.blocked_sources_sorted()).await?;
            Ok::<_, RefreshError>((direct, blocked))
        }
        .await;

        let (direct, blocked) = match loaded {
            Ok(lists) => lists,
            Err(e) => {
                error!("Policy refresh failed: {}", e);
                return Err(e);
            }
        };

        let mut builder = self.base_builder();
        for list in direct {
            builder = builder.direct_hosts(list);
        }
        for list in blocked {
            builder = builder.blocked_hosts(list);
        }

        let policy = builder.build().inspect_err(|e| {
            error!("Rejected routing policy: {}", e);
        })?;

        info!(
            "Policy refresh complete. Direct patterns: {}, blocked patterns: {}",
            policy.direct().len(),
            policy.blocked().len()
        );
        Ok(policy)
    }
}
