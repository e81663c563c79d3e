use super::policy::{
    DomainList, MethodTable, PolicyConfiguration, RoutingMethod, TopLevelDomainTable, Transport,
};
use crate::error::ConfigError;

/// Collects policy fragments and validates them into a [`PolicyConfiguration`].
///
/// Host lists may be supplied in several calls (e.g. a central list followed
/// by a local one); entries keep the order they were supplied in.
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    methods: Vec<(String, String, Option<String>)>,
    direct: Vec<String>,
    blocked: Vec<String>,
    top_level: Vec<String>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a method name to a protocol (`direct` or `socks5`) and address.
    ///
    /// Names and protocols are checked in [`build`](Self::build).
    pub fn method(
        mut self,
        name: impl Into<String>,
        protocol: impl Into<String>,
        address: Option<String>,
    ) -> Self {
        self.methods.push((name.into(), protocol.into(), address));
        self
    }

    pub fn direct_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.direct
            .extend(hosts.into_iter().map(|h| h.as_ref().to_string()));
        self
    }

    pub fn blocked_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blocked
            .extend(hosts.into_iter().map(|h| h.as_ref().to_string()));
        self
    }

    pub fn top_level_domains<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.top_level
            .extend(labels.into_iter().map(|l| l.as_ref().to_string()));
        self
    }

    pub fn build(&self) -> Result<PolicyConfiguration, ConfigError> {
        let mut blocked_transport = Transport::Direct;
        let mut default_transport = Transport::Direct;

        for (name, protocol, address) in &self.methods {
            let method: RoutingMethod = name.parse()?;
            let transport = Transport::from_protocol(name, protocol, address.as_deref())?;
            match method {
                RoutingMethod::Direct if transport != Transport::Direct => {
                    return Err(ConfigError::DirectNotDirect(transport.to_string()));
                }
                RoutingMethod::Direct => {}
                RoutingMethod::Blocked => blocked_transport = transport,
                RoutingMethod::Default => default_transport = transport,
            }
        }

        let mut direct = DomainList::new();
        // Bare host names match the empty pattern.
        direct.insert("");
        fill_list(&mut direct, "direct", &self.direct)?;

        let mut blocked = DomainList::new();
        fill_list(&mut blocked, "blocked", &self.blocked)?;

        let mut top_level = TopLevelDomainTable::new();
        for label in &self.top_level {
            let label = label.trim().to_ascii_lowercase();
            if label.is_empty() || !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
            {
                return Err(ConfigError::InvalidTopLevel(label));
            }
            top_level.insert(label);
        }

        Ok(PolicyConfiguration {
            methods: MethodTable::new(blocked_transport, default_transport),
            direct,
            blocked,
            top_level,
        })
    }
}

/// Normalizes a raw list line. Blank lines and `#` comments yield `None`.
///
/// Only ASCII letters are folded, matching host normalization in the
/// classifier and the PAC runtime.
pub fn normalize_pattern(raw: &str) -> Option<String> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.to_ascii_lowercase())
}

fn fill_list(list: &mut DomainList, name: &'static str, raw: &[String]) -> Result<(), ConfigError> {
    for entry in raw {
        let Some(pattern) = normalize_pattern(entry) else {
            continue;
        };
        if !is_valid_pattern(&pattern) {
            return Err(ConfigError::InvalidPattern {
                list: name,
                pattern,
            });
        }
        list.insert(&pattern);
    }
    Ok(())
}

pub(crate) fn is_valid_pattern(pattern: &str) -> bool {
    !pattern
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | ':' | '"' | '\\'))
}
