use crate::error::ConfigError;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The three-way routing verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMethod {
    Direct,
    Blocked,
    Default,
}

impl RoutingMethod {
    pub const ALL: [RoutingMethod; 3] = [
        RoutingMethod::Direct,
        RoutingMethod::Blocked,
        RoutingMethod::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingMethod::Direct => "direct",
            RoutingMethod::Blocked => "blocked",
            RoutingMethod::Default => "default",
        }
    }
}

impl fmt::Display for RoutingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(RoutingMethod::Direct),
            "blocked" => Ok(RoutingMethod::Blocked),
            "default" => Ok(RoutingMethod::Default),
            other => Err(ConfigError::UnknownMethod(other.to_string())),
        }
    }
}

/// Where a routing method sends the connection, in PAC syntax.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Direct,
    /// SOCKS5 proxy at `host:port`.
    Socks5(String),
}

impl Transport {
    /// Builds a transport from a protocol name and connect string.
    ///
    /// `method` is only used for error reporting.
    pub fn from_protocol(
        method: &str,
        protocol: &str,
        address: Option<&str>,
    ) -> Result<Self, ConfigError> {
        match protocol.to_ascii_lowercase().as_str() {
            "direct" => Ok(Transport::Direct),
            "socks5" => match address.map(str::trim) {
                Some(addr) if !addr.is_empty() && !addr.contains(char::is_whitespace) => {
                    Ok(Transport::Socks5(addr.to_string()))
                }
                _ => Err(ConfigError::MissingAddress(method.to_string())),
            },
            _ => Err(ConfigError::UnsupportedProtocol {
                method: method.to_string(),
                protocol: protocol.to_string(),
            }),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Direct => f.write_str("DIRECT"),
            Transport::Socks5(addr) => write!(f, "SOCKS5 {}", addr),
        }
    }
}

/// Method → transport bindings. `direct` is always `DIRECT`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodTable {
    direct: Transport,
    blocked: Transport,
    default: Transport,
}

impl MethodTable {
    pub(crate) fn new(blocked: Transport, default: Transport) -> Self {
        Self {
            direct: Transport::Direct,
            blocked,
            default,
        }
    }

    pub fn transport(&self, method: RoutingMethod) -> &Transport {
        match method {
            RoutingMethod::Direct => &self.direct,
            RoutingMethod::Blocked => &self.blocked,
            RoutingMethod::Default => &self.default,
        }
    }
}

/// An insertion-ordered set of domain suffix patterns.
#[derive(Debug, Clone, Default)]
pub struct DomainList {
    entries: Vec<Box<str>>,
    index: FxHashSet<Box<str>>,
}

impl DomainList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `pattern` unless already present. Returns whether it was added.
    pub(crate) fn insert(&mut self, pattern: &str) -> bool {
        if self.index.contains(pattern) {
            return false;
        }
        let pattern: Box<str> = pattern.into();
        self.index.insert(pattern.clone());
        self.entries.push(pattern);
        true
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.index.contains(pattern)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| &**e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for DomainList {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for DomainList {}

/// Labels treated as top-level domains when computing the registrable suffix.
///
/// Iterates in sorted order so generated artifacts are stable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopLevelDomainTable {
    labels: BTreeSet<String>,
}

impl TopLevelDomainTable {
    pub const STANDARD: [&'static str; 8] = ["ac", "co", "com", "edu", "gov", "net", "org", "se"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        Self {
            labels: Self::STANDARD.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub(crate) fn insert(&mut self, label: String) {
        self.labels.insert(label);
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A complete, immutable routing policy.
///
/// Built by [`PolicyBuilder`](super::PolicyBuilder); the classifier only reads it.
/// `Default` is the degenerate policy: every transport `DIRECT`, only the
/// bare-host sentinel in the direct list, no TLDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfiguration {
    pub(crate) methods: MethodTable,
    pub(crate) direct: DomainList,
    pub(crate) blocked: DomainList,
    pub(crate) top_level: TopLevelDomainTable,
}

impl PolicyConfiguration {
    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn transport(&self, method: RoutingMethod) -> &Transport {
        self.methods.transport(method)
    }

    pub fn direct(&self) -> &DomainList {
        &self.direct
    }

    pub fn blocked(&self) -> &DomainList {
        &self.blocked
    }

    pub fn top_level(&self) -> &TopLevelDomainTable {
        &self.top_level
    }

    /// Classifies `host` against this policy.
    pub fn classify(&self, host: &str) -> RoutingMethod {
        super::classifier::classify(host, self)
    }
}

impl Default for PolicyConfiguration {
    fn default() -> Self {
        let mut direct = DomainList::new();
        direct.insert("");
        Self {
            methods: MethodTable::default(),
            direct,
            blocked: DomainList::new(),
            top_level: TopLevelDomainTable::new(),
        }
    }
}
