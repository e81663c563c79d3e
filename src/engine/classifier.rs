//! Host → routing method decision.
//!
//! Evaluation order, first match wins:
//! 1. private IPv4 literal → `direct`
//! 2. other IPv4 literal → verbatim list lookup, else `default`
//! 3. host name → suffix walk down to the registrable suffix, `direct` list
//!    before `blocked` list
//! 4. `default`
//!
//! Every input string yields a verdict; nothing here can fail.

use super::ip::{is_private_range, parse_ipv4_literal};
use super::policy::{DomainList, PolicyConfiguration, RoutingMethod, TopLevelDomainTable};
use std::borrow::Cow;

/// Classifies a bare host (no scheme, no port).
pub fn classify(host: &str, policy: &PolicyConfiguration) -> RoutingMethod {
    let host = normalize(host);
    let host = host.as_ref();

    if let Some(addr) = parse_ipv4_literal(host) {
        if is_private_range(addr) {
            return RoutingMethod::Direct;
        }
        return lookup(policy, |list| list.contains(host));
    }

    match registrable_suffix(host, &policy.top_level) {
        Some(suffix) => lookup(policy, |list| walk_contains(list, host, suffix)),
        None => lookup(policy, |list| list.contains(host) || list.contains("")),
    }
}

/// Classifies a request the way a PAC runtime's `FindProxyForURL` sees it.
///
/// `ftp:` URLs always go direct.
pub fn classify_request(url: &str, host: &str, policy: &PolicyConfiguration) -> RoutingMethod {
    if url
        .get(..4)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("ftp:"))
    {
        return RoutingMethod::Direct;
    }
    classify(host, policy)
}

/// Returns the label + TLD unit used for list matching, or `None` for a bare host.
///
/// Normally the last two labels. When the second-to-last label is itself in
/// the table (`google.com.hk`, `bbc.co.uk`) the last three are used.
pub fn registrable_suffix<'a>(host: &'a str, top_level: &TopLevelDomainTable) -> Option<&'a str> {
    let last_dot = host.rfind('.')?;
    let Some(second_dot) = host[..last_dot].rfind('.') else {
        return Some(host);
    };

    if !top_level.contains(&host[second_dot + 1..last_dot]) {
        return Some(&host[second_dot + 1..]);
    }

    match host[..second_dot].rfind('.') {
        Some(third_dot) => Some(&host[third_dot + 1..]),
        None => Some(host),
    }
}

fn lookup(policy: &PolicyConfiguration, matches: impl Fn(&DomainList) -> bool) -> RoutingMethod {
    if matches(&policy.direct) {
        RoutingMethod::Direct
    } else if matches(&policy.blocked) {
        RoutingMethod::Blocked
    } else {
        RoutingMethod::Default
    }
}

/// Tries `host`, then each suffix left after stripping a leading label,
/// stopping once `suffix` has been checked.
fn walk_contains(list: &DomainList, host: &str, suffix: &str) -> bool {
    let mut part = host;
    loop {
        if list.contains(part) {
            return true;
        }
        if part.len() <= suffix.len() {
            return false;
        }
        match part.find('.') {
            Some(idx) => part = &part[idx + 1..],
            None => return false,
        }
    }
}

fn normalize(host: &str) -> Cow<'_, str> {
    if host.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(host.to_ascii_lowercase())
    } else {
        Cow::Borrowed(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PolicyBuilder;

    fn fixture_policy() -> PolicyConfiguration {
        PolicyBuilder::new()
            .direct_hosts(["taobao.com", "www.baidu.com", "baidu.com"])
            .blocked_hosts(["alkasir.com", "some.domain", "172.32.2.255"])
            .top_level_domains(TopLevelDomainTable::STANDARD)
            .build()
            .unwrap()
    }

    #[test]
    fn test_registrable_suffix() {
        let tld = TopLevelDomainTable::standard();
        assert_eq!(registrable_suffix("foo.baidu.com", &tld), Some("baidu.com"));
        assert_eq!(registrable_suffix("baidu.com", &tld), Some("baidu.com"));
        assert_eq!(
            registrable_suffix("www.google.com.hk", &tld),
            Some("google.com.hk")
        );
        assert_eq!(registrable_suffix("com.hk", &tld), Some("com.hk"));
        assert_eq!(
            registrable_suffix("a.b.bbc.co.uk", &tld),
            Some("bbc.co.uk")
        );
        assert_eq!(registrable_suffix("localhost", &tld), None);

        let empty = TopLevelDomainTable::new();
        assert_eq!(
            registrable_suffix("www.google.com.hk", &empty),
            Some("com.hk")
        );
    }

    #[test]
    fn test_private_ip_is_direct() {
        let policy = fixture_policy();
        for host in [
            "192.168.1.1",
            "10.1.1.1",
            "172.16.2.1",
            "172.20.255.255",
            "172.31.255.255",
            "192.168.2.255",
            "127.0.0.1",
        ] {
            assert_eq!(policy.classify(host), RoutingMethod::Direct, "{host}");
        }
    }

    #[test]
    fn test_public_ip() {
        let policy = fixture_policy();
        assert_eq!(policy.classify("172.15.0.255"), RoutingMethod::Default);
        assert_eq!(policy.classify("172.15.255.255"), RoutingMethod::Default);
        assert_eq!(policy.classify("172.32.0.0"), RoutingMethod::Default);
        assert_eq!(policy.classify("12.20.2.1"), RoutingMethod::Default);
        // Listed verbatim.
        assert_eq!(policy.classify("172.32.2.255"), RoutingMethod::Blocked);
    }

    #[test]
    fn test_bare_hosts_use_sentinel() {
        let policy = fixture_policy();
        assert_eq!(policy.classify("localhost"), RoutingMethod::Direct);
        assert_eq!(policy.classify("simple"), RoutingMethod::Direct);
        assert_eq!(policy.classify(""), RoutingMethod::Direct);
    }

    #[test]
    fn test_host_names() {
        let policy = fixture_policy();
        let cases = [
            ("taobao.com", RoutingMethod::Direct),
            ("www.taobao.com", RoutingMethod::Direct),
            ("www.baidu.com", RoutingMethod::Direct),
            ("baidu.com", RoutingMethod::Direct),
            ("foo.baidu.com", RoutingMethod::Direct),
            ("google.com", RoutingMethod::Default),
            ("www.google.com", RoutingMethod::Default),
            ("www.google.com.hk", RoutingMethod::Default),
            ("alkasir.com", RoutingMethod::Blocked),
            ("some.domain", RoutingMethod::Blocked),
            ("www.some.domain", RoutingMethod::Blocked),
            ("a.b.c.some.domain", RoutingMethod::Blocked),
            ("WWW.Alkasir.COM", RoutingMethod::Blocked),
        ];
        for (host, expected) in cases {
            assert_eq!(policy.classify(host), expected, "{host}");
        }
    }

    #[test]
    fn test_malformed_ip_goes_through_domain_matching() {
        let policy = PolicyBuilder::new()
            .blocked_hosts(["4.5", "1.1.1"])
            .build()
            .unwrap();
        assert_eq!(policy.classify("1.2.3.4.5"), RoutingMethod::Blocked);
        assert_eq!(policy.classify("999.1.1.1"), RoutingMethod::Blocked);
        assert_eq!(policy.classify("1.2.3.4"), RoutingMethod::Default);
    }

    #[test]
    fn test_walk_stops_at_registrable_suffix() {
        let policy = PolicyBuilder::new()
            .blocked_hosts(["com", "com.hk"])
            .top_level_domains(TopLevelDomainTable::STANDARD)
            .build()
            .unwrap();
        assert_eq!(policy.classify("google.com"), RoutingMethod::Default);
        assert_eq!(policy.classify("www.google.com.hk"), RoutingMethod::Default);
        assert_eq!(policy.classify("com.hk"), RoutingMethod::Blocked);
    }

    #[test]
    fn test_direct_wins_over_blocked() {
        let policy = PolicyBuilder::new()
            .direct_hosts(["example.com"])
            .blocked_hosts(["example.com", "www.example.com"])
            .build()
            .unwrap();
        assert_eq!(policy.classify("www.example.com"), RoutingMethod::Direct);
        assert_eq!(policy.classify("example.com"), RoutingMethod::Direct);
    }

    #[test]
    fn test_degenerate_policy() {
        let policy = PolicyConfiguration::default();
        assert_eq!(policy.classify("google.com"), RoutingMethod::Default);
        assert_eq!(policy.classify("8.8.8.8"), RoutingMethod::Default);
        assert_eq!(policy.classify("10.0.0.1"), RoutingMethod::Direct);
        assert_eq!(policy.classify("intranet"), RoutingMethod::Direct);
    }

    #[test]
    fn test_unusual_input_never_panics() {
        let policy = fixture_policy();
        for host in [".", "..", ".com", "com.", "a..b.com", "::1", "[::1]", "ünïcödé.com", "\0"] {
            let _ = policy.classify(host);
        }
        assert_eq!(policy.classify("ünïcödé.com"), RoutingMethod::Default);
    }

    #[test]
    fn test_case_folding_is_ascii_only() {
        let policy = PolicyBuilder::new()
            .blocked_hosts(["BÜCHER.de"])
            .build()
            .unwrap();
        assert_eq!(policy.classify("BÜCHER.de"), RoutingMethod::Blocked);
        assert_eq!(policy.classify("www.bÜcher.DE"), RoutingMethod::Blocked);
        assert_eq!(policy.classify("bücher.de"), RoutingMethod::Default);
    }

    #[test]
    fn test_ftp_requests_go_direct() {
        let policy = fixture_policy();
        assert_eq!(
            classify_request("ftp://alkasir.com/file", "alkasir.com", &policy),
            RoutingMethod::Direct
        );
        assert_eq!(
            classify_request("FTP://alkasir.com/file", "alkasir.com", &policy),
            RoutingMethod::Direct
        );
        assert_eq!(
            classify_request("https://alkasir.com/", "alkasir.com", &policy),
            RoutingMethod::Blocked
        );
        assert_eq!(
            classify_request("", "alkasir.com", &policy),
            RoutingMethod::Blocked
        );
    }
}
