use std::net::Ipv4Addr;

/// Parses a dotted-quad IPv4 literal.
///
/// Exactly four components, each one to three ASCII digits in `0..=255`.
/// Leading zeros are accepted (`010` is 10). Anything else is a host name.
pub fn parse_ipv4_literal(host: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = host.split('.');

    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u16 = part.parse().ok()?;
        *octet = u8::try_from(value).ok()?;
    }

    if parts.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}

/// Ranges that are always reachable without a proxy.
///
/// Unlike `Ipv4Addr::is_private`, loopback is included.
pub fn is_private_range(addr: Ipv4Addr) -> bool {
    match addr.octets() {
        [10, ..] | [127, ..] => true,
        [192, 168, ..] => true,
        [172, second, ..] => (16..=31).contains(&second),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_detection() {
        let cases = [
            ("127.0.0.1", true),
            ("127.2.1.1", true),
            ("192.168.1.1", true),
            ("12.3.4.5", true),
            ("0.0.0.0", true),
            ("255.255.255.255", true),
            ("010.1.1.1", true),
            ("1.2.3.4.5", false),
            ("1.2.3", false),
            ("999.1.1.1", false),
            ("256.1.1.1", false),
            ("1..2.3", false),
            ("1.2.3.", false),
            ("0001.1.1.1", false),
            ("-1.2.3.4", false),
            ("+1.2.3.4", false),
            ("google.com", false),
            ("www.google.com.hk", false),
            ("", false),
        ];

        for (host, is_ip) in cases {
            assert_eq!(parse_ipv4_literal(host).is_some(), is_ip, "{host}");
        }
        assert_eq!(
            parse_ipv4_literal("010.1.1.1"),
            Some(Ipv4Addr::new(10, 1, 1, 1))
        );
    }

    #[test]
    fn test_private_ranges() {
        let private = [
            "127.0.0.1",
            "127.2.1.1",
            "192.168.1.1",
            "172.16.1.1",
            "172.20.1.1",
            "172.31.1.1",
            "172.31.255.255",
            "10.16.1.1",
            "10.0.0.0",
        ];
        for host in private {
            let addr = parse_ipv4_literal(host).unwrap();
            assert!(is_private_range(addr), "{host} should be private");
        }

        let public = [
            "172.15.1.1",
            "172.15.255.255",
            "172.32.0.0",
            "172.32.1.1",
            "12.3.4.5",
            "192.169.0.1",
            "11.0.0.1",
        ];
        for host in public {
            let addr = parse_ipv4_literal(host).unwrap();
            assert!(!is_private_range(addr), "{host} should not be private");
        }
    }
}
