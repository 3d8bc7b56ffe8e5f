use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostPortError {
    #[error("missing port")]
    MissingPort,

    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("too many colons")]
    TooManyColons,

    #[error("missing ']' in address")]
    UnclosedBracket,
}

/// A `host:port` pair as accepted for listen and advertise addresses.
///
/// The host may be empty (`:8300`), a name, an IPv4 address, or a bracketed
/// IPv6 address (`[::1]:8300`). Brackets are stripped from `host`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn parse(addr: &str) -> Result<HostPort, HostPortError> {
        let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
            let end = rest.find(']').ok_or(HostPortError::UnclosedBracket)?;
            let host = &rest[..end];
            let port = rest[end + 1..]
                .strip_prefix(':')
                .ok_or(HostPortError::MissingPort)?;
            (host, port)
        } else {
            let idx = addr.rfind(':').ok_or(HostPortError::MissingPort)?;
            let host = &addr[..idx];
            if host.contains(':') {
                return Err(HostPortError::TooManyColons);
            }
            (host, &addr[idx + 1..])
        };

        if port.is_empty() {
            return Err(HostPortError::MissingPort);
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| HostPortError::InvalidPort(port.to_string()))?;

        Ok(HostPort { host: host.to_string(), port })
    }

    /// True when the host means "every interface": empty, `0.0.0.0` or `::`.
    pub fn is_wildcard(&self) -> bool {
        if self.host.is_empty() {
            return true;
        }
        match self.host.parse::<IpAddr>() {
            Ok(ip) => ip.is_unspecified(),
            Err(_) => false,
        }
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_port() {
        let hp = HostPort::parse("cdc:1234").unwrap();
        assert_eq!(hp.host, "cdc");
        assert_eq!(hp.port, 1234);
        assert!(!hp.is_wildcard());

        let hp = HostPort::parse("127.0.0.1:8300").unwrap();
        assert_eq!(hp.host, "127.0.0.1");
        assert_eq!(hp.to_string(), "127.0.0.1:8300");

        let hp = HostPort::parse("[::1]:8300").unwrap();
        assert_eq!(hp.host, "::1");
        assert_eq!(hp.to_string(), "[::1]:8300");
        assert!(!hp.is_wildcard());
    }

    #[test]
    fn test_wildcard_hosts() {
        assert!(HostPort::parse("0.0.0.0:1234").unwrap().is_wildcard());
        assert!(HostPort::parse(":1234").unwrap().is_wildcard());
        assert!(HostPort::parse("[::]:1234").unwrap().is_wildcard());
        assert!(!HostPort::parse("advertise:1234").unwrap().is_wildcard());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(HostPort::parse("advertise"), Err(HostPortError::MissingPort));
        assert_eq!(HostPort::parse("cdc:"), Err(HostPortError::MissingPort));
        assert_eq!(HostPort::parse("[::1]"), Err(HostPortError::MissingPort));
        assert_eq!(HostPort::parse("[::1:8300"), Err(HostPortError::UnclosedBracket));
        assert_eq!(HostPort::parse("::1:8300"), Err(HostPortError::TooManyColons));
        assert_eq!(
            HostPort::parse("cdc:http"),
            Err(HostPortError::InvalidPort("http".to_string()))
        );
        assert_eq!(
            HostPort::parse("cdc:70000"),
            Err(HostPortError::InvalidPort("70000".to_string()))
        );
    }
}
