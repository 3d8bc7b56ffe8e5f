//! Server options and the directives used to build them.
//!
//! Directives only record values on a [`ServerOptionsBuilder`]; nothing is
//! checked until [`ServerOptionsBuilder::build`], which validates every
//! field in a fixed order and returns the first failure.

use std::time::Duration;

use cdc_utils::endpoint_list::{flatten_endpoints, split_endpoints};
use cdc_utils::{HostPort, HostPortError};

use crate::error::ConfigError;

/// Resolved, immutable options a node is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pd_endpoints: Vec<String>,
    address: String,
    advertise_address: String,
    gc_ttl: Duration,
}

impl ServerOptions {
    pub fn builder() -> ServerOptionsBuilder {
        ServerOptionsBuilder::default()
    }

    pub fn pd_endpoints(&self) -> &[String] {
        &self.pd_endpoints
    }

    /// Listen address, `host:port`. The host may be a wildcard.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Address peers use to reach this node. Never a wildcard.
    pub fn advertise_address(&self) -> &str {
        &self.advertise_address
    }

    pub fn gc_ttl(&self) -> Duration {
        self.gc_ttl
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerOptionsBuilder {
    pd_endpoints: Vec<String>,
    address: Option<String>,
    advertise_address: Option<String>,
    gc_ttl: Option<Duration>,
}

impl ServerOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the PD endpoints from a comma-delimited list.
    pub fn with_pd_endpoints(mut self, endpoints: &str) -> Self {
        self.pd_endpoints = split_endpoints(endpoints);
        self
    }

    /// Sets the PD endpoints from an already split list.
    pub fn with_pd_endpoint_list<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pd_endpoints = flatten_endpoints(endpoints);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_advertise_address(mut self, advertise_address: impl Into<String>) -> Self {
        self.advertise_address = Some(advertise_address.into());
        self
    }

    pub fn with_gc_ttl(mut self, gc_ttl: Duration) -> Self {
        self.gc_ttl = Some(gc_ttl);
        self
    }

    pub fn build(self) -> Result<ServerOptions, ConfigError> {
        if self.pd_endpoints.is_empty() {
            return Err(ConfigError::EmptyPdAddress);
        }

        let address = match self.address {
            Some(address) if !address.is_empty() => address,
            _ => return Err(ConfigError::EmptyAddress),
        };

        let gc_ttl = match self.gc_ttl {
            Some(gc_ttl) if !gc_ttl.is_zero() => gc_ttl,
            _ => return Err(ConfigError::EmptyGcTtl),
        };

        let listen = parse_host_port(&address)?;

        let advertise_address = match self.advertise_address {
            Some(advertise_address) if !advertise_address.is_empty() => advertise_address,
            _ => {
                if listen.is_wildcard() {
                    return Err(ConfigError::WildcardListenWithoutAdvertise);
                }
                address.clone()
            }
        };

        let advertise = parse_host_port(&advertise_address)?;
        if advertise.is_wildcard() {
            return Err(ConfigError::WildcardAdvertise);
        }

        Ok(ServerOptions {
            pd_endpoints: self.pd_endpoints,
            address,
            advertise_address,
            gc_ttl,
        })
    }
}

fn parse_host_port(address: &str) -> Result<HostPort, ConfigError> {
    HostPort::parse(address).map_err(|source| match source {
        HostPortError::MissingPort => ConfigError::MissingPort(address.to_string()),
        source => ConfigError::InvalidAddress {
            address: address.to_string(),
            source,
        },
    })
}
