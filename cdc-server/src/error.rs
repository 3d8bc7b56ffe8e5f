use cdc_utils::HostPortError;
use thiserror::Error;

/// Invalid server options. Always fatal to startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("empty PD address")]
    EmptyPdAddress,

    #[error("empty address")]
    EmptyAddress,

    #[error("empty GC TTL is not allowed")]
    EmptyGcTtl,

    #[error("{0} does not contain a port")]
    MissingPort(String),

    #[error("{address} is not a valid host:port address: {source}")]
    InvalidAddress {
        address: String,
        source: HostPortError,
    },

    #[error("advertise address must be specified when listen address is wildcard")]
    WildcardListenWithoutAdvertise,

    #[error("advertise address must be specified and not be a wildcard")]
    WildcardAdvertise,

    #[error("invalid health check configuration: {0}")]
    InvalidHealthCheck(String),
}

/// Terminal outcome of the coordination service liveness monitor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LivenessError {
    /// The owning lifetime was cancelled. This is a clean shutdown.
    #[error("health check cancelled")]
    Cancelled,

    #[error("coordination service unreachable after {failures} consecutive failed probes: {last_error}")]
    Unreachable { failures: u32, last_error: String },

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("invalid coordination service endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl LivenessError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LivenessError::Cancelled)
    }
}
