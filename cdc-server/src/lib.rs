pub mod config;
pub mod constants;
pub mod error;
pub mod health;
pub mod logging;
pub mod options;
pub mod pd_client;
pub mod server;

pub use error::{ConfigError, LivenessError};
pub use health::{check_health, HealthCheckConfig, HealthChecker};
pub use options::{ServerOptions, ServerOptionsBuilder};
pub use pd_client::{EtcdHealthClient, HealthProbe};
pub use server::Server;
