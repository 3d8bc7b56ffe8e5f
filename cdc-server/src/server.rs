use anyhow::{anyhow, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ConfigError, LivenessError};
use crate::health::{HealthCheckConfig, HealthChecker};
use crate::options::{ServerOptions, ServerOptionsBuilder};
use crate::pd_client::EtcdHealthClient;

/// A cdc node: validated options plus the background task that watches the
/// coordination service for as long as the node lives.
pub struct Server {
    opts: ServerOptions,
    health_check: HealthCheckConfig,
    health_task: Option<JoinHandle<LivenessError>>,
    health_started: bool,
}

impl Server {
    pub fn new(opts: ServerOptions) -> Self {
        Self {
            opts,
            health_check: HealthCheckConfig::default(),
            health_task: None,
            health_started: false,
        }
    }

    pub fn from_builder(builder: ServerOptionsBuilder) -> Result<Self, ConfigError> {
        Ok(Self::new(builder.build()?))
    }

    pub fn with_health_check(mut self, health_check: HealthCheckConfig) -> Self {
        self.health_check = health_check;
        self
    }

    pub fn options(&self) -> &ServerOptions {
        &self.opts
    }

    pub fn health_check(&self) -> &HealthCheckConfig {
        &self.health_check
    }

    /// Spawn the coordination service health checker. It stops when `cancel`
    /// fires or when the service is declared unreachable.
    pub fn start_health_checker(&mut self, cancel: CancellationToken) -> Result<()> {
        if self.health_started {
            anyhow::bail!("health checker already started");
        }
        let client = EtcdHealthClient::new(self.opts.pd_endpoints(), self.health_check.probe_timeout)?;
        let checker = HealthChecker::new(client, self.health_check)?;

        log::info!(
            "Starting coordination service health checker for {:?} (tick {:?}, probe timeout {:?}, threshold {})",
            self.opts.pd_endpoints(),
            self.health_check.tick_interval,
            self.health_check.probe_timeout,
            self.health_check.failure_threshold
        );
        self.health_task = Some(tokio::spawn(async move { checker.run(cancel).await }));
        self.health_started = true;
        Ok(())
    }

    /// Wait for the health checker to finish. Cancellation is a clean stop;
    /// any other outcome is returned as an error.
    pub async fn wait(&mut self) -> Result<()> {
        let Some(handle) = self.health_task.take() else {
            anyhow::bail!("health checker is not running");
        };
        log::info!("Awaiting health checker shutdown...");
        match handle.await? {
            LivenessError::Cancelled => {
                log::info!("Health checker shutdown complete");
                Ok(())
            }
            e => {
                log::error!("Health checker stopped: {}", e);
                Err(anyhow!(e))
            }
        }
    }

    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        log::info!(
            "Running cdc server on {} (advertised as {}), GC TTL {:?}",
            self.opts.address(),
            self.opts.advertise_address(),
            self.opts.gc_ttl()
        );
        self.start_health_checker(cancel)?;
        self.wait().await
    }
}
