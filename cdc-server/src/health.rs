//! Coordination service liveness monitoring.
//!
//! A [`HealthChecker`] probes the coordination service on a fixed cadence and
//! keeps a count of consecutive failed probes. It runs until its cancellation
//! token fires ([`LivenessError::Cancelled`]) or until the count reaches the
//! failure threshold ([`LivenessError::Unreachable`]). Both are terminal.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::constants::{
    HEALTH_CHECK_FAILURE_THRESHOLD, HEALTH_CHECK_PROBE_TIMEOUT_MS, HEALTH_CHECK_TICK_INTERVAL_MS,
};
use crate::error::{ConfigError, LivenessError};
use crate::pd_client::{EtcdHealthClient, HealthProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthCheckConfig {
    /// Time between probes
    pub tick_interval: Duration,
    /// Upper bound on a single probe; must be shorter than `tick_interval`
    pub probe_timeout: Duration,
    /// Consecutive failed probes that mean the service is unreachable
    pub failure_threshold: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(HEALTH_CHECK_TICK_INTERVAL_MS),
            probe_timeout: Duration::from_millis(HEALTH_CHECK_PROBE_TIMEOUT_MS),
            failure_threshold: HEALTH_CHECK_FAILURE_THRESHOLD,
        }
    }
}

impl HealthCheckConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::InvalidHealthCheck(
                "tick interval must be non-zero".to_string(),
            ));
        }
        if self.probe_timeout.is_zero() || self.probe_timeout >= self.tick_interval {
            return Err(ConfigError::InvalidHealthCheck(format!(
                "probe timeout {:?} must be non-zero and shorter than the tick interval {:?}",
                self.probe_timeout, self.tick_interval
            )));
        }
        if self.failure_threshold == 0 {
            return Err(ConfigError::InvalidHealthCheck(
                "failure threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Approximate outage length before escalation.
    pub fn escalation_window(&self) -> Duration {
        self.tick_interval.saturating_mul(self.failure_threshold)
    }
}

pub struct HealthChecker<P> {
    probe: P,
    config: HealthCheckConfig,
}

impl<P: HealthProbe> HealthChecker<P> {
    pub fn new(probe: P, config: HealthCheckConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { probe, config })
    }

    /// Runs until cancelled or until the coordination service is declared
    /// unreachable, and returns that terminal outcome.
    pub async fn run(&self, cancel: CancellationToken) -> LivenessError {
        if cancel.is_cancelled() {
            return LivenessError::Cancelled;
        }

        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // Skip the first immediate tick

        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("Health checker shutting down");
                    return LivenessError::Cancelled;
                }
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("Health checker shutting down during probe");
                    return LivenessError::Cancelled;
                }
                outcome = tokio::time::timeout(self.config.probe_timeout, self.probe.probe()) => outcome,
            };

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(format!("{e:#}")),
                Err(_) => Some(format!("probe timed out after {:?}", self.config.probe_timeout)),
            };

            match failure {
                None => {
                    if consecutive_failures > 0 {
                        log::info!(
                            "Coordination service healthy again after {} failed probes",
                            consecutive_failures
                        );
                    } else {
                        log::debug!("Coordination service healthy");
                    }
                    consecutive_failures = 0;
                }
                Some(last_error) => {
                    consecutive_failures += 1;
                    log::warn!(
                        "Coordination service probe failed ({}/{}): {}",
                        consecutive_failures,
                        self.config.failure_threshold,
                        last_error
                    );
                    if consecutive_failures >= self.config.failure_threshold {
                        log::error!(
                            "Coordination service unreachable for about {:?}, giving up",
                            self.config.escalation_window()
                        );
                        return LivenessError::Unreachable {
                            failures: consecutive_failures,
                            last_error,
                        };
                    }
                }
            }
        }
    }
}

/// Monitors the coordination service behind `endpoints` until `cancel` fires
/// or the service is declared unreachable.
pub async fn check_health(
    endpoints: &[String],
    config: HealthCheckConfig,
    cancel: CancellationToken,
) -> LivenessError {
    if let Err(e) = config.validate() {
        return e.into();
    }
    let client = match EtcdHealthClient::new(endpoints, config.probe_timeout) {
        Ok(client) => client,
        Err(e) => return e,
    };
    match HealthChecker::new(client, config) {
        Ok(checker) => checker.run(cancel).await,
        Err(e) => e.into(),
    }
}
