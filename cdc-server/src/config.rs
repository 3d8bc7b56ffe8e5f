use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::health::HealthCheckConfig;
use crate::options::ServerOptionsBuilder;

/// On-disk node configuration. Every field is optional; anything missing
/// falls back to command line flags or defaults.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    pub pd_endpoints: Option<Vec<String>>,
    pub addr: Option<String>,
    pub advertise_addr: Option<String>,
    pub gc_ttl_secs: Option<u64>,
    pub logs_path: Option<PathBuf>,
    pub logs_enabled: Option<bool>,
    pub log_level: Option<String>,
    pub health_check_tick_interval_ms: Option<u64>,
    pub health_check_probe_timeout_ms: Option<u64>,
    pub health_check_failure_threshold: Option<u32>,
}

impl Config {
    pub fn from_filepath(path: &Path) -> Result<Config> {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let mut config: Config = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(logs_path) = config.logs_path.take() {
            let config_dir = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
                _ => PathBuf::from("."),
            };
            config.logs_path = Some(to_absolute_path(&config_dir, &logs_path)?);
        }

        Ok(config)
    }

    /// Apply every option present in the file to `builder`.
    pub fn apply_to(&self, mut builder: ServerOptionsBuilder) -> ServerOptionsBuilder {
        if let Some(ref pd_endpoints) = self.pd_endpoints {
            builder = builder.with_pd_endpoint_list(pd_endpoints);
        }
        if let Some(ref addr) = self.addr {
            builder = builder.with_address(addr.as_str());
        }
        if let Some(ref advertise_addr) = self.advertise_addr {
            builder = builder.with_advertise_address(advertise_addr.as_str());
        }
        if let Some(gc_ttl_secs) = self.gc_ttl_secs {
            builder = builder.with_gc_ttl(Duration::from_secs(gc_ttl_secs));
        }
        builder
    }

    pub fn to_options_builder(&self) -> ServerOptionsBuilder {
        self.apply_to(ServerOptionsBuilder::new())
    }

    pub fn get_health_check_config(&self) -> Result<HealthCheckConfig, ConfigError> {
        let mut config = HealthCheckConfig::default();

        if let Some(ms) = self.health_check_tick_interval_ms {
            config.tick_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.health_check_probe_timeout_ms {
            config.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(threshold) = self.health_check_failure_threshold {
            config.failure_threshold = threshold;
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn to_absolute_path(base_dir: &Path, relative_path: &Path) -> Result<PathBuf> {
    if relative_path.is_absolute() {
        return Ok(relative_path.to_path_buf());
    }
    let base_dir = base_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", base_dir.display()))?;
    Ok(base_dir.join(relative_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HEALTH_CHECK_FAILURE_THRESHOLD;
    use std::io::Write;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("config.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_config_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(
            temp_dir.path(),
            r#"{
                "pd_endpoints": ["http://pd1:2379,http://pd2:2379"],
                "addr": "0.0.0.0:8300",
                "advertise_addr": "cdc-0:8300",
                "gc_ttl_secs": 86400,
                "logs_path": "logs",
                "health_check_tick_interval_ms": 1000,
                "health_check_probe_timeout_ms": 800
            }"#,
        );

        let config = Config::from_filepath(&path).unwrap();
        let logs_path = config.logs_path.clone().unwrap();
        assert!(logs_path.is_absolute());
        assert!(logs_path.ends_with("logs"));

        let opts = config.to_options_builder().build().unwrap();
        assert_eq!(opts.pd_endpoints(), ["http://pd1:2379", "http://pd2:2379"]);
        assert_eq!(opts.address(), "0.0.0.0:8300");
        assert_eq!(opts.advertise_address(), "cdc-0:8300");
        assert_eq!(opts.gc_ttl(), Duration::from_secs(86400));

        let health = config.get_health_check_config().unwrap();
        assert_eq!(health.tick_interval, Duration::from_secs(1));
        assert_eq!(health.probe_timeout, Duration::from_millis(800));
        assert_eq!(health.failure_threshold, HEALTH_CHECK_FAILURE_THRESHOLD);
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config {
            pd_endpoints: Some(vec!["http://pd:2379".to_string()]),
            addr: Some("cdc:8300".to_string()),
            gc_ttl_secs: Some(60),
            ..Default::default()
        };
        let opts = config
            .to_options_builder()
            .with_address("cdc:9300")
            .build()
            .unwrap();
        assert_eq!(opts.address(), "cdc:9300");
        assert_eq!(opts.advertise_address(), "cdc:9300");
    }

    #[test]
    fn test_empty_config_reports_missing_options() {
        let config = Config::default();
        assert_eq!(
            config.to_options_builder().build().unwrap_err(),
            ConfigError::EmptyPdAddress
        );
        assert_eq!(
            config.get_health_check_config().unwrap(),
            HealthCheckConfig::default()
        );
    }

    #[test]
    fn test_bad_config_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(Config::from_filepath(&temp_dir.path().join("missing.json")).is_err());

        let path = write_config(temp_dir.path(), "{ not json");
        let err = Config::from_filepath(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));

        let config = Config {
            health_check_failure_threshold: Some(0),
            ..Default::default()
        };
        assert!(config.get_health_check_config().is_err());
    }
}
