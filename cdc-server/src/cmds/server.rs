use anyhow::{Context, Result};
use cdc_server::config::Config;
use cdc_server::constants::DEFAULT_GC_TTL_SECS;
use cdc_server::logging;
use cdc_server::Server;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
pub struct Opts {
    /// JSON config file; flags override its values
    #[clap(long, env = "CDC_CONFIG")]
    config: Option<PathBuf>,

    /// Comma-delimited PD (etcd) client URLs
    #[clap(long, env = "CDC_PD")]
    pd: Option<String>,

    /// Listen address, host:port
    #[clap(long, env = "CDC_ADDR")]
    addr: Option<String>,

    /// Address other nodes use to reach this one, host:port
    #[clap(long, env = "CDC_ADVERTISE_ADDR")]
    advertise_addr: Option<String>,

    /// GC safepoint TTL in seconds
    #[clap(long, env = "CDC_GC_TTL")]
    gc_ttl: Option<u64>,

    #[clap(long, env = "CDC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for cdc.log
    #[clap(long, env = "CDC_LOGS_PATH")]
    logs_path: Option<PathBuf>,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let config = match &opts.config {
        Some(path) => Config::from_filepath(path).context("Failed to read config")?,
        None => Config::default(),
    };

    logging::init_logging(
        opts.logs_path.clone().or(config.logs_path.clone()),
        config.logs_enabled,
        opts.log_level.clone().or(config.log_level.clone()),
    )?;

    let mut builder = config.to_options_builder();
    if config.gc_ttl_secs.is_none() {
        builder = builder.with_gc_ttl(Duration::from_secs(DEFAULT_GC_TTL_SECS));
    }
    if let Some(ref pd) = opts.pd {
        builder = builder.with_pd_endpoints(pd);
    }
    if let Some(ref addr) = opts.addr {
        builder = builder.with_address(addr.as_str());
    }
    if let Some(ref advertise_addr) = opts.advertise_addr {
        builder = builder.with_advertise_address(advertise_addr.as_str());
    }
    if let Some(gc_ttl) = opts.gc_ttl {
        builder = builder.with_gc_ttl(Duration::from_secs(gc_ttl));
    }

    let health_check = config.get_health_check_config()?;
    let mut server = Server::from_builder(builder)
        .context("Invalid server options")?
        .with_health_check(health_check);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
            log::info!("Received Ctrl-C, initiating shutdown...");
            cancel.cancel();
        }
    });

    server.run(cancel).await?;
    log::info!("Server shutdown complete");
    Ok(())
}
