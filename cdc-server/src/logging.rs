use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::constants::LOG_FILE_NAME;

/// Initialize logging to the terminal, and also to `<logs_path>/cdc.log`
/// when a logs directory is given and file logging is enabled.
pub fn init_logging(
    logs_path: Option<PathBuf>,
    logs_enabled: Option<bool>,
    log_level: Option<String>,
) -> Result<()> {
    let save_logs = logs_enabled.unwrap_or(true);
    let level_str = log_level.unwrap_or_else(|| "info".to_string());
    let level_filter = parse_level_filter(&level_str);

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&level_str));
    builder.filter_level(level_filter);

    match logs_path {
        Some(logs_dir) if save_logs => {
            std::fs::create_dir_all(&logs_dir)
                .with_context(|| format!("Failed to create logs directory {}", logs_dir.display()))?;
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(logs_dir.join(LOG_FILE_NAME))?;
            builder.target(env_logger::Target::Pipe(Box::new(DualWriter { file: log_file })));
            builder.try_init()?;
            log::info!(
                "Logging initialized. Logs will be written to both terminal and: {} (level: {})",
                logs_dir.display(),
                level_filter
            );
        }
        _ => {
            builder.try_init()?;
            log::info!("Logging initialized (level: {})", level_filter);
        }
    }

    Ok(())
}

/// Unknown levels fall back to `info`.
pub fn parse_level_filter(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Writes every log line to a file and to stdout.
struct DualWriter {
    file: std::fs::File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        io::stdout().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        io::stdout().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_filter() {
        assert_eq!(parse_level_filter("debug"), LevelFilter::Debug);
        assert_eq!(parse_level_filter("WARNING"), LevelFilter::Warn);
        assert_eq!(parse_level_filter("Error"), LevelFilter::Error);
        assert_eq!(parse_level_filter("off"), LevelFilter::Off);
        assert_eq!(parse_level_filter("verbose"), LevelFilter::Info);
    }
}
