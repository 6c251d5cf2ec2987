use anyhow::Result;
use media_catalog_config::{LoggingConfig, PathManager};
use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Resolve the configured log file. Relative names land in the log directory.
pub fn log_file_path(settings: &LoggingConfig, paths: &PathManager) -> Option<PathBuf> {
    settings.file.as_ref().map(|file| {
        if file.is_absolute() {
            file.clone()
        } else {
            paths.log_dir().join(file)
        }
    })
}

fn build_filter(verbose_level: u8, quiet: bool, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    let fallback = match verbose_level {
        0 => default_level,
        // -v: debug, but keep the HTTP stack quiet
        1 => "debug,hyper=info,reqwest=info",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

pub fn init_logging(verbose_level: u8, quiet: bool, settings: &LoggingConfig, log_file: Option<PathBuf>) -> Result<()> {
    let filter = build_filter(verbose_level, quiet, &settings.level);

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| settings.json || !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    let Some(log_path) = log_file else {
        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry.with(json_layer).init();
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry.with(fmt_layer).init();
        }
        return Ok(());
    };

    let log_dir = log_path.parent()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(log_dir)?;
    let log_filename = log_path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;

    // "tuneline.log" rotates as tuneline.2026-01-17 and so on
    let log_prefix = log_filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(log_filename);

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix);

    if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(file_appender);
        registry.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .with_writer(file_appender);
        registry.with(fmt_layer).init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_relative_log_file_goes_to_log_dir() {
        let paths = PathManager::with_base("/srv/tuneline");
        let settings = LoggingConfig {
            file: Some(PathBuf::from("tuneline.log")),
            ..LoggingConfig::default()
        };
        assert_eq!(
            log_file_path(&settings, &paths),
            Some(PathBuf::from("/srv/tuneline/logs/tuneline.log"))
        );
    }

    #[test]
    fn test_absolute_log_file_is_kept() {
        let paths = PathManager::with_base("/srv/tuneline");
        let settings = LoggingConfig {
            file: Some(PathBuf::from("/var/log/tuneline.log")),
            ..LoggingConfig::default()
        };
        assert_eq!(log_file_path(&settings, &paths).as_deref(), Some(Path::new("/var/log/tuneline.log")));
        assert_eq!(log_file_path(&LoggingConfig::default(), &paths), None);
    }
}
