pub mod config;
pub use self::config::*;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{Layer, Registry};

fn env_filter(config: &FilterConfig) -> EnvFilter {
    let mut filter_builder = EnvFilter::builder();
    if !config.level_filter_env.is_empty() {
        filter_builder = filter_builder.with_env_var(&config.level_filter_env);
    }
    filter_builder
        .with_default_directive(config.max_level.into())
        .parse_lossy(&config.level_filter)
}

/// Install the global subscriber.
pub fn initialize_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    if !config.enable {
        return Ok(());
    }
    let console = config.console.enable.then(|| {
        let verbose = config.console.verbose;
        tracing_subscriber::fmt::layer()
            .with_file(verbose)
            .with_line_number(verbose)
            .with_thread_ids(verbose)
            .with_target(verbose)
            .with_filter(env_filter(&config.console.filter))
    });
    let file = config.file.enable.then(|| {
        let file = &config.file;
        let appender =
            RollingFileAppender::new(file.rotation.into(), &file.directory, &file.prefix);
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(appender)
            .with_file(file.verbose)
            .with_line_number(file.verbose)
            .with_thread_ids(file.verbose)
            .with_target(file.verbose)
            .with_filter(env_filter(&file.filter))
    });
    Registry::default()
        .with(env_filter(&config.filter))
        .with(console)
        .with(file)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_yaml(yaml: &str) -> TelemetryConfig {
        ::config::Config::builder()
            .add_source(::config::File::from_str(yaml, ::config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn layers_share_filter_shape() {
        let config = from_yaml(
            r#"
max_level: Debug
level_filter: sea_orm=warn
console:
  verbose: true
  max_level: Warn
file:
  enable: true
  rotation: Daily
  level_filter_env: ASSET_SYSTEM_FILE_LOG
"#,
        );
        assert!(config.enable);
        assert_eq!(config.filter.max_level, LoggingLevel::Debug);
        assert_eq!(config.filter.level_filter, "sea_orm=warn");
        assert!(config.console.enable);
        assert!(config.console.verbose);
        assert_eq!(config.console.filter.max_level, LoggingLevel::Warn);
        assert!(config.file.enable);
        assert_eq!(config.file.filter.max_level, LoggingLevel::Info);
        assert_eq!(config.file.filter.level_filter_env, "ASSET_SYSTEM_FILE_LOG");
        assert_eq!(config.file.directory, "./logs");
        assert!(matches!(config.file.rotation, RotationLevel::Daily));
    }
}
