use serde::*;
use tracing::metadata::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::Directive;

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetryConfig {
    #[serde(default = "enabled")]
    pub enable: bool,
    /// Applied to every layer.
    #[serde(flatten)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub file: FileConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enable: true,
            filter: Default::default(),
            console: Default::default(),
            file: Default::default(),
        }
    }
}

/// Level and directives of one filter, e.g. `max_level: Debug` with
/// `level_filter: sea_orm=warn,rdkafka=info`.
#[derive(Default, Deserialize, Clone, Debug)]
pub struct FilterConfig {
    #[serde(default)]
    pub max_level: LoggingLevel,
    #[serde(default)]
    pub level_filter: String,
    /// Environment variable read for extra directives.
    #[serde(default)]
    pub level_filter_env: String,
}

#[derive(Default, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
    Off,
}

impl From<LoggingLevel> for Directive {
    fn from(level: LoggingLevel) -> Self {
        let filter = match level {
            LoggingLevel::Error => LevelFilter::ERROR,
            LoggingLevel::Warn => LevelFilter::WARN,
            LoggingLevel::Info => LevelFilter::INFO,
            LoggingLevel::Debug => LevelFilter::DEBUG,
            LoggingLevel::Trace => LevelFilter::TRACE,
            LoggingLevel::Off => LevelFilter::OFF,
        };
        filter.into()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ConsoleConfig {
    #[serde(default = "enabled")]
    pub enable: bool,
    /// Print file, line, thread and target of each record.
    #[serde(default)]
    pub verbose: bool,
    #[serde(flatten)]
    pub filter: FilterConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enable: true,
            verbose: false,
            filter: Default::default(),
        }
    }
}

/// Plain text log files, off unless enabled.
#[derive(Deserialize, Clone, Debug)]
pub struct FileConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(flatten)]
    pub filter: FilterConfig,
    #[serde(default = "FileConfig::default_directory")]
    pub directory: String,
    /// File name, or its prefix when rotating.
    #[serde(default = "FileConfig::default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub rotation: RotationLevel,
}

impl FileConfig {
    fn default_directory() -> String {
        "./logs".to_string()
    }
    fn default_prefix() -> String {
        "asset-system.log".to_string()
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enable: false,
            verbose: false,
            filter: Default::default(),
            directory: Self::default_directory(),
            prefix: Self::default_prefix(),
            rotation: Default::default(),
        }
    }
}

#[derive(Default, Deserialize, Clone, Copy, Debug)]
pub enum RotationLevel {
    Daily,
    Hourly,
    Minutely,
    #[default]
    Never,
}

impl From<RotationLevel> for Rotation {
    fn from(level: RotationLevel) -> Self {
        match level {
            RotationLevel::Daily => Rotation::DAILY,
            RotationLevel::Hourly => Rotation::HOURLY,
            RotationLevel::Minutely => Rotation::MINUTELY,
            RotationLevel::Never => Rotation::NEVER,
        }
    }
}

fn enabled() -> bool {
    true
}
