#![doc = include_str!("../README.md")]

use std::collections::HashMap;
use std::path::Path;
use std::{env, fs, io};

use tracing::subscriber::SetGlobalDefaultError;
use tracing_log::log::SetLoggerError;
use tracing_subscriber::EnvFilter;

/// Logging setup of the `tile-codec` binary.
#[derive(Default)]
pub struct TileCodecObservability {
    filter: EnvFilter,
    log_format: LogFormatOptions,
}

impl TileCodecObservability {
    /// Transform [`log`](https://docs.rs/log) records into [`tracing`] events.
    ///
    /// Fails if a global `log` logger has already been set.
    pub fn with_initialised_log_tracing(self) -> Result<Self, SetLoggerError> {
        tracing_log::LogTracer::builder()
            .with_interest_cache(tracing_log::InterestCacheConfig::default())
            .init()?;
        Ok(self)
    }

    /// Set the global subscriber for the application.
    ///
    /// Fails if a global subscriber has already been set.
    pub fn set_global_subscriber(self) -> Result<(), SetGlobalDefaultError> {
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::fmt::Layer;
        use tracing_subscriber::prelude::*;

        let registry = tracing_subscriber::registry().with(self.filter);
        let writer = io::stderr;
        match self.log_format {
            LogFormatOptions::Full => {
                set_global_default(registry.with(Layer::default().with_writer(writer)))
            }
            LogFormatOptions::Compact => {
                set_global_default(registry.with(Layer::default().with_writer(writer).compact()))
            }
            LogFormatOptions::Pretty => {
                set_global_default(registry.with(Layer::default().with_writer(writer).pretty()))
            }
            LogFormatOptions::Json => {
                set_global_default(registry.with(Layer::default().with_writer(writer).json()))
            }
        }
    }
}

impl From<(EnvFilter, LogFormatOptions)> for TileCodecObservability {
    fn from((filter, log_format): (EnvFilter, LogFormatOptions)) -> Self {
        Self { filter, log_format }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Default, Debug, clap::ValueEnum)]
pub enum LogFormatOptions {
    /// Emit human-readable, single-line logs.
    Full,
    /// A variant of the full format, optimized for short line lengths.
    #[default]
    Compact,
    /// Multi-line logs for local debugging, prioritizing readability over compact storage.
    Pretty,
    /// Newline-delimited JSON logs.
    Json,
}

impl LogFormatOptions {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "full" => Some(Self::Full),
            "pretty" | "verbose" => Some(Self::Pretty),
            "json" | "jsonl" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Log format resolved from the first source that specifies one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LogFormat(Option<LogFormatOptions>);

impl LogFormat {
    /// Search for the log format as an argument on the command line.
    ///
    /// Runs before [`clap`] parses the arguments, so argument errors use the requested format.
    #[must_use]
    pub fn from_argument(argument: &str) -> Self {
        Self::from_args(argument, &cli_args())
    }

    fn from_args(argument: &str, args: &[String]) -> Self {
        let Some(value) = get_next_after_argument(argument, args) else {
            return Self(None);
        };
        if let Some(format) = LogFormatOptions::parse(&value) {
            Self(Some(format))
        } else {
            eprintln!(
                "Ignoring specified cli argument {argument} {value} as it is not a valid log format. Can be one of full, compact, pretty, json"
            );
            Self(None)
        }
    }

    /// Search for the log format under `key` in the config file given by `argument`.
    #[must_use]
    pub fn or_in_config_file(self, argument: &str, key: &str) -> Self {
        self.or_in_config_file_of(argument, key, &cli_args())
    }

    fn or_in_config_file_of(mut self, argument: &str, key: &str, args: &[String]) -> Self {
        if self.0.is_none()
            && let Some(path) = get_next_after_argument(argument, args)
            && let Some(value) = read_path_in_file(Path::new(&path), key)
        {
            match LogFormatOptions::parse(&value) {
                Some(format) => self.0 = Some(format),
                None => eprintln!(
                    "Ignoring specified option {key}: {value} inside {path} as it is not a valid log format. Can be one of full, compact, pretty, json"
                ),
            }
        }
        self
    }

    /// Get the log format from an environment variable.
    #[must_use]
    pub fn or_env_var(mut self, key: &str) -> Self {
        if self.0.is_none()
            && let Ok(value) = env::var(key)
        {
            match LogFormatOptions::parse(&value) {
                Some(format) => self.0 = Some(format),
                None => eprintln!(
                    "Ignoring specified environment variable {key}={value} as it is not a valid log format. Can be one of full, compact, pretty, json"
                ),
            }
        }
        self
    }

    #[must_use]
    pub fn or_default(self, default_format: LogFormatOptions) -> LogFormatOptions {
        self.0.unwrap_or(default_format)
    }
}

/// Log directives resolved from the first source that specifies them.
///
/// See [`EnvFilter`] for the directive syntax.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LogLevel(Option<String>);

impl LogLevel {
    /// Search for the log level as an argument on the command line.
    ///
    /// Invalid directives are not reported here, they are dropped when parsing the filter.
    #[must_use]
    pub fn from_argument(argument: &str) -> Self {
        Self(get_next_after_argument(argument, &cli_args()))
    }

    /// Search for the log level under `key` in the config file given by `argument`.
    #[must_use]
    pub fn or_in_config_file(self, argument: &str, key: &str) -> Self {
        self.or_in_config_file_of(argument, key, &cli_args())
    }

    fn or_in_config_file_of(mut self, argument: &str, key: &str, args: &[String]) -> Self {
        if self.0.is_none()
            && let Some(path) = get_next_after_argument(argument, args)
        {
            self.0 = read_path_in_file(Path::new(&path), key);
        }
        self
    }

    /// Get log directives from an environment variable.
    #[must_use]
    pub fn or_env_var(mut self, key: &str) -> Self {
        if self.0.is_none() {
            self.0 = env::var(key).ok();
        }
        self
    }

    /// Parse an [`EnvFilter`] from the directives found so far, ignoring any that are invalid.
    #[must_use]
    pub fn lossy_parse_to_filter_with_default(self, default_directives: &str) -> EnvFilter {
        let directives = self.0.unwrap_or_else(|| default_directives.to_string());
        EnvFilter::builder().parse_lossy(directives)
    }
}

fn cli_args() -> Vec<String> {
    env::args().collect()
}

/// Search for the value of `argument`, skipping the binary name.
///
/// The value is either the next token or attached with `=`, as in `--config=map.yaml`.
fn get_next_after_argument(argument: &str, args: &[String]) -> Option<String> {
    let mut args = args.iter().skip(1);
    while let Some(arg) = args.next() {
        if arg == argument {
            return args.next().cloned();
        }
        if let Some(value) = arg
            .strip_prefix(argument)
            .and_then(|rest| rest.strip_prefix('='))
        {
            return Some(value.to_string());
        }
    }
    None
}

/// Reads a string value from a top-level key of a YAML file.
///
/// All errors are ignored and return [`None`].
fn read_path_in_file(path: &Path, key: &str) -> Option<String> {
    let config_file = fs::read(path).ok()?;
    let map: HashMap<String, serde_yaml::Value> = serde_yaml::from_slice(&config_file).ok()?;
    map.get(key)?.as_str().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_log_level_env_var() {
        let log_level = LogLevel(None).or_env_var("TILE_CODEC_TEST_NOT_EXISTING_VARIABLE");
        assert_eq!(log_level, LogLevel(None));

        let log_level =
            LogLevel(Some("debug".to_string())).or_env_var("TILE_CODEC_TEST_NOT_EXISTING_VARIABLE");
        assert_eq!(log_level, LogLevel(Some("debug".to_string())));
    }

    #[test]
    fn test_get_next_after_argument() {
        let args = args(&["tile-codec", "--log-level", "trace", "--log-level2"]);
        assert_eq!(get_next_after_argument("not-found", &args), None);
        // the binary name is skipped
        assert_eq!(get_next_after_argument("tile-codec", &args), None);
        assert_eq!(
            get_next_after_argument("--log-level", &args),
            Some("trace".to_string())
        );
        assert_eq!(get_next_after_argument("--log-level2", &args), None);
    }

    #[test]
    fn test_get_attached_argument_value() {
        let cli = args(&["tile-codec", "--log-level2=warn", "--config=map.yaml"]);
        assert_eq!(
            get_next_after_argument("--config", &cli),
            Some("map.yaml".to_string())
        );
        assert_eq!(get_next_after_argument("--log-level", &cli), None);

        let cli = args(&["tile-codec", "--log-level=", "--config", "a=b"]);
        assert_eq!(
            get_next_after_argument("--log-level", &cli),
            Some(String::new())
        );
        assert_eq!(
            get_next_after_argument("--config", &cli),
            Some("a=b".to_string())
        );
    }

    #[test]
    fn test_read_path_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        assert_eq!(read_path_in_file(&config_path, "log_level"), None);

        fs::write(
            &config_path,
            "log_level: warn\ncompression: zlib\nzlib-compression-level: 3",
        )
        .unwrap();
        assert_eq!(read_path_in_file(&config_path, "key_not_found"), None);
        assert_eq!(
            read_path_in_file(&config_path, "log_level"),
            Some("warn".to_string())
        );
        // only string values are used
        assert_eq!(
            read_path_in_file(&config_path, "zlib-compression-level"),
            None
        );
    }

    #[test]
    fn test_log_format_sources() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "log_format: json").unwrap();
        let config = config_path.to_string_lossy().to_string();

        let cli = args(&["tile-codec", "--log-format", "pretty", "--config", &config]);
        let format = LogFormat::from_args("--log-format", &cli)
            .or_in_config_file_of("--config", "log_format", &cli)
            .or_default(LogFormatOptions::Compact);
        assert_eq!(format, LogFormatOptions::Pretty);

        let cli = args(&["tile-codec", "--config", &config]);
        let format = LogFormat::from_args("--log-format", &cli)
            .or_in_config_file_of("--config", "log_format", &cli)
            .or_default(LogFormatOptions::Compact);
        assert_eq!(format, LogFormatOptions::Json);

        let cli = args(&["tile-codec", &format!("--config={config}")]);
        let format = LogFormat::from_args("--log-format", &cli)
            .or_in_config_file_of("--config", "log_format", &cli)
            .or_default(LogFormatOptions::Compact);
        assert_eq!(format, LogFormatOptions::Json);

        let cli = args(&["tile-codec", "--log-format", "fancy"]);
        let format = LogFormat::from_args("--log-format", &cli)
            .or_env_var("TILE_CODEC_TEST_NOT_EXISTING_VARIABLE")
            .or_default(LogFormatOptions::Full);
        assert_eq!(format, LogFormatOptions::Full);
    }

    #[test]
    fn test_log_level_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "log_level: tile_codec=trace").unwrap();
        let config = config_path.to_string_lossy().to_string();

        let cli = args(&["tile-codec", "--config", &config]);
        let level = LogLevel(None).or_in_config_file_of("--config", "log_level", &cli);
        assert_eq!(level, LogLevel(Some("tile_codec=trace".to_string())));

        let level =
            LogLevel(Some("warn".to_string())).or_in_config_file_of("--config", "log_level", &cli);
        assert_eq!(level, LogLevel(Some("warn".to_string())));

        let cli = args(&["tile-codec", "info", &format!("--config={config}")]);
        let level = LogLevel(None).or_in_config_file_of("--config", "log_level", &cli);
        assert_eq!(level, LogLevel(Some("tile_codec=trace".to_string())));
    }

    #[test]
    fn test_lossy_parse_to_filter_with_default() {
        let filter = LogLevel(Some("info".to_string())).lossy_parse_to_filter_with_default("warn");
        assert_eq!(filter.to_string(), "info");
        let filter = LogLevel(Some("tile_codec=loud".to_string()))
            .lossy_parse_to_filter_with_default("warn");
        assert_eq!(filter.to_string(), "");

        let default_filter = LogLevel(None).lossy_parse_to_filter_with_default("warn");
        assert_eq!(default_filter.to_string(), "warn");
    }

    #[test]
    fn test_format_names() {
        assert_eq!(
            LogFormatOptions::parse("jsonl"),
            Some(LogFormatOptions::Json)
        );
        assert_eq!(
            LogFormatOptions::parse("verbose"),
            Some(LogFormatOptions::Pretty)
        );
        assert_eq!(LogFormatOptions::parse("JSON"), None);
    }
}
