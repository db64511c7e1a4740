use std::fs;
use std::io::{Read as _, stdin};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context as _, bail};
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand};
use tile_codec::{
    CompressionMode, CompressionProvider as _, MatrixExtent, PlainTextDelimiter, TileEncoding,
    TileEncodingFormat, TileFormat, TileMatrix,
};
use tile_codec_observability::{LogFormat, LogFormatOptions, LogLevel, TileCodecObservability};
use tracing::{debug, error, info};

/// Defines the styles used for the CLI help output.
const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Blue.on_default().bold())
    .usage(AnsiColor::Blue.on_default().bold())
    .literal(AnsiColor::White.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, PartialEq, Debug)]
#[command(
    version,
    name = "tile-codec",
    about = "Encode and decode tile layer data of Tiled-compatible map files",
    after_help = "Use --log-level or the RUST_LOG environment variable to control logging level, e.g. RUST_LOG=debug or RUST_LOG=tile_codec=debug.",
    styles = HELP_STYLES
)]
struct Args {
    #[command(flatten)]
    format: FormatArgs,
    /// Log directives, e.g. `debug` or `tile_codec=trace`
    #[arg(long, global = true, value_name = "DIRECTIVES")]
    log_level: Option<String>,
    /// How log messages are formatted
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatOptions>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Default, PartialEq, Debug, clap::Args)]
struct FormatArgs {
    /// YAML file with the tile format of the map, overridden by the options below
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Compression of Base64 tile data: none, zlib or zstd
    #[arg(long, global = true)]
    compression: Option<CompressionMode>,
    /// Representation of tile data: base64, csv or plain-text
    #[arg(long, global = true)]
    encoding: Option<TileEncoding>,
    /// Level for the selected compression
    #[arg(long, global = true, allow_negative_numbers = true)]
    level: Option<i32>,
}

#[derive(Subcommand, PartialEq, Debug)]
enum Commands {
    /// Encode a JSON array of tile rows into tile layer data
    #[command(name = "encode")]
    Encode {
        /// JSON file to read, or `-` for stdin
        input: PathBuf,
        /// Separator between tiles of plain-text data
        #[arg(long, value_enum, default_value_t = DelimiterArg::Comma)]
        delimiter: DelimiterArg,
    },
    /// Decode tile layer data into a JSON array of tile rows
    #[command(name = "decode")]
    Decode {
        /// Tile data file to read, or `-` for stdin
        input: PathBuf,
        /// Number of rows of the tile layer
        #[arg(long)]
        rows: usize,
        /// Number of columns of the tile layer
        #[arg(long)]
        cols: usize,
        /// Clear flip and rotation flags written by Tiled
        #[arg(long)]
        tiled: bool,
        /// Print one row per line
        #[arg(long)]
        pretty: bool,
    },
    /// Show the effective tile format and the supported compression levels
    #[command(name = "info")]
    Info,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, clap::ValueEnum)]
enum DelimiterArg {
    Comma,
    Space,
}

impl From<DelimiterArg> for PlainTextDelimiter {
    fn from(value: DelimiterArg) -> Self {
        match value {
            DelimiterArg::Comma => Self::Comma,
            DelimiterArg::Space => Self::Space,
        }
    }
}

impl FormatArgs {
    /// Reads the config file, if any, and applies the command line overrides.
    fn resolve(&self) -> anyhow::Result<TileFormat> {
        let mut format = match &self.config {
            Some(path) => read_config(path)?,
            None => TileFormat::default(),
        };

        if let Some(compression) = self.compression {
            format.compression = compression;
        }
        if let Some(encoding) = self.encoding {
            format.encoding = encoding;
        }
        if let Some(level) = self.level {
            match format.compression {
                CompressionMode::None => bail!("--level requires zlib or zstd compression"),
                CompressionMode::Zlib => format.zlib_compression_level = Some(level),
                CompressionMode::Zstd => format.zstd_compression_level = Some(level),
            }
        }

        format.validate()?;
        Ok(format)
    }
}

fn read_config(path: &Path) -> anyhow::Result<TileFormat> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Unable to read config file {}", path.display()))?;
    let format = serde_yaml::from_str(&contents)
        .with_context(|| format!("Unable to parse config file {}", path.display()))?;
    debug!("Loaded tile format from {}", path.display());
    Ok(format)
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        stdin()
            .read_to_string(&mut input)
            .context("Unable to read from stdin")?;
        Ok(input)
    } else {
        fs::read_to_string(path).with_context(|| format!("Unable to read {}", path.display()))
    }
}

fn init_logging() -> anyhow::Result<()> {
    let filter = LogLevel::from_argument("--log-level")
        .or_in_config_file("--config", "log_level")
        .or_env_var("RUST_LOG")
        .lossy_parse_to_filter_with_default("tile_codec=info");
    let log_format = LogFormat::from_argument("--log-format")
        .or_in_config_file("--config", "log_format")
        .or_env_var("TILE_CODEC_LOG_FORMAT")
        .or_default(LogFormatOptions::Compact);

    TileCodecObservability::from((filter, log_format))
        .with_initialised_log_tracing()?
        .set_global_subscriber()?;
    Ok(())
}

fn main() {
    if let Err(err) = init_logging() {
        eprintln!("Unable to initialize logging: {err}");
    }

    if let Err(err) = main_int() {
        error!("{err:#}");
        process::exit(1);
    }
}

fn main_int() -> anyhow::Result<()> {
    let args = Args::parse();
    let format = args.format.resolve()?;

    match args.command {
        Commands::Encode { input, delimiter } => {
            let matrix: TileMatrix = serde_json::from_str(&read_input(&input)?)
                .context("Input must be a JSON array of rows of tile identifiers")?;
            info!("Encoding {} tile matrix as {format}", matrix.extent());
            println!("{}", format.encode(&matrix, delimiter.into())?);
        }
        Commands::Decode {
            input,
            rows,
            cols,
            tiled,
            pretty,
        } => {
            let extent = MatrixExtent::new(rows, cols);
            let tile_format = if tiled {
                TileEncodingFormat::Tiled
            } else {
                TileEncodingFormat::Tactile
            };
            let matrix = format.decode(&read_input(&input)?, extent, tile_format)?;
            if pretty {
                for row in matrix.rows() {
                    println!("{}", serde_json::to_string(row)?);
                }
            } else {
                println!("{}", serde_json::to_string(&matrix)?);
            }
        }
        Commands::Info => {
            println!("Tile format: {format}");
            for mode in [CompressionMode::Zlib, CompressionMode::Zstd] {
                let compressor = mode.compressor();
                println!(
                    "{mode} levels: {}..={}",
                    compressor.min_compression_level(),
                    compressor.max_compression_level()
                );
            }
        }
    }

    Ok(())
}
