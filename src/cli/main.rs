//! u2net-serve command-line entry point
//!
//! Parses arguments, sets up tracing, resolves and loads the model, then
//! serves HTTP until interrupted.

use super::config::CliConfigBuilder;
use crate::{
    backends::{BackendFactory, DefaultBackendFactory},
    cache::ModelCache,
    config::{BackendType, ServerConfig, DEFAULT_PORT},
    download::ModelDownloader,
    models::{ModelManager, ModelSource},
    processor::BackgroundRemovalProcessor,
    server::{self, AppState},
    tracing_config::{TracingConfig, TracingFormat},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};

/// Background replacement server backed by U2-Net
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "u2net-serve")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host name or address to bind
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Debug mode: verbose logs and error details in 500 responses [default: on]
    #[arg(long, overrides_with = "no_debug")]
    pub debug: bool,

    /// Disable debug mode
    #[arg(long)]
    pub no_debug: bool,

    /// Inference backend
    #[arg(long, value_enum, default_value_t = CliBackend::Tract)]
    pub backend: CliBackend,

    /// Execution provider for the ONNX backend
    #[arg(long, value_enum, default_value_t = CliExecutionProvider::Auto)]
    pub execution_provider: CliExecutionProvider,

    /// Number of intra-op inference threads (0 = auto-detect)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Path to an ONNX model file (skips the cache)
    #[arg(short, long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Model variant to fetch from the cache
    #[arg(long, value_enum, default_value_t = CliModelKind::U2net)]
    pub model_kind: CliModelKind,

    /// Use custom cache directory
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Fail instead of downloading a model that is not cached
    #[arg(long)]
    pub no_download: bool,

    /// Expected SHA-256 (hex) of a downloaded model
    #[arg(long, env = "U2NET_MODEL_SHA256", value_name = "HEX")]
    pub model_sha256: Option<String>,

    /// Background color as R,G,B
    #[arg(long, value_name = "R,G,B", default_value = "83,40,130", value_parser = parse_background)]
    pub background: [u8; 3],

    /// Maximum upload size in MiB
    #[arg(long, default_value_t = 32)]
    pub max_upload_mb: usize,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,
}

impl Cli {
    /// Debug mode after resolving `--debug` / `--no-debug`
    #[must_use]
    pub fn debug_enabled(&self) -> bool {
        self.debug || !self.no_debug
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliBackend {
    Tract,
    Onnx,
    Mock,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliExecutionProvider {
    Auto,
    Cpu,
    Cuda,
    #[value(name = "coreml")]
    CoreMl,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliModelKind {
    U2net,
    U2netp,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Parse an `R,G,B` triple
fn parse_background(value: &str) -> std::result::Result<[u8; 3], String> {
    let channels: Vec<&str> = value.split(',').map(str::trim).collect();
    let [r, g, b] = channels.as_slice() else {
        return Err(format!("expected R,G,B, got '{value}'"));
    };

    let parse = |channel: &str| {
        channel
            .parse::<u8>()
            .map_err(|_| format!("'{channel}' is not a value between 0 and 255"))
    };
    Ok([parse(r)?, parse(g)?, parse(b)?])
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli).context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::from_cli(&cli).context("Invalid configuration")?;
    run(config).await
}

/// Load the model described by `config` and serve until Ctrl-C
///
/// # Errors
/// - Model resolution, download or load failures
/// - Bind or accept loop failures
pub async fn run(config: ServerConfig) -> Result<()> {
    info!(
        backend = %config.backend_type,
        model = %config.model_source.display_name(),
        "Starting u2net-serve"
    );

    let model_manager = resolve_model(&config).await?;
    let backend = DefaultBackendFactory
        .create_backend(config.backend_type, model_manager)
        .context("Failed to create inference backend")?;

    let mut processor = BackgroundRemovalProcessor::new(backend, config.background_color);
    let init_config = config.clone();
    let processor = tokio::task::spawn_blocking(move || {
        let load_time = processor.initialize(&init_config)?;
        if let Some(load_time) = load_time {
            debug!(load_ms = load_time.as_millis() as u64, "Model loaded");
        }
        if let Ok(model) = processor.model_info() {
            info!(
                model = %model.name,
                precision = %model.precision,
                size_bytes = model.size_bytes,
                "Model ready"
            );
        }
        Ok::<_, crate::error::RemovalError>(processor)
    })
    .await
    .context("Model loading task panicked")?
    .context("Failed to initialize processor")?;

    server::serve(&config, AppState::new(processor, config.debug))
        .await
        .context("Server error")?;

    Ok(())
}

/// Locate the model file, downloading it into the cache when allowed
async fn resolve_model(config: &ServerConfig) -> Result<Option<ModelManager>> {
    if config.backend_type == BackendType::Mock {
        info!("Mock backend selected, no model loaded");
        return Ok(None);
    }

    let path = match &config.model_source {
        ModelSource::External(path) => path.clone(),
        ModelSource::Downloaded(kind) => {
            let cache = match &config.cache_dir {
                Some(dir) => ModelCache::with_custom_cache_dir(dir)?,
                None => ModelCache::new()?,
            };
            debug!(cache_dir = %cache.get_current_cache_dir().display(), "Using model cache");

            if !cache.is_model_cached(*kind) && !config.allow_download {
                anyhow::bail!(
                    "Model '{}' is not cached at {} and downloads are disabled",
                    kind,
                    cache.model_path(*kind).display()
                );
            }

            ModelDownloader::with_cache(cache)?
                .ensure_model(*kind, kind.default_url(), config.model_sha256.as_deref())
                .await
                .with_context(|| format!("Failed to fetch model '{kind}'"))?
        },
    };

    let manager = ModelManager::from_path(&path, config.model_kind)
        .with_context(|| format!("Failed to open model {}", path.display()))?;
    Ok(Some(manager))
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let format = match cli.log_format {
        CliLogFormat::Console => TracingFormat::Console,
        CliLogFormat::Compact => TracingFormat::Compact,
        #[cfg(feature = "tracing-json")]
        CliLogFormat::Json => TracingFormat::Json,
    };

    TracingConfig::new()
        .with_verbosity(cli.verbose)
        .with_format(format)
        .with_debug(cli.debug_enabled())
        .init()
        .context("Failed to initialize tracing subscriber")?;

    debug!(verbosity = cli.verbose, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_background() {
        assert_eq!(parse_background("83,40,130").unwrap(), [83, 40, 130]);
        assert_eq!(parse_background(" 0, 255 ,7").unwrap(), [0, 255, 7]);
        assert!(parse_background("1,2").is_err());
        assert!(parse_background("1,2,300").is_err());
        assert!(parse_background("a,b,c").is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["u2net-serve"]).unwrap();
        assert_eq!(cli.host, "localhost");
        assert_eq!(cli.backend, CliBackend::Tract);
        assert_eq!(cli.background, [83, 40, 130]);
        assert!(cli.debug_enabled());
    }

    #[test]
    fn test_no_debug_flag() {
        let cli = Cli::try_parse_from(["u2net-serve", "--no-debug"]).unwrap();
        assert!(!cli.debug_enabled());

        let cli = Cli::try_parse_from(["u2net-serve", "--no-debug", "--debug"]).unwrap();
        assert!(cli.debug_enabled());
    }

    #[test]
    fn test_explicit_flags() {
        let cli = Cli::try_parse_from([
            "u2net-serve",
            "--port",
            "9000",
            "--backend",
            "mock",
            "--execution-provider",
            "coreml",
            "--model-kind",
            "u2netp",
            "--background",
            "1,2,3",
            "--model-sha256",
            "deadbeef",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.backend, CliBackend::Mock);
        assert_eq!(cli.execution_provider, CliExecutionProvider::CoreMl);
        assert_eq!(cli.model_kind, CliModelKind::U2netp);
        assert_eq!(cli.background, [1, 2, 3]);
        assert_eq!(cli.model_sha256.as_deref(), Some("deadbeef"));
        assert_eq!(cli.verbose, 2);
    }
}
