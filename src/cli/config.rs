//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliBackend, CliExecutionProvider, CliModelKind};
use crate::{
    config::{BackendType, ExecutionProvider, ServerConfig},
    models::{ModelKind, ModelSource},
};
use anyhow::{Context, Result};

/// Convert CLI arguments to a validated `ServerConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    pub(crate) fn from_cli(cli: &Cli) -> Result<ServerConfig> {
        let model_kind = match cli.model_kind {
            CliModelKind::U2net => ModelKind::U2Net,
            CliModelKind::U2netp => ModelKind::U2NetP,
        };

        let backend_type = match cli.backend {
            CliBackend::Tract => BackendType::Tract,
            CliBackend::Onnx => BackendType::Onnx,
            CliBackend::Mock => BackendType::Mock,
        };

        let execution_provider = match cli.execution_provider {
            CliExecutionProvider::Auto => ExecutionProvider::Auto,
            CliExecutionProvider::Cpu => ExecutionProvider::Cpu,
            CliExecutionProvider::Cuda => ExecutionProvider::Cuda,
            CliExecutionProvider::CoreMl => ExecutionProvider::CoreMl,
        };

        let model_source = match &cli.model {
            Some(path) => ModelSource::External(path.clone()),
            None => ModelSource::Downloaded(model_kind),
        };

        let max_upload_bytes = cli
            .max_upload_mb
            .checked_mul(1024 * 1024)
            .context("--max-upload-mb is too large")?;

        ServerConfig::builder()
            .host(cli.host.clone())
            .port(cli.port)
            .debug(cli.debug_enabled())
            .backend_type(backend_type)
            .execution_provider(execution_provider)
            .intra_threads(cli.threads)
            .model_kind(model_kind)
            .model_source(model_source)
            .cache_dir(cli.cache_dir.clone())
            .allow_download(!cli.no_download)
            .model_sha256(cli.model_sha256.clone())
            .background_color(cli.background)
            .max_upload_bytes(max_upload_bytes)
            .build()
            .context("Invalid server configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_from_cli_defaults() {
        let cli = Cli::try_parse_from(["u2net-serve", "--port", "8888"]).unwrap();
        let config = CliConfigBuilder::from_cli(&cli).unwrap();

        assert_eq!(config.port, 8888);
        assert_eq!(config.host, "localhost");
        assert!(config.debug);
        assert_eq!(config.backend_type, BackendType::Tract);
        assert_eq!(config.model_source, ModelSource::Downloaded(ModelKind::U2Net));
        assert_eq!(config.background_color, [83, 40, 130]);
        assert_eq!(config.max_upload_bytes, 32 * 1024 * 1024);
        assert!(config.allow_download);
    }

    #[test]
    fn test_from_cli_external_model() {
        let cli = Cli::try_parse_from([
            "u2net-serve",
            "--model",
            "/models/u2netp.onnx",
            "--model-kind",
            "u2netp",
            "--no-download",
            "--no-debug",
        ])
        .unwrap();
        let config = CliConfigBuilder::from_cli(&cli).unwrap();

        assert_eq!(
            config.model_source,
            ModelSource::External(PathBuf::from("/models/u2netp.onnx"))
        );
        assert_eq!(config.model_kind, ModelKind::U2NetP);
        assert!(!config.allow_download);
        assert!(!config.debug);
    }

    #[test]
    fn test_from_cli_model_sha256() {
        let digest = "0f".repeat(32);
        let cli = Cli::try_parse_from(["u2net-serve", "--model-sha256", &digest]).unwrap();
        let config = CliConfigBuilder::from_cli(&cli).unwrap();
        assert_eq!(config.model_sha256, Some(digest));

        let cli = Cli::try_parse_from(["u2net-serve", "--model-sha256", "not-hex"]).unwrap();
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }

    #[test]
    fn test_from_cli_rejects_port_zero() {
        let cli = Cli::try_parse_from(["u2net-serve", "--port", "0"]).unwrap();
        assert!(CliConfigBuilder::from_cli(&cli).is_err());
    }
}
