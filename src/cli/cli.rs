use crate::cli::commands::{GenerateCommand, ProbesCommand, ServeCommand};
use crate::client::SerialClient;
use crate::config::FingerprintConfig;
use crate::core::{FingerprintService, ProbeRegistry};
use crate::env::{Environment, HostEnvironment, SnapshotEnvironment};
use crate::model::{Algorithm, SlotLayout};
use crate::probe::builtin;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "devprint", version, about = "Device fingerprinting from environment probes", long_about = None)]
pub struct Cli {
    /// Tracing filter, e.g. `info` or `devprint=debug`
    #[arg(long, global = true, env = "DEVPRINT_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Generate(GenerateCommand),
    Probes(ProbesCommand),
    Serve(ServeCommand),
}

/// Options shared by every command that runs the pipeline
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// JSON configuration file
    #[arg(short, long, env = "DEVPRINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Digest algorithm: rolling32 (1) or sha256 (2)
    #[arg(short, long, env = "DEVPRINT_ALGORITHM")]
    pub algorithm: Option<Algorithm>,

    /// Canonical string layout: fixed-position or legacy-compact
    #[arg(long, env = "DEVPRINT_LAYOUT")]
    pub layout: Option<SlotLayout>,

    /// Timeout for asynchronous probes, in milliseconds
    #[arg(long, env = "DEVPRINT_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Probe a recorded environment snapshot instead of this machine
    #[arg(long, env = "DEVPRINT_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Base URL of a remote serial-number service to probe as well
    #[arg(long, env = "DEVPRINT_REMOTE_SERIAL")]
    pub remote_serial: Option<String>,

    /// Recompute instead of reusing the session's first fingerprint
    #[arg(long)]
    pub no_cache: bool,
}

/// A ready-to-run service and the configuration to run it with
pub struct Pipeline {
    pub service: Arc<FingerprintService>,
    pub config: FingerprintConfig,
}

impl PipelineArgs {
    /// File configuration with command-line overrides applied on top
    pub async fn config(&self) -> anyhow::Result<FingerprintConfig> {
        let mut config = match &self.config {
            Some(path) => FingerprintConfig::load(path).await?,
            None => FingerprintConfig::default(),
        };

        if let Some(algorithm) = self.algorithm {
            config = config.with_algorithm(algorithm);
        }
        if let Some(layout) = self.layout {
            config = config.with_layout(layout);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_default_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(url) = &self.remote_serial {
            config.remote_serial_url = Some(url.clone());
        }
        if self.no_cache {
            config = config.with_session_cache(false);
        }

        Ok(config)
    }

    pub async fn build(&self) -> anyhow::Result<Pipeline> {
        let config = self.config().await?;
        let timeout = config.default_timeout();

        let (mut registry, environment): (ProbeRegistry, Arc<dyn Environment>) =
            match &self.snapshot {
                Some(path) => {
                    tracing::info!("Probing snapshot {}", path.display());
                    (
                        ProbeRegistry::standard_with_timeout(timeout)?,
                        Arc::new(SnapshotEnvironment::load(path).await?),
                    )
                }
                None => (
                    ProbeRegistry::host(timeout)?,
                    Arc::new(HostEnvironment::new()),
                ),
            };

        if let Some(url) = &config.remote_serial_url {
            let client = SerialClient::with_timeout(url.as_str(), timeout);
            registry.register(builtin::remote_serial_number(client, timeout))?;
        }

        tracing::debug!(
            "Pipeline ready: {} probes, algorithm v{}",
            registry.len(),
            config.algorithm_version
        );

        Ok(Pipeline {
            service: Arc::new(FingerprintService::new(registry, environment)),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_overrides() {
        let cli = Cli::try_parse_from([
            "devprint",
            "--log-level",
            "debug",
            "generate",
            "--algorithm",
            "rolling32",
            "--layout",
            "legacy",
            "--timeout-ms",
            "250",
            "--no-cache",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        let Commands::Generate(command) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(command.pipeline.algorithm, Some(Algorithm::Rolling32));
        assert_eq!(command.pipeline.layout, Some(SlotLayout::LegacyCompact));
        assert_eq!(command.pipeline.timeout_ms, Some(250));
        assert!(command.pipeline.no_cache);
    }

    #[tokio::test]
    async fn test_overrides_apply_over_defaults() {
        let args = PipelineArgs {
            config: None,
            algorithm: Some(Algorithm::Rolling32),
            layout: None,
            timeout_ms: Some(50),
            snapshot: None,
            remote_serial: Some("http://10.0.0.2:3000".to_string()),
            no_cache: true,
        };

        let config = args.config().await.unwrap();
        assert_eq!(config.algorithm_version, 1);
        assert_eq!(config.layout, SlotLayout::FixedPosition);
        assert_eq!(config.default_timeout_ms, 50);
        assert!(!config.session_cache);
        assert_eq!(
            config.remote_serial_url.as_deref(),
            Some("http://10.0.0.2:3000")
        );
    }

    #[tokio::test]
    async fn test_snapshot_pipeline_uses_standard_probes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{ "capabilities": ["navigator"], "signals": { "user_agent": "Mozilla/5.0" } }"#,
        )
        .unwrap();

        let args = PipelineArgs {
            config: None,
            algorithm: None,
            layout: None,
            timeout_ms: Some(100),
            snapshot: Some(file.path().to_path_buf()),
            remote_serial: None,
            no_cache: false,
        };

        let pipeline = args.build().await.unwrap();
        let standard = ProbeRegistry::standard().unwrap();
        assert_eq!(pipeline.service.registry().len(), standard.len());

        let fingerprint = pipeline.service.fingerprint(pipeline.config).await.unwrap();
        assert!(fingerprint.canonical.starts_with("user_agent:Mozilla/5.0|"));
    }
}
