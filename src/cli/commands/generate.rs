use crate::cli::PipelineArgs;
use crate::cli::ui;
use crate::core::{FingerprintRequest, FingerprintResponse};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "generate", about = "Compute the fingerprint of this device")]
pub struct GenerateCommand {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Print the whole fingerprint as JSON
    #[arg(long)]
    pub json: bool,

    /// Prefix the digest with its algorithm version
    #[arg(long)]
    pub tagged: bool,
}

/// Exits non-zero when the run fails or is cancelled; the error state has
/// already been printed by then
pub async fn execute(command: GenerateCommand) -> anyhow::Result<ExitCode> {
    let pipeline = command.pipeline.build().await?;
    let service = pipeline.service;

    let cancel = CancellationToken::new();
    let request = FingerprintRequest::new(pipeline.config).with_cancel(cancel.clone());

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Loading");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut states = service.subscribe();
    let progress = spinner.clone();
    let watcher = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let name = states.borrow_and_update().name();
            progress.set_message(format!("Loading ({})", name));
        }
    });

    let response = service.request_fingerprint(request).await;
    watcher.abort();
    ctrl_c.abort();
    spinner.finish_and_clear();

    match response {
        FingerprintResponse::Ready(fingerprint) => {
            if command.json {
                println!("{}", serde_json::to_string_pretty(&fingerprint)?);
            } else if command.tagged {
                println!("{}", fingerprint.tagged());
            } else {
                ui::display_state(&service.display_state());
            }
            Ok(ExitCode::SUCCESS)
        }
        FingerprintResponse::Failed(e) => {
            tracing::debug!("Generate failed: {:?}", e);
            ui::display_state(&service.display_state());
            Ok(ExitCode::FAILURE)
        }
        FingerprintResponse::Cancelled => {
            ui::display_warning("Fingerprint request cancelled");
            Ok(ExitCode::from(130))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pipeline_args(
        config: &tempfile::NamedTempFile,
        snapshot: &tempfile::NamedTempFile,
    ) -> PipelineArgs {
        PipelineArgs {
            config: Some(config.path().to_path_buf()),
            algorithm: None,
            layout: None,
            timeout_ms: Some(100),
            snapshot: Some(snapshot.path().to_path_buf()),
            remote_serial: None,
            no_cache: true,
        }
    }

    fn json_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[tokio::test]
    async fn test_failed_run_exits_without_error() {
        let config = json_file(r#"{ "algorithmVersion": 42 }"#);
        let snapshot = json_file(r#"{ "capabilities": ["navigator"] }"#);

        let code = execute(GenerateCommand {
            pipeline: pipeline_args(&config, &snapshot),
            json: false,
            tagged: false,
        })
        .await
        .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_ready_run_succeeds() {
        let config = json_file("{}");
        let snapshot = json_file(r#"{ "capabilities": ["navigator"] }"#);

        let code = execute(GenerateCommand {
            pipeline: pipeline_args(&config, &snapshot),
            json: false,
            tagged: true,
        })
        .await
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }
}
