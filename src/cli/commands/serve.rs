use crate::cli::PipelineArgs;
use crate::cli::ui;
use crate::device::SystemSerialSource;
use crate::model::DEFAULT_HTTP_PORT;
use crate::server::{FingerprintServer, ServerState};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "serve", about = "Serve the serial-number and fingerprint API")]
pub struct ServeCommand {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    #[arg(short, long, env = "DEVPRINT_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub port: u16,

    #[cfg(feature = "https")]
    #[arg(long)]
    pub https: bool,
}

pub async fn execute(command: ServeCommand) -> anyhow::Result<()> {
    #[cfg(feature = "https")]
    let https_enabled = command.https;
    #[cfg(not(feature = "https"))]
    let https_enabled = false;

    let pipeline = command.pipeline.build().await?;
    let state = ServerState::new(
        pipeline.service,
        Arc::new(SystemSerialSource),
        pipeline.config,
    );

    let mut server = FingerprintServer::new(state, command.port, https_enabled);

    #[cfg(feature = "https")]
    if https_enabled {
        let local_ip = crate::device::get_local_ip().await.ok().map(|ip| ip.to_string());
        let mut hosts = vec!["localhost"];
        hosts.extend(local_ip.as_deref());
        let cert = crate::crypto::generate_tls_certificate(&hosts)?;
        ui::display_info(&format!("TLS certificate fingerprint: {}", cert.fingerprint));
        server.set_tls_certificate(cert);
    }

    server.start().await?;

    let scheme = if https_enabled { "https" } else { "http" };
    ui::display_success(&format!(
        "Listening on {}://0.0.0.0:{} (GET /api/uuid, GET /api/fingerprint)",
        scheme, command.port
    ));
    ui::display_info("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    server.stop();
    ui::display_info("Server stopped");

    Ok(())
}
