use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    #[cfg(feature = "https")]
    {
        use rustls::crypto::ring::default_provider;
        default_provider().install_default().ok();
    }

    use clap::Parser;
    use devprint::cli::{Cli, Commands};
    use devprint::cli::{run_generate, run_probes, run_serve};

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(cli.log_level.as_str())
        .init();

    match cli.command {
        Commands::Generate(cmd) => {
            return run_generate(cmd).await;
        }
        Commands::Probes(cmd) => {
            run_probes(cmd).await?;
        }
        Commands::Serve(cmd) => {
            run_serve(cmd).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
