use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<ExitCode> {
    let cli = clubsite::cli::Cli::parse();
    let default_filter = match cli.command {
        clubsite::cli::Command::Serve(_) => clubsite::logging::SERVE_FILTER,
        _ => "info",
    };
    clubsite::logging::init(default_filter).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        clubsite::cli::Command::Build(args) => {
            let report = tokio::task::block_in_place(|| clubsite::build::run(args))
                .context("build")?;
            if !report.all_succeeded() {
                return Ok(ExitCode::FAILURE);
            }
        }
        clubsite::cli::Command::Watch(args) => {
            clubsite::watch::run(args).await.context("watch")?;
        }
        clubsite::cli::Command::Serve(args) => {
            clubsite::serve::run(args).await.context("serve")?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
