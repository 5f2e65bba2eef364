use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    folio_admin::logging::init().context("init logging")?;
    folio_admin::config::load_dotenv();

    let cli = folio_admin::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        folio_admin::cli::Command::Show(args) => {
            folio_admin::commands::show(args).await.context("show")?;
        }
        folio_admin::cli::Command::AddUser(args) => {
            folio_admin::commands::add_user(args)
                .await
                .context("add-user")?;
        }
        folio_admin::cli::Command::Upload(args) => {
            folio_admin::commands::upload(args).await.context("upload")?;
        }
    }

    Ok(())
}
