//! Routerdesk - admin console backend for MikroTik routers

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use routerdesk_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Cli::command()
        .long_version(concat!(
            env!("GIT_TAG"),
            "\nCommit: ",
            env!("GIT_HASH"),
            "\nBuilt: ",
            env!("BUILD_TIME")
        ))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    routerdesk_cli::init_logging(&cli.log_level)?;

    routerdesk_cli::run(cli).await
}
