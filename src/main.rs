use std::process::ExitCode;

use account_provisioner::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::AddUser(args) => cli::add_user::run(cli.config.as_deref(), args).await,
        Command::Migrate(args) => cli::migrate::run(cli.config.as_deref(), args).await,
    }
}
