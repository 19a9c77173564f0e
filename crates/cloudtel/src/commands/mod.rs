//! Command dispatch: bridges CLI args -> core services -> output formatting.

pub mod acquire;
pub mod config_cmd;
pub mod diagnose;
pub mod readings;
pub mod status;
pub mod util;

use clap::CommandFactory;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        // Cloud-bound
        Command::Run(args) => acquire::run(args, global).await,
        Command::Poll => acquire::poll(global).await,
        Command::Raw => diagnose::raw(global).await,
        Command::Spec => diagnose::spec(global).await,
        Command::Compare => diagnose::compare(global).await,

        // Local: store and config file only
        Command::Status => status::handle(global).await,
        Command::Readings(args) => readings::handle(args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),

        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "cloudtel", &mut std::io::stdout());
            Ok(())
        }
    }
}
