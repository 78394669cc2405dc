use anyhow::Result;

pub use args::{Arguments, Command, ExtractCommand, OutputFormat};
pub use exit_status::ExitStatus;

pub mod args;
mod exit_status;
mod run;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let verbose = args.verbose();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    match args.command {
        Some(Command::Extract(cmd)) => run::extract(cmd, verbose),
        Some(Command::Languages) => run::languages(),
        None => Ok(ExitStatus::Success),
    }
}
