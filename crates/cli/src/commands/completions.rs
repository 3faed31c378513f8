//! completions command - Print shell completion scripts

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use super::Cli;
use crate::exit_code::ExitCode;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: CompletionsArgs) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    write_completions(args.shell, &mut stdout);
    match stdout.flush() {
        Ok(()) => ExitCode::Success,
        Err(_) => ExitCode::GeneralError,
    }
}

/// Completion script of the whole `sd` command tree, drive subcommands included
fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, out);
}
