//! Shell completion generation command.

use crate::cli::Cli;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io;

/// Generates shell completions for the specified shell.
///
/// # Arguments
///
/// * `shell` - Target shell (bash, zsh, fish, powershell, elvish)
///
/// # Examples
///
/// ```no_run
/// use clap_complete::Shell;
/// use filearc_cli::commands::completion;
///
/// completion::execute(Shell::Bash);
/// ```
pub fn execute(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "filearc", &mut io::stdout());
}
