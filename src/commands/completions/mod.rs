use std::io::{self, Write};

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};

use crate::config::EXEC_NAME;
use crate::CLI;

#[derive(Debug, Parser)]
#[clap(about = "Generate completion scripts for the specified shell")]
pub struct Options {
    #[clap(name = "shell", help = "The shell to print the completion script for")]
    shell: Shell,
}

pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    generate(shell, &mut CLI::command(), EXEC_NAME, out);
}

pub fn handle(options: &Options) {
    write_completions(options.shell, &mut io::stdout().lock());
}
