mod cli;
mod logging;
mod monitor;

use clap::Parser;

use crate::cli::Cli;

fn main() -> skidpad_controllers::Result<()> {
    let cli = Cli::parse();
    logging::setup(cli.verbose, cli.no_color);
    monitor::run(&cli)
}
