use clap::Parser;

/// Live monitor for controllers handled by the skidpad input subsystem.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on (logs every axis/button event)
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Play a short rumble on every newly connected device
    #[arg(long)]
    pub rumble_test: bool,
}
