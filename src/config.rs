use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_YIELD_MICROS: u64 = 1_000;

#[derive(Parser, Debug)]
#[command(version, about = "Play a Game Boy ROM in the terminal", long_about = None)]
pub struct Args {
    /// Path to the ROM that should be used
    pub rom: PathBuf,

    #[arg(
        long,
        default_value_t = DEFAULT_YIELD_MICROS,
        help = "Microseconds to sleep between frames (0 just yields)"
    )]
    pub yield_micros: u64,
}

impl Args {
    pub fn idle(&self) -> Duration {
        Duration::from_micros(self.yield_micros)
    }
}
