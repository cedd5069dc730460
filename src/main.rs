use clap::Parser;
use log::info;

use gbterm::config::Args;
use gbterm::display::TermDisplay;
use gbterm::driver::Driver;
use gbterm::input::StdinInput;
use gbterm::machine::{Cartridge, TileViewer, CPU_CLOCK_FREQUENCY};
use gbterm::pacing::MonotonicClock;

fn main() -> anyhow::Result<()> {
    // stdout belongs to the screen, so nothing is logged unless RUST_LOG asks
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
    let args = Args::parse();

    // a bad ROM stops us before the terminal is touched
    let cartridge = Cartridge::load(&args.rom)?;
    let title = cartridge.title().unwrap_or_else(|| "GAME BOY".to_string());
    info!("loaded {} ({} bytes)", title, cartridge.bytes().len());

    let machine = TileViewer::new(cartridge);
    let input = StdinInput::new()?;
    let display = TermDisplay::new(&title)?;
    let mut driver = Driver::new(
        machine,
        display,
        input,
        MonotonicClock::new(),
        CPU_CLOCK_FREQUENCY,
    );
    driver.run(args.idle())?;
    // leave raw mode before printing anything
    drop(driver);

    // shove a newline out so the shell prompt doesn't land on the last frame
    println!();
    Ok(())
}
