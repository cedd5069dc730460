//!
//! ## Design
//!
//! * keep the machine roughly in step with the wall clock, without letting a
//!   stalled host cause a burst of catch-up work
//! * the machine itself is someone else's problem; we only need `step()` and
//!   a screen to look at
//! * abstract display and input so they can be swapped for dummies in tests
//! * the terminal only reports key-downs, never key-ups
//!
//! Model
//!
//! main
//!  |-- args, cartridge(args.rom)
//!  |-- machine(cartridge), display(cartridge.title), input, clock
//!  `-- driver(machine, display, input, clock)
//!       |-- display.clear()
//!       `-- loop
//!            |-- for key in input.drain_keys()
//!            |     q     => return
//!            |     known => joypad.press(button)
//!            |-- ticks = min(frequency * elapsed, frequency / 30)
//!            |-- machine.step(joypad) x ticks
//!            |-- display.draw(machine.screen(), controls)
//!            |-- joypad.clear()    // no key-ups, so a press lasts one frame
//!            `-- sleep a moment
pub mod config;
pub mod display;
pub mod driver;
pub mod input;
pub mod latch;
pub mod machine;
pub mod pacing;
