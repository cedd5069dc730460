use crate::display::Display;
use crate::input::{Input, KeyAction, Keymap, CONTROLS_HINT};
use crate::latch::ButtonLatch;
use crate::machine::Machine;
use crate::pacing::{Clock, Pacer};
use anyhow::Context;
use log::{debug, trace, warn};
use std::time::Duration;

/// what happened in one pacing iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub elapsed: Duration,
    pub ticks: u64,
    pub capped: bool,
}

/// why the input pump stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pump {
    Continue,
    Exit,
}

/// Keeps a machine roughly in step with the wall clock.
///
/// Every iteration runs as many clock units as the wall time since the last
/// one is worth (but never more than a thirtieth of a second's worth), draws
/// one frame and then forgets all button presses. Presses arrive between
/// iterations, so each one is seen by the machine for exactly one iteration.
pub struct Driver<M: Machine, D: Display, I: Input, C: Clock> {
    machine: M,
    display: D,
    input: I,
    clock: C,
    keymap: Keymap,
    joypad: ButtonLatch,
    pacer: Pacer,
}

impl<M: Machine, D: Display, I: Input, C: Clock> Driver<M, D, I, C> {
    pub fn new(machine: M, display: D, input: I, clock: C, frequency: u64) -> Self {
        let pacer = Pacer::new(frequency, clock.now());
        Driver {
            machine,
            display,
            input,
            clock,
            keymap: Keymap::default(),
            joypad: ButtonLatch::new(),
            pacer,
        }
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn joypad(&self) -> &ButtonLatch {
        &self.joypad
    }

    /// latch every key pressed since the last call. stops at the exit key;
    /// anything queued behind it is dropped
    pub fn pump_input(&mut self) -> anyhow::Result<Pump> {
        for name in self.input.drain_keys().context("reading keyboard")? {
            match self.keymap.resolve(&name) {
                Some(KeyAction::Press(button)) => self.joypad.press(button),
                Some(KeyAction::Exit) => {
                    debug!("exit key pressed");
                    return Ok(Pump::Exit);
                }
                None => trace!("ignoring key {:?}", name),
            }
        }
        Ok(Pump::Continue)
    }

    /// one pacing iteration: step, then draw, then clear the joypad
    pub fn run_frame(&mut self) -> anyhow::Result<FrameReport> {
        let now = self.clock.now();
        let elapsed = self.pacer.elapsed(now);
        let ticks = self.pacer.ticks_due(now);
        let capped = ticks == self.pacer.cap() && ticks > 0;
        if capped {
            warn!("{:?} since the last frame, only running {} ticks", elapsed, ticks);
        }

        for _ in 0..ticks {
            self.machine.step(&self.joypad)?;
        }

        self.display
            .draw(self.machine.screen(), CONTROLS_HINT)
            .context("drawing frame")?;

        // key-ups never arrive, so a press only lasts one frame
        self.joypad.clear();

        self.pacer.mark(now);
        trace!("frame: {:?} elapsed, {} ticks", elapsed, ticks);
        Ok(FrameReport {
            elapsed,
            ticks,
            capped,
        })
    }

    /// clear the output, then run frames until the exit key. `idle` is how
    /// long to give the rest of the system between frames
    pub fn run(&mut self, idle: Duration) -> anyhow::Result<()> {
        self.display.clear().context("clearing screen")?;
        // don't count time spent setting up
        self.pacer.mark(self.clock.now());
        loop {
            if self.pump_input()? == Pump::Exit {
                return Ok(());
            }
            self.run_frame()?;
            if idle.is_zero() {
                std::thread::yield_now();
            } else {
                spin_sleep::sleep(idle);
            }
        }
    }
}
