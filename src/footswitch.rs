//! Wired footswitch debounce machine.
//!
//! Two switches step the preset: switch 1 down, switch 2 up. Inputs are
//! active-low and sampled periodically; after a press the machine holds
//! off until the switch reads released for a run of consecutive
//! samples, so contact bounce never double-fires.

use crate::config::FOOTSWITCH_RELEASE_SAMPLES;

/// Relative preset movement requested by a footswitch press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PresetStep {
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    /// Pressed switch must release before re-arming.
    WaitRelease(PresetStep),
}

/// Sampled state for both switches; feed [`Footswitches::sample`] every
/// `FOOTSWITCH_SAMPLE_MS`.
pub struct Footswitches {
    state: State,
    release_count: u32,
}

impl Footswitches {
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            release_count: 0,
        }
    }

    /// Advance one sample period. `down_pressed` / `up_pressed` are the
    /// debounced-raw switch levels (already inverted from active-low).
    /// Returns at most one step per press.
    pub fn sample(&mut self, down_pressed: bool, up_pressed: bool) -> Option<PresetStep> {
        match self.state {
            State::Idle => {
                // Switch 1 wins if both close in the same sample.
                let step = if down_pressed {
                    PresetStep::Down
                } else if up_pressed {
                    PresetStep::Up
                } else {
                    return None;
                };
                self.state = State::WaitRelease(step);
                self.release_count = 0;
                Some(step)
            }
            State::WaitRelease(step) => {
                let still_pressed = match step {
                    PresetStep::Down => down_pressed,
                    PresetStep::Up => up_pressed,
                };
                if still_pressed {
                    self.release_count = 0;
                } else {
                    self.release_count += 1;
                    if self.release_count >= FOOTSWITCH_RELEASE_SAMPLES {
                        self.state = State::Idle;
                    }
                }
                None
            }
        }
    }
}
