//! Action application.
//!
//! Mutates the desired-output accumulator of the current cycle. Latching
//! writes only the persistent latch mask, which seeds the next cycle's
//! digital outputs; blinking is started elsewhere on a rising edge and is a
//! no-op here.

use plcbox_common::board::{DigitalOutputs, OutputCommand};
use plcbox_common::rules::{Action, DigitalMode};

/// Apply `actions` in order.
pub fn apply(actions: &[Action], accumulator: &mut OutputCommand, latched: &mut DigitalOutputs) {
    for action in actions {
        apply_one(action, accumulator, latched);
    }
}

#[inline]
fn apply_one(action: &Action, accumulator: &mut OutputCommand, latched: &mut DigitalOutputs) {
    match *action {
        Action::DigitalOut { port, mode } => {
            let bit = DigitalOutputs::port(port);
            match mode {
                DigitalMode::SetState(true) => accumulator.digital.insert(bit),
                DigitalMode::SetState(false) => {
                    accumulator.digital.remove(bit);
                    latched.remove(bit);
                }
                DigitalMode::LatchOn => latched.insert(bit),
                DigitalMode::Blink { .. } => {}
            }
        }
        Action::AnalogOut { port, value } => accumulator.set_analog(port, value),
    }
}
