//! Board input and output types.
//!
//! - `BoardInputs` - one full sample of a board's inputs
//! - `OutputCommand` - the digital and analog levels commanded to a board
//! - `DigitalInputs` / `DigitalOutputs` - typed bit masks, port `p` on bit `p-1`

use crate::consts::DIGITAL_INPUT_MASK;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Digital input mask (ports 1..=5).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DigitalInputs: u8 {
        /// Input 1
        const IN1 = 1 << 0;
        /// Input 2
        const IN2 = 1 << 1;
        /// Input 3
        const IN3 = 1 << 2;
        /// Input 4
        const IN4 = 1 << 3;
        /// Input 5
        const IN5 = 1 << 4;
    }
}

bitflags! {
    /// Digital output mask (ports 1..=8).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DigitalOutputs: u8 {
        /// Output 1
        const OUT1 = 1 << 0;
        /// Output 2
        const OUT2 = 1 << 1;
        /// Output 3
        const OUT3 = 1 << 2;
        /// Output 4
        const OUT4 = 1 << 3;
        /// Output 5
        const OUT5 = 1 << 4;
        /// Output 6
        const OUT6 = 1 << 5;
        /// Output 7
        const OUT7 = 1 << 6;
        /// Output 8
        const OUT8 = 1 << 7;
    }
}

impl DigitalInputs {
    /// Mask with only the bit of a 1-indexed input port.
    #[inline]
    pub const fn port(port: u8) -> Self {
        Self::from_bits_truncate(port_bit(port))
    }

    /// State of a 1-indexed input port.
    #[inline]
    pub const fn is_on(self, port: u8) -> bool {
        self.bits() & port_bit(port) != 0
    }
}

impl DigitalOutputs {
    /// Mask with only the bit of a 1-indexed output port.
    #[inline]
    pub const fn port(port: u8) -> Self {
        Self::from_bits_retain(port_bit(port))
    }

    /// State of a 1-indexed output port.
    #[inline]
    pub const fn is_on(self, port: u8) -> bool {
        self.bits() & port_bit(port) != 0
    }
}

/// Bit of a 1-indexed port. Ports outside 1..=8 map to no bit.
#[inline]
const fn port_bit(port: u8) -> u8 {
    match port {
        1..=8 => 1 << (port - 1),
        _ => 0,
    }
}

/// One full sample of a board's inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInputs {
    /// Digital inputs (5-bit mask).
    pub digital: DigitalInputs,
    /// Analog input 1 (0..=255).
    pub analog1: u8,
    /// Analog input 2 (0..=255).
    pub analog2: u8,
    /// Pulse counter 1.
    pub counter1: u16,
    /// Pulse counter 2.
    pub counter2: u16,
}

impl BoardInputs {
    /// Build from a raw digital byte; bits above input 5 are dropped.
    pub fn from_raw(digital: u8, analog1: u8, analog2: u8, counter1: u16, counter2: u16) -> Self {
        Self {
            digital: DigitalInputs::from_bits_truncate(digital & DIGITAL_INPUT_MASK),
            analog1,
            analog2,
            counter1,
            counter2,
        }
    }

    /// Value of a 1-indexed analog input; port 2 selects input 2, anything else input 1.
    #[inline]
    pub const fn analog(&self, port: u8) -> u8 {
        if port == 2 { self.analog2 } else { self.analog1 }
    }
}

/// Digital and analog levels commanded to a board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCommand {
    /// Digital outputs.
    pub digital: DigitalOutputs,
    /// Analog output 1.
    pub analog1: u8,
    /// Analog output 2.
    pub analog2: u8,
}

impl OutputCommand {
    /// All outputs de-energized.
    pub const OFF: Self = Self {
        digital: DigitalOutputs::empty(),
        analog1: 0,
        analog2: 0,
    };

    /// Assign a 1-indexed analog output; port 2 selects output 2, anything else output 1.
    #[inline]
    pub fn set_analog(&mut self, port: u8, value: u8) {
        if port == 2 {
            self.analog2 = value;
        } else {
            self.analog1 = value;
        }
    }

    /// True if either analog level differs from `other`.
    #[inline]
    pub fn analog_differs(&self, other: &Self) -> bool {
        self.analog1 != other.analog1 || self.analog2 != other.analog2
    }
}
