use embassy_time::Instant;
use serde::{Deserialize, Serialize};

/// `KeyboardEvent` is a press or release at a position whose action is stored in the keymap.
///
/// The timestamp is taken when the event is scanned, all timeouts of the action core
/// are measured against event timestamps rather than the wall clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardEvent {
    pub pressed: bool,
    pub pos: KeyboardEventPos,
    pub time: Instant,
}

impl KeyboardEvent {
    pub fn key(row: u8, col: u8, pressed: bool, time: Instant) -> Self {
        Self {
            pressed,
            pos: KeyboardEventPos::Key(KeyPos { row, col }),
            time,
        }
    }

    pub fn rotary_encoder(id: u8, direction: Direction, pressed: bool, time: Instant) -> Self {
        Self {
            pressed,
            pos: KeyboardEventPos::RotaryEncoder(RotaryEncoderPos { id, direction }),
            time,
        }
    }

    /// An event without a position, which only lets time-based state expire
    pub fn tick(time: Instant) -> Self {
        Self {
            pressed: false,
            pos: KeyboardEventPos::Tick,
            time,
        }
    }

    /// Whether the event carries no key transition
    pub fn is_noevent(&self) -> bool {
        self.pos == KeyboardEventPos::Tick
    }
}

/// The position of the keyboard event.
///
/// The position can be either a key (row, col), a rotary encoder (id, direction),
/// or no position at all for ticks.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyboardEventPos {
    Key(KeyPos),
    RotaryEncoder(RotaryEncoderPos),
    Tick,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

/// Event for rotary encoder
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotaryEncoderPos {
    /// The id of the rotary encoder
    pub id: u8,
    /// The direction of the rotary encoder
    pub direction: Direction,
}

/// Holds current rotary encoder direction
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// A clockwise turn
    Clockwise,
    /// A counterclockwise turn
    CounterClockwise,
    /// No change
    None,
}

/// Tap metadata of a key record, computed by the tapping subsystem.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapState {
    /// 0 for a hold, N for the Nth consecutive tap
    pub count: u8,
    /// Another key was pressed while this one was down
    pub interrupted: bool,
}

impl TapState {
    pub const HOLD: Self = Self {
        count: 0,
        interrupted: false,
    };

    pub const fn tap(count: u8) -> Self {
        Self {
            count,
            interrupted: false,
        }
    }
}

/// A key event with its tap metadata, ready to be dispatched
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyRecord {
    pub event: KeyboardEvent,
    pub tap: TapState,
    /// Keycode resolved by combo detection, takes precedence over the keymap position
    pub keycode: Option<u16>,
}

impl KeyRecord {
    pub fn new(event: KeyboardEvent, tap: TapState) -> Self {
        Self {
            event,
            tap,
            keycode: None,
        }
    }
}
