//! Swap hands: read key positions as their mirror positions while swapped.
//!
//! Whether a key is swapped is decided when it's pressed and remembered per position,
//! so the release of a key always reaches the same position as its press.

use embassy_time::{Duration, Instant};
use rmk_action_types::action::{Action, SwapHandsOp};

use crate::config::HandSwapConfig;
use crate::event::{KeyPos, KeyRecord, KeyboardEvent, KeyboardEventPos, TapState};
use crate::host::ActionHost;
use crate::keyboard::Keyboard;

/// One shot swap hands
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwapHandsOneShot {
    #[default]
    Off,
    /// Released, the next key press consumes it
    Active,
    /// The one shot key is down
    Pressed,
    /// Consumed while the one shot key is still down
    Used,
}

pub(crate) struct SwapHandsState<const ROW: usize, const COL: usize, const NUM_ENCODER: usize> {
    config: Option<HandSwapConfig<ROW, COL, NUM_ENCODER>>,
    /// Hands are swapped
    pub(crate) swap_hands: bool,
    /// Swapped provisionally by a swap hands key before its tap is decided
    pub(crate) swap_held: bool,
    pub(crate) oneshot: SwapHandsOneShot,
    pub(crate) oneshot_time: Instant,
    /// Held keys which were swapped when pressed
    matrix_state: [[bool; COL]; ROW],
    /// Held encoders which were swapped when pressed
    encoder_state: [bool; NUM_ENCODER],
}

impl<const ROW: usize, const COL: usize, const NUM_ENCODER: usize> SwapHandsState<ROW, COL, NUM_ENCODER> {
    pub(crate) fn new(config: Option<HandSwapConfig<ROW, COL, NUM_ENCODER>>) -> Self {
        Self {
            config,
            swap_hands: false,
            swap_held: false,
            oneshot: SwapHandsOneShot::Off,
            oneshot_time: Instant::from_ticks(0),
            matrix_state: [[false; COL]; ROW],
            encoder_state: [false; NUM_ENCODER],
        }
    }

    /// Remap the position of the event if hands are swapped
    pub(crate) fn process_hand_swap(&mut self, event: &mut KeyboardEvent) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        let sticky = match event.pos {
            KeyboardEventPos::Key(KeyPos { row, col }) => self
                .matrix_state
                .get_mut(row as usize)
                .and_then(|r| r.get_mut(col as usize)),
            KeyboardEventPos::RotaryEncoder(e) => self.encoder_state.get_mut(e.id as usize),
            KeyboardEventPos::Tick => None,
        };
        // Positions outside the matrix and encoders are never swapped
        let Some(sticky) = sticky else {
            return;
        };

        let swapped = if event.pressed {
            *sticky = self.swap_hands;
            *sticky
        } else {
            // Only held keys keep their swap bit
            core::mem::take(sticky)
        };
        if swapped {
            if let Some(pos) = config.swapped(event.pos) {
                trace!("Swap hands: {:?} -> {:?}", event.pos, pos);
                event.pos = pos;
            }
        }
    }
}

impl<H: ActionHost, const ROW: usize, const COL: usize, const NUM_ENCODER: usize> Keyboard<H, ROW, COL, NUM_ENCODER> {
    pub fn is_swap_hands_on(&self) -> bool {
        self.swap_hands.swap_hands
    }

    pub fn swap_hands_on(&mut self) {
        self.swap_hands.swap_hands = true;
    }

    pub fn swap_hands_off(&mut self) {
        self.swap_hands.swap_hands = false;
    }

    pub fn swap_hands_toggle(&mut self) {
        self.swap_hands.swap_hands = !self.swap_hands.swap_hands;
    }

    pub fn oneshot_swaphands(&self) -> SwapHandsOneShot {
        self.swap_hands.oneshot
    }

    /// Swap hands until the next key press
    pub fn set_oneshot_swaphands(&mut self) {
        self.swap_hands.oneshot = SwapHandsOneShot::Pressed;
        self.swap_hands.swap_hands = true;
        self.swap_hands.oneshot_time = self.now;
    }

    /// The one shot swap hands key is released
    pub fn release_oneshot_swaphands(&mut self) {
        match self.swap_hands.oneshot {
            SwapHandsOneShot::Pressed => self.swap_hands.oneshot = SwapHandsOneShot::Active,
            SwapHandsOneShot::Used => self.clear_oneshot_swaphands(),
            _ => {}
        }
    }

    /// Another key is pressed
    pub fn use_oneshot_swaphands(&mut self) {
        match self.swap_hands.oneshot {
            SwapHandsOneShot::Pressed => self.swap_hands.oneshot = SwapHandsOneShot::Used,
            SwapHandsOneShot::Active => self.clear_oneshot_swaphands(),
            _ => {}
        }
    }

    pub fn clear_oneshot_swaphands(&mut self) {
        if matches!(
            self.swap_hands.oneshot,
            SwapHandsOneShot::Active | SwapHandsOneShot::Used
        ) {
            debug!("One shot swap hands cleared");
            self.swap_hands.oneshot = SwapHandsOneShot::Off;
            self.swap_hands.swap_hands = false;
        }
    }

    pub(crate) fn has_oneshot_swaphands_timed_out(&self, timeout: Duration) -> bool {
        self.swap_hands.oneshot == SwapHandsOneShot::Active
            && self.oneshot_elapsed(self.swap_hands.oneshot_time) >= timeout
    }

    /// Swap hands provisionally when a swap hands key is pressed, before its tap is decided.
    ///
    /// Called by the tapping subsystem, the swap is undone or kept once the tap count is known.
    pub fn process_record_tap_hint(&mut self, record: &KeyRecord) {
        if record.event.is_noevent() {
            return;
        }
        if let Action::SwapHands(op) = self.host.action_at(record.event.pos) {
            if op != SwapHandsOp::OneShot {
                self.swap_hands.swap_hands = !self.swap_hands.swap_hands;
                self.swap_hands.swap_held = true;
            }
        }
    }

    pub(crate) fn process_action_swap_hands(&mut self, record: &mut KeyRecord, op: SwapHandsOp) {
        let pressed = record.event.pressed;
        let tap_count = record.tap.count;
        let state = &mut self.swap_hands;
        match op {
            SwapHandsOp::Toggle => {
                if pressed {
                    state.swap_hands = !state.swap_hands;
                }
            }
            SwapHandsOp::OnOff => state.swap_hands = pressed,
            SwapHandsOp::OffOn => state.swap_hands = !pressed,
            SwapHandsOp::On => {
                if !pressed {
                    state.swap_hands = true;
                }
            }
            SwapHandsOp::Off => {
                if !pressed {
                    state.swap_hands = false;
                }
            }
            SwapHandsOp::OneShot => {
                if pressed {
                    self.set_oneshot_swaphands();
                } else {
                    self.release_oneshot_swaphands();
                }
            }
            SwapHandsOp::TapToggle => {
                if pressed {
                    if state.swap_held {
                        state.swap_held = false;
                    } else {
                        state.swap_hands = !state.swap_hands;
                    }
                } else if tap_count < self.behavior.tap_hold.tapping_toggle {
                    state.swap_hands = !state.swap_hands;
                }
            }
            SwapHandsOp::Key(key) => {
                if tap_count > 0 {
                    // A tap undoes the provisional swap
                    if state.swap_held {
                        state.swap_hands = !state.swap_hands;
                        state.swap_held = false;
                    }
                    if pressed {
                        self.register_code(key);
                    } else {
                        let delay = self.behavior.tap_hold.tap_code_delay;
                        self.wait(delay);
                        self.unregister_code(key);
                        record.tap = TapState::default();
                    }
                } else if state.swap_held && !pressed {
                    state.swap_hands = !state.swap_hands;
                    state.swap_held = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_time::Instant;

    use super::*;

    fn press(row: u8, col: u8) -> KeyboardEvent {
        KeyboardEvent::key(row, col, true, Instant::from_ticks(0))
    }

    fn release(row: u8, col: u8) -> KeyboardEvent {
        KeyboardEvent::key(row, col, false, Instant::from_ticks(0))
    }

    #[test]
    fn test_swap_is_sticky_per_key() {
        let mut state: SwapHandsState<1, 4, 0> = SwapHandsState::new(Some(HandSwapConfig::mirror_columns()));
        state.swap_hands = true;

        let mut event = press(0, 0);
        state.process_hand_swap(&mut event);
        assert_eq!(event.pos, KeyboardEventPos::Key(KeyPos { row: 0, col: 3 }));

        // Unswapped while the key is held, the release still goes to the swapped position
        state.swap_hands = false;
        let mut event = release(0, 0);
        state.process_hand_swap(&mut event);
        assert_eq!(event.pos, KeyboardEventPos::Key(KeyPos { row: 0, col: 3 }));

        let mut event = press(0, 1);
        state.process_hand_swap(&mut event);
        assert_eq!(event.pos, KeyboardEventPos::Key(KeyPos { row: 0, col: 1 }));
    }

    #[test]
    fn test_swap_bit_cleared_on_release() {
        let mut state: SwapHandsState<1, 4, 0> = SwapHandsState::new(Some(HandSwapConfig::mirror_columns()));
        state.swap_hands = true;

        let mut event = press(0, 0);
        state.process_hand_swap(&mut event);
        assert!(state.matrix_state[0][0]);

        let mut event = release(0, 0);
        state.process_hand_swap(&mut event);
        assert_eq!(event.pos, KeyboardEventPos::Key(KeyPos { row: 0, col: 3 }));
        assert!(!state.matrix_state[0][0]);

        // A stray release after swapping is turned off isn't remapped
        state.swap_hands = false;
        let mut event = release(0, 0);
        state.process_hand_swap(&mut event);
        assert_eq!(event.pos, KeyboardEventPos::Key(KeyPos { row: 0, col: 0 }));
    }

    #[test]
    fn test_out_of_range_is_not_swapped() {
        let mut state: SwapHandsState<1, 4, 0> = SwapHandsState::new(Some(HandSwapConfig::mirror_columns()));
        state.swap_hands = true;
        let mut event = press(2, 0);
        state.process_hand_swap(&mut event);
        assert_eq!(event.pos, KeyboardEventPos::Key(KeyPos { row: 2, col: 0 }));

        let mut event = KeyboardEvent::tick(Instant::from_ticks(0));
        state.process_hand_swap(&mut event);
        assert!(event.is_noevent());
    }
}
