//! Bilateral combinations.
//!
//! Mod-tap keys held on one hand form a chord. A key from the other hand pressed during
//! the chord is taken as fast typing: the chord is replayed as taps instead of applying
//! its modifiers. Modifiers of a chord reach the host through a deferred callback, or
//! when a key is pressed after the configured time window.

use embassy_time::{Duration, Instant};
use heapless::Vec;
use rmk_action_types::keycode::HidKeyCode;
use rmk_action_types::modifier::HidModifiers;

use crate::config::BILATERAL_CHORD_MAX;
use crate::event::{KeyPos, KeyboardEvent, KeyboardEventPos};
use crate::host::{ActionHost, DeferredToken};
use crate::keyboard::Keyboard;

/// Which half of the keyboard a key is on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    /// The hand of a position in a `rows` x `cols` matrix.
    ///
    /// Split keyboards are split by rows. Otherwise the longer dimension of the matrix is split.
    /// Returns `None` for positions outside the matrix.
    pub fn of(pos: KeyboardEventPos, rows: usize, cols: usize, split: bool) -> Option<Hand> {
        let KeyboardEventPos::Key(KeyPos { row, col }) = pos else {
            return None;
        };
        let (row, col) = (row as usize, col as usize);
        if row >= rows || col >= cols {
            return None;
        }
        let left = if !split && cols > rows {
            col < cols / 2
        } else {
            row < rows / 2
        };
        Some(if left { Hand::Left } else { Hand::Right })
    }
}

#[derive(Debug)]
pub(crate) struct BilateralState {
    /// A chord is being held
    pub(crate) active: bool,
    /// The key which started the chord
    anchor: KeyboardEventPos,
    /// Modifiers of the key which started the chord
    anchor_mods: HidModifiers,
    /// Tap keys of the chord, in press order
    chord_taps: Vec<HidKeyCode, BILATERAL_CHORD_MAX>,
    /// Modifiers of the held keys of the chord
    pub(crate) chord_mods: HidModifiers,
    hand: Hand,
    /// The chord is committed, either as modifiers or as taps
    pub(crate) registered: bool,
    /// When the chord started
    time: Instant,
    /// Pending deferred registration of the chord's modifiers
    defer_token: Option<DeferredToken>,
}

impl Default for BilateralState {
    fn default() -> Self {
        Self {
            active: false,
            anchor: KeyboardEventPos::Tick,
            anchor_mods: HidModifiers::new(),
            chord_taps: Vec::new(),
            chord_mods: HidModifiers::new(),
            hand: Hand::Left,
            registered: false,
            time: Instant::from_ticks(0),
            defer_token: None,
        }
    }
}

impl<H: ActionHost, const ROW: usize, const COL: usize, const NUM_ENCODER: usize> Keyboard<H, ROW, COL, NUM_ENCODER> {
    fn hand_of(&self, pos: KeyboardEventPos) -> Option<Hand> {
        Hand::of(pos, ROW, COL, self.behavior.bilateral.split)
    }

    /// A mod-tap key is held
    pub(crate) fn bilateral_hold(&mut self, event: KeyboardEvent, tap_key: HidKeyCode, mods: HidModifiers) {
        debug!("Bilateral hold: {:?}, {:?}", event.pos, mods);
        let Some(hand) = self.hand_of(event.pos) else {
            // Keys without a hand never join a chord
            self.register_mods(mods);
            return;
        };

        if !self.bilateral.active {
            let state = &mut self.bilateral;
            state.active = true;
            state.anchor = event.pos;
            state.anchor_mods = mods;
            state.chord_taps.clear();
            // The chord is never empty here, the push can't fail
            let _ = state.chord_taps.push(tap_key);
            state.chord_mods = mods;
            state.hand = hand;
            state.registered = false;
            state.time = event.time;
        } else if hand == self.bilateral.hand {
            let capacity = self.behavior.bilateral.chord_capacity();
            let state = &mut self.bilateral;
            if !state.registered && state.chord_taps.len() < capacity && state.chord_taps.push(tap_key).is_ok() {
                state.chord_mods |= mods;
            } else {
                debug!("Bilateral chord is full or committed, holding {:?} as plain mods", mods);
                self.register_mods(mods);
            }
        } else {
            // A key on the other hand: the chord was typed, not held
            self.bilateral_tap_chord();
            self.tap_code(tap_key);
            self.bilateral_cancel_deferred();
            return;
        }
        self.bilateral_schedule();
    }

    /// A held mod-tap key is released
    pub(crate) fn bilateral_release(&mut self, event: KeyboardEvent, mods: HidModifiers) {
        debug!("Bilateral release: {:?}, {:?}", event.pos, mods);
        // Keys without a hand hold plain modifiers outside of the chord
        if self.bilateral.active && self.hand_of(event.pos).is_some() {
            if event.pos == self.bilateral.anchor {
                self.bilateral.active = false;
                self.bilateral_cancel_deferred();
            } else if mods == self.bilateral.anchor_mods {
                // Another key of the chord with the same modifiers, the anchor still holds them
                return;
            }
            self.bilateral.chord_mods &= !mods;
        }
        self.unregister_mods(mods);
    }

    /// A key is tapped while a chord may be held
    pub(crate) fn bilateral_tap(&mut self, event: KeyboardEvent) {
        if !self.bilateral.active {
            return;
        }
        let Some(hand) = self.hand_of(event.pos) else {
            return;
        };
        debug!("Bilateral tap: {:?}", event.pos);

        let config = self.behavior.bilateral;
        let mut threshold = if hand == self.bilateral.hand {
            config.same_sided
        } else {
            config.crossover
        };

        // A window of zero always replays the chord
        if threshold.is_none_or(|t| t.as_ticks() > 0) {
            let chord_mods = self.bilateral.chord_mods;
            if chord_mods.intersects(config.defer_mask) && chord_mods == self.bilateral.anchor_mods {
                threshold = max_window(threshold, config.defer_mods);
            }
            if let Some(threshold) = threshold {
                if event.time.saturating_duration_since(self.bilateral.time) > threshold {
                    self.bilateral_register_mods();
                    return;
                }
            }
        }

        self.bilateral_tap_chord();
    }

    /// Commit the chord as held modifiers
    fn bilateral_register_mods(&mut self) {
        if !self.bilateral.registered {
            debug!("Bilateral chord registered as mods: {:?}", self.bilateral.chord_mods);
            self.bilateral.registered = true;
            self.register_mods(self.bilateral.chord_mods);
        }
    }

    /// Commit the chord as taps of its keys
    fn bilateral_tap_chord(&mut self) {
        if !self.bilateral.registered {
            debug!("Bilateral chord replayed as taps: {:?}", self.bilateral.chord_taps);
            self.bilateral.registered = true;
            // Modifiers registered by keys of the chord
            self.clear_mods();
            let taps = self.bilateral.chord_taps.clone();
            for key in taps {
                self.tap_code(key);
            }
        }
    }

    fn bilateral_schedule(&mut self) {
        if self.bilateral.defer_token.is_some() {
            return;
        }
        let delay = if self.bilateral.chord_mods.intersects(self.behavior.bilateral.defer_mask) {
            self.behavior.bilateral.defer_mods
        } else {
            // Next cycle
            Some(Duration::from_millis(1))
        };
        if let Some(delay) = delay {
            self.bilateral.defer_token = self.host.defer(delay);
        }
    }

    fn bilateral_cancel_deferred(&mut self) {
        if let Some(token) = self.bilateral.defer_token.take() {
            self.host.cancel_deferred(token);
        }
    }

    /// Run a deferred callback scheduled through [`crate::host::DeferredExecutor::defer`]
    pub fn run_deferred(&mut self, token: DeferredToken) {
        if self.bilateral.defer_token != Some(token) {
            warn!("Unknown deferred token: {:?}", token);
            return;
        }
        self.bilateral.defer_token = None;
        if !self.bilateral.registered {
            debug!("Bilateral deferred mods: {:?}", self.bilateral.chord_mods);
            self.register_mods(self.bilateral.chord_mods);
        }
    }
}

/// The longer of two windows, `None` is infinite
fn max_window(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        _ => None,
    }
}
