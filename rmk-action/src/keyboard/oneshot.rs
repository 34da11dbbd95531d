//! One shot modifiers and one shot layer.
//!
//! A one shot key stays pending after it's released, and is consumed by the next key
//! press. Both tracks expire after `OneShotConfig::timeout`.

use bitfield_struct::bitfield;
use embassy_time::{Duration, Instant};
use rmk_action_types::modifier::HidModifiers;

use crate::event::KeyRecord;
use crate::host::ActionHost;
use crate::keyboard::Keyboard;

/// Conditions which keep a one shot layer alive.
///
/// The layer is turned off when the last of `pressed` and `other_key_pressed` is cleared,
/// unless it's `toggled`.
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Eq, PartialEq)]
pub struct OneShotLayerState {
    /// Waiting for the one shot key to be released
    #[bits(1)]
    pub pressed: bool,
    /// Waiting for another key to be pressed
    #[bits(1)]
    pub other_key_pressed: bool,
    /// Locked by tap toggle
    #[bits(1)]
    pub toggled: bool,
    #[bits(5)]
    _reserved: u8,
}

impl OneShotLayerState {
    pub const PRESSED: Self = Self::new().with_pressed(true);
    pub const OTHER_KEY_PRESSED: Self = Self::new().with_other_key_pressed(true);
    pub const START: Self = Self::new().with_pressed(true).with_other_key_pressed(true);
    pub const TOGGLED: Self = Self::new().with_toggled(true);

    /// The phase of the one shot layer
    pub fn phase(self) -> OneShotLayerPhase {
        if self.toggled() {
            OneShotLayerPhase::Toggled
        } else {
            match (self.pressed(), self.other_key_pressed()) {
                (true, true) => OneShotLayerPhase::Started,
                (true, false) => OneShotLayerPhase::Pressed,
                (false, true) => OneShotLayerPhase::OtherKeyPressed,
                (false, false) => OneShotLayerPhase::Idle,
            }
        }
    }
}

/// Phases of the one shot layer, named after what the layer is still waiting for
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneShotLayerPhase {
    /// No one shot layer
    Idle,
    /// The one shot key is down, no other key has been pressed
    Started,
    /// Another key consumed the layer, it ends when the one shot key is released
    Pressed,
    /// The one shot key is released, the layer ends with the next key press
    OtherKeyPressed,
    /// Locked until the one shot key is pressed again
    Toggled,
}

#[derive(Debug)]
pub(crate) struct OneShotState {
    /// Pending one shot modifiers, sent with the next key
    pub(crate) mods: HidModifiers,
    pub(crate) mods_time: Instant,
    /// Modifiers locked by tap toggle
    pub(crate) locked_mods: HidModifiers,
    layer: u8,
    layer_state: OneShotLayerState,
    layer_time: Instant,
}

impl Default for OneShotState {
    fn default() -> Self {
        Self {
            mods: HidModifiers::new(),
            mods_time: Instant::from_ticks(0),
            locked_mods: HidModifiers::new(),
            layer: 0,
            layer_state: OneShotLayerState::new(),
            layer_time: Instant::from_ticks(0),
        }
    }
}

impl OneShotState {
    pub(crate) fn layer(&self) -> u8 {
        self.layer
    }

    pub(crate) fn layer_state(&self) -> OneShotLayerState {
        self.layer_state
    }

    pub(crate) fn is_layer_active(&self) -> bool {
        self.layer_state.into_bits() != 0
    }
}

impl<H: ActionHost, const ROW: usize, const COL: usize, const NUM_ENCODER: usize> Keyboard<H, ROW, COL, NUM_ENCODER> {
    pub fn oneshot_mods(&self) -> HidModifiers {
        self.oneshot.mods
    }

    /// Set pending one shot modifiers. The timeout restarts only when they change
    pub fn set_oneshot_mods(&mut self, mods: HidModifiers) {
        if self.oneshot.mods != mods {
            self.oneshot.mods_time = self.now;
            self.oneshot.mods = mods;
            debug!("One shot mods: {:?}", mods);
        }
    }

    pub fn clear_oneshot_mods(&mut self) {
        if !self.oneshot.mods.is_empty() {
            self.oneshot.mods = HidModifiers::new();
            self.oneshot.mods_time = self.now;
        }
    }

    pub fn oneshot_locked_mods(&self) -> HidModifiers {
        self.oneshot.locked_mods
    }

    pub fn set_oneshot_locked_mods(&mut self, mods: HidModifiers) {
        self.oneshot.locked_mods = mods;
    }

    pub fn clear_oneshot_locked_mods(&mut self) {
        self.oneshot.locked_mods = HidModifiers::new();
    }

    /// The layer of the current or latest one shot layer
    pub fn oneshot_layer(&self) -> u8 {
        self.oneshot.layer
    }

    pub fn oneshot_layer_state(&self) -> OneShotLayerState {
        self.oneshot.layer_state
    }

    pub fn is_oneshot_layer_active(&self) -> bool {
        self.oneshot.is_layer_active()
    }

    /// Turn on `layer` as a one shot layer
    pub fn set_oneshot_layer(&mut self, layer: u8, state: OneShotLayerState) {
        if self.behavior.one_shot.enable {
            self.oneshot.layer = layer;
            self.oneshot.layer_state = state;
            self.oneshot.layer_time = self.now;
            debug!("One shot layer {} set: {:?}", layer, state.phase());
        }
        self.host.layer_on(layer);
    }

    /// Forget the one shot layer without touching the layer stack
    pub fn reset_oneshot_layer(&mut self) {
        self.oneshot.layer_state = OneShotLayerState::new();
    }

    /// Clear conditions of the one shot layer, the layer is turned off once none is left
    pub fn clear_oneshot_layer_state(&mut self, state: OneShotLayerState) {
        let start = self.oneshot.layer_state;
        self.oneshot.layer_state = OneShotLayerState::from_bits(start.into_bits() & !state.into_bits());
        if !self.oneshot.is_layer_active() && start != self.oneshot.layer_state && self.behavior.one_shot.enable {
            debug!("One shot layer {} released", self.oneshot.layer);
            self.host.layer_off(self.oneshot.layer);
            self.reset_oneshot_layer();
        }
    }

    pub fn is_oneshot_enabled(&self) -> bool {
        self.behavior.one_shot.enable
    }

    pub fn oneshot_enable(&mut self) {
        self.behavior.one_shot.enable = true;
        info!("One shot enabled");
    }

    /// Disable one shot keys. Pending one shot state is dropped
    pub fn oneshot_disable(&mut self) {
        if self.oneshot.is_layer_active() {
            self.host.layer_off(self.oneshot.layer);
            self.reset_oneshot_layer();
        }
        self.clear_oneshot_mods();
        self.behavior.one_shot.enable = false;
        info!("One shot disabled");
    }

    pub fn oneshot_toggle(&mut self) {
        if self.behavior.one_shot.enable {
            self.oneshot_disable();
        } else {
            self.oneshot_enable();
        }
    }

    /// Time passed since `since`, measured on event timestamps
    pub(crate) fn oneshot_elapsed(&self, since: Instant) -> Duration {
        self.now.saturating_duration_since(since)
    }

    fn has_oneshot_layer_timed_out(&self, timeout: Duration) -> bool {
        self.oneshot.is_layer_active()
            && !self.oneshot.layer_state.toggled()
            && self.oneshot_elapsed(self.oneshot.layer_time) >= timeout
    }

    fn has_oneshot_mods_timed_out(&self, timeout: Duration) -> bool {
        !self.oneshot.mods.is_empty() && self.oneshot_elapsed(self.oneshot.mods_time) >= timeout
    }

    /// Expire one shot layer, modifiers and swap hands
    pub(crate) fn expire_oneshot(&mut self) {
        let timeout = self.behavior.one_shot.timeout;
        if timeout.as_ticks() == 0 {
            return;
        }
        if self.has_oneshot_layer_timed_out(timeout) {
            debug!("One shot layer {} timed out", self.oneshot.layer);
            self.clear_oneshot_layer_state(OneShotLayerState::OTHER_KEY_PRESSED);
        }
        if self.has_oneshot_mods_timed_out(timeout) {
            debug!("One shot mods timed out");
            self.clear_oneshot_mods();
        }
        if self.has_oneshot_swaphands_timed_out(timeout) {
            self.clear_oneshot_swaphands();
        }
    }

    /// One shot modifiers.
    ///
    /// A hold registers the modifiers, a single tap leaves them pending for the next key,
    /// `tap_toggle` taps lock them.
    pub(crate) fn process_action_oneshot_mods(&mut self, record: &KeyRecord, mods: HidModifiers) {
        let pressed = record.event.pressed;
        if !self.behavior.one_shot.enable {
            if pressed {
                self.register_mods(mods);
            } else {
                self.unregister_mods(mods);
            }
            return;
        }

        let count = record.tap.count;
        let tap_toggle = self.behavior.one_shot.tap_toggle();
        if pressed {
            match count {
                0 => self.register_mods(mods | self.oneshot.mods),
                1 => self.set_oneshot_mods(mods | self.oneshot.mods),
                n if Some(n) == tap_toggle => {
                    self.register_mods(mods);
                    self.clear_oneshot_mods();
                    self.oneshot.locked_mods |= mods;
                }
                _ => self.register_mods(mods | self.oneshot.mods),
            }
        } else {
            match count {
                0 => {
                    self.clear_oneshot_mods();
                    self.unregister_mods(mods);
                }
                1 => {
                    // Tapping a locked one shot modifier unlocks it
                    if tap_toggle.is_some() && mods.intersects(self.hid.mods) {
                        self.unregister_mods(mods);
                        self.clear_oneshot_mods();
                        self.oneshot.locked_mods &= !mods;
                    }
                }
                n if Some(n) == tap_toggle => {}
                _ => {
                    self.unregister_mods(mods);
                    self.clear_oneshot_mods();
                }
            }
        }
    }

    /// One shot layer. Returns `true` if the key must not release a consumed one shot layer
    pub(crate) fn process_action_oneshot_layer(&mut self, record: &KeyRecord, layer: u8) -> bool {
        let pressed = record.event.pressed;
        if !self.behavior.one_shot.enable {
            if pressed {
                self.host.layer_on(layer);
            } else {
                self.host.layer_off(layer);
            }
            return false;
        }

        let count = record.tap.count;
        match self.behavior.one_shot.tap_toggle() {
            Some(tap_toggle) => {
                if pressed {
                    if self.oneshot.layer_state == OneShotLayerState::TOGGLED {
                        // Pressing a locked one shot layer key unlocks it
                        self.reset_oneshot_layer();
                        self.host.layer_off(layer);
                    } else if count < tap_toggle {
                        self.host.layer_on(layer);
                        self.set_oneshot_layer(layer, OneShotLayerState::START);
                    }
                } else if count >= tap_toggle {
                    self.reset_oneshot_layer();
                    self.set_oneshot_layer(layer, OneShotLayerState::TOGGLED);
                } else {
                    self.clear_oneshot_layer_state(OneShotLayerState::PRESSED);
                }
                true
            }
            None => {
                if pressed {
                    self.host.layer_on(layer);
                    self.set_oneshot_layer(layer, OneShotLayerState::START);
                } else {
                    self.clear_oneshot_layer_state(OneShotLayerState::PRESSED);
                    if count > 1 {
                        self.clear_oneshot_layer_state(OneShotLayerState::OTHER_KEY_PRESSED);
                    }
                }
                false
            }
        }
    }
}
