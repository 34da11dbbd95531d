//! The collaborators of the action core.
//!
//! The keyboard firmware embedding the action core provides the keymap, the layer
//! stack, the HID transport, mouse keys, a deferred executor and optional hooks by
//! implementing the traits below on one host type. Every hook has a default that
//! keeps the standard behavior.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use rmk_action_types::action::Action;
use rmk_action_types::keycode::HidKeyCode;
use rmk_action_types::led_indicator::LedIndicator;
use usbd_hid::descriptor::{MediaKeyboardReport, SystemControlReport};

use crate::descriptor::KeyboardReport;
use crate::event::{KeyRecord, KeyboardEventPos};

/// Bit mask of active layers, bit N is layer N
pub type LayerState = u32;

/// Keymap lookup
pub trait KeymapLookup {
    /// The action at a position on the current layer state. Must be free of side effects
    fn action_at(&self, pos: KeyboardEventPos) -> Action;

    /// The action for a key transition. Keymaps caching the layer a key was pressed on
    /// return the cached action on release.
    fn store_or_get_action(&mut self, _pressed: bool, pos: KeyboardEventPos) -> Action {
        self.action_at(pos)
    }

    /// The action for a keycode resolved by combo detection
    fn action_for_keycode(&self, _keycode: u16) -> Action {
        Action::No
    }
}

/// The layer stack
pub trait LayerStack {
    fn layer_state(&self) -> LayerState;
    fn layer_state_set(&mut self, state: LayerState);
    fn default_layer_state(&self) -> LayerState;
    fn default_layer_set(&mut self, state: LayerState);

    fn layer_on(&mut self, layer: u8) {
        self.layer_state_set(self.layer_state() | 1u32 << (layer & 0x1F));
    }

    fn layer_off(&mut self, layer: u8) {
        self.layer_state_set(self.layer_state() & !(1u32 << (layer & 0x1F)));
    }

    fn layer_invert(&mut self, layer: u8) {
        self.layer_state_set(self.layer_state() ^ 1u32 << (layer & 0x1F));
    }

    /// Turn on `layer` and turn off every other layer
    fn layer_move(&mut self, layer: u8) {
        self.layer_state_set(1u32 << (layer & 0x1F));
    }

    fn layer_clear(&mut self) {
        self.layer_state_set(0);
    }

    fn layer_and(&mut self, mask: LayerState) {
        self.layer_state_set(self.layer_state() & mask);
    }

    fn layer_or(&mut self, mask: LayerState) {
        self.layer_state_set(self.layer_state() | mask);
    }

    fn layer_xor(&mut self, mask: LayerState) {
        self.layer_state_set(self.layer_state() ^ mask);
    }

    fn default_layer_and(&mut self, mask: LayerState) {
        self.default_layer_set(self.default_layer_state() & mask);
    }

    fn default_layer_or(&mut self, mask: LayerState) {
        self.default_layer_set(self.default_layer_state() | mask);
    }

    fn default_layer_xor(&mut self, mask: LayerState) {
        self.default_layer_set(self.default_layer_state() ^ mask);
    }
}

/// HID transport to the host
pub trait HidHost {
    fn send_keyboard_report(&mut self, report: &KeyboardReport);

    /// Send the system control report, a zero usage releases it
    fn send_system_control_report(&mut self, report: SystemControlReport);

    /// Send the consumer report, a zero usage releases it
    fn send_media_report(&mut self, report: MediaKeyboardReport);

    /// LED state last reported by the host
    fn keyboard_leds(&self) -> LedIndicator;

    /// Refresh LED indicators, called after every layer action
    fn led_set(&mut self, _leds: LedIndicator) {}
}

/// Mouse keys and pointing device
pub trait MouseHost {
    fn mousekey_on(&mut self, _key: HidKeyCode) {}
    fn mousekey_off(&mut self, _key: HidKeyCode) {}
    fn mousekey_send(&mut self) {}
    fn mousekey_clear(&mut self) {}
    fn pointing_device_keycode_handler(&mut self, _key: HidKeyCode, _pressed: bool) {}
}

/// Handle of a scheduled deferred callback
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeferredToken(pub u8);

/// A single-shot deferred executor.
///
/// When a scheduled callback is due, the host calls [`crate::keyboard::Keyboard::run_deferred`]
/// with the token returned by `defer`, from the same loop that dispatches key events.
pub trait DeferredExecutor {
    /// Schedule a callback after `delay`, `None` if it cannot be scheduled
    fn defer(&mut self, delay: Duration) -> Option<DeferredToken>;

    /// Cancel a scheduled callback. Cancelling an unknown token does nothing
    fn cancel_deferred(&mut self, token: DeferredToken);
}

/// Hooks around the processing of a record
pub trait ProcessHooks {
    /// Called before the tapping stage, returning `false` drops the event
    fn pre_process_record(&mut self, _record: &mut KeyRecord) -> bool {
        true
    }

    /// Called before the action is looked up, returning `false` skips the action
    fn process_record(&mut self, _record: &mut KeyRecord) -> bool {
        true
    }

    /// Called after the action is processed
    fn post_process_record(&mut self, _record: &mut KeyRecord) {}

    /// Per-key override of [`crate::config::TapHoldConfig::ignore_mod_tap_interrupt`]
    fn ignore_mod_tap_interrupt(&mut self, _action: &Action, _record: &KeyRecord) -> bool {
        false
    }

    /// Per-key switch of retro tapping, only consulted when retro tapping is enabled
    fn retro_tapping(&mut self, _action: &Action, _record: &KeyRecord) -> bool {
        true
    }

    /// Intercept a basic key for a command console, returning `true` consumes the key
    fn process_command(&mut self, _key: HidKeyCode) -> bool {
        false
    }
}

/// Everything the action core needs from the firmware
pub trait ActionHost: KeymapLookup + LayerStack + HidHost + MouseHost + DeferredExecutor + ProcessHooks + DelayNs {}

impl<T> ActionHost for T where T: KeymapLookup + LayerStack + HidHost + MouseHost + DeferredExecutor + ProcessHooks + DelayNs {}
