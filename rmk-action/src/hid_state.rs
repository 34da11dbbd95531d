use rmk_action_types::keycode::HidKeyCode;
use rmk_action_types::modifier::HidModifiers;

use crate::descriptor::KeyboardReport;

/// Keyboard state reported to the host, before one shot modifiers are applied
#[derive(Debug)]
pub(crate) struct HidState {
    /// Modifiers from physically held keys
    pub(crate) mods: HidModifiers,
    /// Modifiers implied by a non-modifier key, cleared on every press
    pub(crate) weak_mods: HidModifiers,
    keycodes: [HidKeyCode; 6],
}

impl Default for HidState {
    fn default() -> Self {
        Self {
            mods: HidModifiers::new(),
            weak_mods: HidModifiers::new(),
            keycodes: [HidKeyCode::No; 6],
        }
    }
}

impl HidState {
    /// Put the key in the first free slot. Returns false if all 6 slots are taken
    pub(crate) fn add_key(&mut self, key: HidKeyCode) -> bool {
        if self.is_key_pressed(key) {
            return true;
        }
        match self.keycodes.iter().position(|&k| k == HidKeyCode::No) {
            Some(index) => {
                self.keycodes[index] = key;
                true
            }
            None => false,
        }
    }

    pub(crate) fn del_key(&mut self, key: HidKeyCode) {
        self.keycodes.iter_mut().filter(|k| **k == key).for_each(|k| *k = HidKeyCode::No);
    }

    pub(crate) fn is_key_pressed(&self, key: HidKeyCode) -> bool {
        key != HidKeyCode::No && self.keycodes.contains(&key)
    }

    pub(crate) fn has_anykey(&self) -> bool {
        self.keycodes.iter().any(|&k| k != HidKeyCode::No)
    }

    pub(crate) fn clear_keys(&mut self) {
        self.keycodes = [HidKeyCode::No; 6];
    }

    /// Build the report with the final modifier byte
    pub(crate) fn report(&self, modifier: HidModifiers) -> KeyboardReport {
        let mut keycodes = [0; 6];
        for (slot, key) in keycodes.iter_mut().zip(self.keycodes.iter()) {
            *slot = *key as u8;
        }
        KeyboardReport {
            modifier: modifier.into_bits(),
            reserved: 0,
            leds: 0,
            keycodes,
        }
    }
}
