//! Registration of keycodes and modifiers, and the keyboard report sent to the host.

use embassy_time::Duration;
use rmk_action_types::action::UsagePage;
use rmk_action_types::keycode::{HidKeyCode, KeyClass, LockingKey};
use rmk_action_types::modifier::HidModifiers;
use usbd_hid::descriptor::{MediaKeyboardReport, SystemControlReport};

use crate::host::ActionHost;
use crate::keyboard::Keyboard;

/// How long a locking num lock or scroll lock is held on the host
const LOCKING_KEY_DELAY: Duration = Duration::from_millis(100);

impl<H: ActionHost, const ROW: usize, const COL: usize, const NUM_ENCODER: usize> Keyboard<H, ROW, COL, NUM_ENCODER> {
    /// Press a keycode on the host
    pub fn register_code(&mut self, key: HidKeyCode) {
        match self.key_class(key) {
            KeyClass::No => {}
            KeyClass::Locking(lock) => {
                if self.behavior.locking.resync && lock.is_on(self.host.keyboard_leds()) {
                    // Already locked on the host
                    return;
                }
                self.hid.add_key(lock.key());
                self.send_keyboard_report();
                let delay = match lock {
                    LockingKey::CapsLock => self.behavior.tap_hold.tap_hold_caps_delay,
                    _ => LOCKING_KEY_DELAY,
                };
                self.wait(delay);
                self.hid.del_key(lock.key());
                self.send_keyboard_report();
            }
            KeyClass::Basic => {
                if self.host.process_command(key) {
                    return;
                }
                // Force a new press edge for a key which is already down
                if self.hid.is_key_pressed(key) {
                    self.hid.del_key(key);
                    self.send_keyboard_report();
                }
                if !self.hid.add_key(key) {
                    warn!("Keyboard report is full, {:?} is dropped", key);
                }
                self.send_keyboard_report();
            }
            KeyClass::Modifier => {
                self.hid.mods |= key.to_hid_modifiers();
                self.send_keyboard_report();
            }
            KeyClass::System(system) => self.host.send_system_control_report(SystemControlReport {
                usage_id: system.usage_id(),
            }),
            KeyClass::Consumer(consumer) => self.host.send_media_report(MediaKeyboardReport {
                usage_id: consumer.usage_id(),
            }),
            KeyClass::Mouse => self.register_mouse(key, true),
        }
    }

    /// Release a keycode on the host
    pub fn unregister_code(&mut self, key: HidKeyCode) {
        match self.key_class(key) {
            KeyClass::No => {}
            KeyClass::Locking(lock) => {
                if self.behavior.locking.resync && !lock.is_on(self.host.keyboard_leds()) {
                    // Already unlocked on the host
                    return;
                }
                self.hid.add_key(lock.key());
                self.send_keyboard_report();
                self.hid.del_key(lock.key());
                self.send_keyboard_report();
            }
            KeyClass::Basic => {
                self.hid.del_key(key);
                self.send_keyboard_report();
            }
            KeyClass::Modifier => {
                self.hid.mods &= !key.to_hid_modifiers();
                self.send_keyboard_report();
            }
            KeyClass::System(_) => self
                .host
                .send_system_control_report(SystemControlReport { usage_id: 0 }),
            KeyClass::Consumer(_) => self.host.send_media_report(MediaKeyboardReport { usage_id: 0 }),
            KeyClass::Mouse => self.register_mouse(key, false),
        }
    }

    /// Press and release a keycode, with the release delayed by `delay`
    pub fn tap_code_delay(&mut self, key: HidKeyCode, delay: Duration) {
        self.register_code(key);
        self.wait(delay);
        self.unregister_code(key);
    }

    /// Press and release a keycode. Caps lock is held for `tap_hold_caps_delay`
    pub fn tap_code(&mut self, key: HidKeyCode) {
        let delay = self.tap_delay(key);
        self.tap_code_delay(key, delay);
    }

    /// How long a tapped key stays registered
    pub(crate) fn tap_delay(&self, key: HidKeyCode) -> Duration {
        if key == HidKeyCode::CapsLock {
            self.behavior.tap_hold.tap_hold_caps_delay
        } else {
            self.behavior.tap_hold.tap_code_delay
        }
    }

    /// Press or release a mouse key
    pub fn register_mouse(&mut self, key: HidKeyCode, pressed: bool) {
        if pressed {
            self.host.mousekey_on(key);
        } else {
            self.host.mousekey_off(key);
        }
        if self.behavior.mouse_key.pointing_device_buttons && key.is_mouse_button() {
            self.host.pointing_device_keycode_handler(key, pressed);
        } else {
            self.host.mousekey_send();
        }
    }

    /// Press or release a usage of the system control or consumer page
    pub(crate) fn process_action_usage(&mut self, page: UsagePage, code: u16, pressed: bool) {
        match page {
            UsagePage::System => match u8::try_from(code) {
                Ok(usage_id) => self.host.send_system_control_report(SystemControlReport {
                    usage_id: if pressed { usage_id } else { 0 },
                }),
                Err(_) => warn!("System control usage {} is out of range", code),
            },
            UsagePage::Consumer => self.host.send_media_report(MediaKeyboardReport {
                usage_id: if pressed { code } else { 0 },
            }),
        }
    }

    /// Send the current keyboard state.
    ///
    /// One shot modifiers are added to the modifier byte, and cleared once a report
    /// carrying a key is sent.
    pub fn send_keyboard_report(&mut self) {
        let mut modifier = self.hid.mods | self.hid.weak_mods;

        if !self.oneshot.mods.is_empty() {
            let timeout = self.behavior.one_shot.timeout;
            if timeout.as_ticks() > 0 && self.oneshot_elapsed(self.oneshot.mods_time) >= timeout {
                debug!("One shot mods timed out: {:?}", self.oneshot.mods);
                self.clear_oneshot_mods();
            }
            modifier |= self.oneshot.mods;
            if self.hid.has_anykey() {
                self.clear_oneshot_mods();
            }
        }

        let report = self.hid.report(modifier);
        trace!("Sending keyboard report: {:?}", report);
        self.host.send_keyboard_report(&report);
    }

    pub fn mods(&self) -> HidModifiers {
        self.hid.mods
    }

    pub fn add_mods(&mut self, mods: HidModifiers) {
        self.hid.mods |= mods;
    }

    pub fn del_mods(&mut self, mods: HidModifiers) {
        self.hid.mods &= !mods;
    }

    pub fn set_mods(&mut self, mods: HidModifiers) {
        self.hid.mods = mods;
    }

    pub fn clear_mods(&mut self) {
        self.hid.mods = HidModifiers::new();
    }

    pub fn weak_mods(&self) -> HidModifiers {
        self.hid.weak_mods
    }

    pub fn add_weak_mods(&mut self, mods: HidModifiers) {
        self.hid.weak_mods |= mods;
    }

    pub fn del_weak_mods(&mut self, mods: HidModifiers) {
        self.hid.weak_mods &= !mods;
    }

    pub fn set_weak_mods(&mut self, mods: HidModifiers) {
        self.hid.weak_mods = mods;
    }

    pub fn clear_weak_mods(&mut self) {
        self.hid.weak_mods = HidModifiers::new();
    }

    /// Add modifiers and send them. Empty modifiers send nothing
    pub fn register_mods(&mut self, mods: HidModifiers) {
        if !mods.is_empty() {
            self.add_mods(mods);
            self.send_keyboard_report();
        }
    }

    /// Remove modifiers and send the change. Empty modifiers send nothing
    pub fn unregister_mods(&mut self, mods: HidModifiers) {
        if !mods.is_empty() {
            self.del_mods(mods);
            self.send_keyboard_report();
        }
    }

    pub fn register_weak_mods(&mut self, mods: HidModifiers) {
        if !mods.is_empty() {
            self.add_weak_mods(mods);
            self.send_keyboard_report();
        }
    }

    pub fn unregister_weak_mods(&mut self, mods: HidModifiers) {
        if !mods.is_empty() {
            self.del_weak_mods(mods);
            self.send_keyboard_report();
        }
    }

    /// Release everything, modifiers included
    pub fn clear_keyboard(&mut self) {
        self.clear_mods();
        self.clear_keyboard_but_mods();
    }

    /// Release every key but keep the modifiers
    pub fn clear_keyboard_but_mods(&mut self) {
        self.hid.clear_keys();
        self.clear_keyboard_but_mods_and_keys();
    }

    /// Release weak modifiers, system and consumer usages and mouse keys
    pub fn clear_keyboard_but_mods_and_keys(&mut self) {
        self.host
            .send_system_control_report(SystemControlReport { usage_id: 0 });
        self.host.send_media_report(MediaKeyboardReport { usage_id: 0 });
        self.clear_weak_mods();
        self.send_keyboard_report();
        self.host.mousekey_clear();
        self.host.mousekey_send();
    }

    /// Whether a basic key is in the keyboard report
    pub fn is_key_pressed(&self, key: HidKeyCode) -> bool {
        self.hid.is_key_pressed(key)
    }

    /// Block for `delay`, zero returns immediately
    pub(crate) fn wait(&mut self, delay: Duration) {
        let ms = delay.as_millis();
        if ms > 0 {
            self.host.delay_ms(u32::try_from(ms).unwrap_or(u32::MAX));
        }
    }

    /// Locking keys are sent as plain keys when locking support is off
    fn key_class(&self, key: HidKeyCode) -> KeyClass {
        match key.classify() {
            KeyClass::Locking(_) if !self.behavior.locking.enable => KeyClass::Basic,
            class => class,
        }
    }
}
