//! Tap-hold actions: the record's tap count decides whether the tap or the hold side
//! of the action runs.

use rmk_action_types::action::{Action, LayerTapOp, ModsTapOp};
use rmk_action_types::keycode::HidKeyCode;
use rmk_action_types::modifier::HidModifiers;

use crate::event::{KeyRecord, KeyboardEvent};
use crate::host::ActionHost;
use crate::keyboard::Keyboard;

impl<H: ActionHost, const ROW: usize, const COL: usize, const NUM_ENCODER: usize> Keyboard<H, ROW, COL, NUM_ENCODER> {
    /// A key with modifiers.
    ///
    /// Modifiers of a modifier key (or of no key at all) are real modifiers, otherwise
    /// they are weak and only last until the next key press.
    pub(crate) fn process_action_mods(&mut self, mods: HidModifiers, key: HidKeyCode, event: KeyboardEvent) {
        let real = key.is_modifier() || key == HidKeyCode::No;
        if event.pressed {
            if !mods.is_empty() {
                if real {
                    self.add_mods(mods);
                } else {
                    self.add_weak_mods(mods);
                }
                self.send_keyboard_report();
            }
            if !real && self.behavior.bilateral.enable {
                self.bilateral_tap(event);
            }
            self.register_code(key);
        } else {
            self.unregister_code(key);
            if !mods.is_empty() {
                if real {
                    self.del_mods(mods);
                } else {
                    self.del_weak_mods(mods);
                }
                self.send_keyboard_report();
            }
        }
    }

    /// Modifiers on hold, `tap` on tap
    pub(crate) fn process_action_mods_tap(
        &mut self,
        record: &mut KeyRecord,
        action: &Action,
        mods: HidModifiers,
        tap: ModsTapOp,
    ) {
        let event = record.event;
        let tap_count = record.tap.count;
        match tap {
            ModsTapOp::OneShot => self.process_action_oneshot_mods(record, mods),
            ModsTapOp::TapToggle => {
                let tapping_toggle = self.behavior.tap_hold.tapping_toggle;
                if event.pressed {
                    if tap_count <= tapping_toggle {
                        self.register_mods(mods);
                    }
                } else if tap_count < tapping_toggle {
                    self.unregister_mods(mods);
                }
            }
            ModsTapOp::Key(key) => {
                if event.pressed {
                    if tap_count > 0 {
                        if record.tap.interrupted
                            && !self.behavior.tap_hold.ignore_mod_tap_interrupt
                            && !self.host.ignore_mod_tap_interrupt(action, record)
                        {
                            debug!("Mod tap interrupted, holding {:?}", mods);
                            // The tap is cancelled, the release must see a hold
                            record.tap.count = 0;
                            self.register_mods(mods);
                        } else {
                            if self.behavior.bilateral.enable {
                                self.bilateral_tap(event);
                            }
                            self.register_code(key);
                        }
                    } else if self.behavior.bilateral.enable {
                        self.bilateral_hold(event, key, mods);
                    } else {
                        self.register_mods(mods);
                    }
                } else if tap_count > 0 {
                    let delay = self.tap_delay(key);
                    self.wait(delay);
                    self.unregister_code(key);
                } else if self.behavior.bilateral.enable {
                    self.bilateral_release(event, mods);
                } else {
                    self.unregister_mods(mods);
                }
            }
        }
    }

    /// Layer on hold, `tap` on tap.
    ///
    /// Returns `true` if the key must not release a consumed one shot layer.
    pub(crate) fn process_action_layer_tap(&mut self, record: &mut KeyRecord, layer: u8, tap: LayerTapOp) -> bool {
        let event = record.event;
        let tap_count = record.tap.count;
        match tap {
            LayerTapOp::TapToggle => {
                let tapping_toggle = self.behavior.tap_hold.tapping_toggle;
                if event.pressed {
                    if tap_count < tapping_toggle {
                        self.host.layer_invert(layer);
                    }
                } else if tap_count <= tapping_toggle {
                    self.host.layer_invert(layer);
                }
            }
            LayerTapOp::OnOff => {
                if event.pressed {
                    self.host.layer_on(layer);
                } else {
                    self.host.layer_off(layer);
                }
            }
            LayerTapOp::OffOn => {
                if event.pressed {
                    self.host.layer_off(layer);
                } else {
                    self.host.layer_on(layer);
                }
            }
            LayerTapOp::SetClear => {
                if event.pressed {
                    self.host.layer_move(layer);
                } else {
                    self.host.layer_clear();
                }
            }
            LayerTapOp::OneShot => return self.process_action_oneshot_layer(record, layer),
            LayerTapOp::Key(key) => {
                if event.pressed {
                    if tap_count > 0 {
                        if self.behavior.bilateral.enable {
                            self.bilateral_tap(event);
                        }
                        self.register_code(key);
                    } else {
                        self.host.layer_on(layer);
                    }
                } else if tap_count > 0 {
                    let delay = self.tap_delay(key);
                    self.wait(delay);
                    self.unregister_code(key);
                } else {
                    self.host.layer_off(layer);
                }
            }
        }
        false
    }
}
