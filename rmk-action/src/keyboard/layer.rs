use rmk_action_types::action::{BitOp, LayerBitOp, LayerTrigger};
use rmk_action_types::modifier::HidModifiers;

use crate::host::ActionHost;
use crate::keyboard::Keyboard;

impl<H: ActionHost, const ROW: usize, const COL: usize, const NUM_ENCODER: usize> Keyboard<H, ROW, COL, NUM_ENCODER> {
    /// Bitwise operation on the layer state, or on the default layer state
    pub(crate) fn process_action_layer_bitop(&mut self, op: LayerBitOp, pressed: bool) {
        if !op.fires_on(pressed) {
            return;
        }
        let operand = op.operand();
        if op.trigger == LayerTrigger::Default {
            match op.op {
                BitOp::And => self.host.default_layer_and(operand),
                BitOp::Or => self.host.default_layer_or(operand),
                BitOp::Xor => self.host.default_layer_xor(operand),
                BitOp::Set => self.host.default_layer_set(operand),
            }
        } else {
            match op.op {
                BitOp::And => self.host.layer_and(operand),
                BitOp::Or => self.host.layer_or(operand),
                BitOp::Xor => self.host.layer_xor(operand),
                BitOp::Set => self.host.layer_state_set(operand),
            }
        }
    }

    /// A layer with modifiers, both active while held
    pub(crate) fn process_action_layer_mods(&mut self, layer: u8, mods: HidModifiers, pressed: bool) {
        if pressed {
            self.host.layer_on(layer);
            self.register_mods(mods);
        } else {
            self.unregister_mods(mods);
            self.host.layer_off(layer);
        }
    }
}
