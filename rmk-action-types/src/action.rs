//! Keyboard actions.
//!
//! An [`Action`] is what a key position resolves to in the keymap. It is
//! consumed exactly once per key record by the action core, which decides
//! whether the key is tapped or held and what reaches the host.
//!
//! Key types:
//! - [`Action`] - The action variants
//! - [`ModsTapOp`], [`LayerTapOp`], [`SwapHandsOp`] - What a tap-capable action does on tap
//! - [`LayerBitOp`] - Bitwise operation on the layer state

use serde::{Deserialize, Serialize};

use crate::keycode::HidKeyCode;
use crate::modifier::{HidModifiers, ModifierCombination};

/// A single action in the keymap
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// No action
    No,
    /// A key with modifiers, `Mods { mods: SHIFT, key: A }` sends a capital `A`.
    /// `key` may be [`HidKeyCode::No`] for a modifier-only key.
    Mods { mods: ModifierCombination, key: HidKeyCode },
    /// Modifiers on hold, [`ModsTapOp`] on tap
    ModsTap { mods: ModifierCombination, tap: ModsTapOp },
    /// A usage from a page other than the keyboard page
    Usage { page: UsagePage, code: u16 },
    /// Mouse key
    MouseKey(HidKeyCode),
    /// Bitwise operation on the layer state
    Layer(LayerBitOp),
    /// Activate a layer and the given modifiers while held
    LayerMods { layer: u8, mods: HidModifiers },
    /// Layer on hold, [`LayerTapOp`] on tap
    LayerTap { layer: u8, tap: LayerTapOp },
    /// Swap hands
    SwapHands(SwapHandsOp),
}

/// Tap behavior of a [`Action::ModsTap`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModsTapOp {
    /// Send the key on tap
    Key(HidKeyCode),
    /// One shot modifiers
    OneShot,
    /// Toggle the modifiers after `tapping_toggle` taps
    TapToggle,
}

/// Tap behavior of a [`Action::LayerTap`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerTapOp {
    /// Send the key on tap
    Key(HidKeyCode),
    /// Momentary layer, toggled after `tapping_toggle` taps
    TapToggle,
    /// Layer on press, off on release
    OnOff,
    /// Layer off on press, on on release
    OffOn,
    /// Move to the layer on press, clear the layer state on release
    SetClear,
    /// One shot layer
    OneShot,
}

/// Swap hands operations
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwapHandsOp {
    /// Swap while held, send the key on tap
    Key(HidKeyCode),
    /// Swap while held, toggle after `tapping_toggle` taps
    TapToggle,
    /// Toggle on press
    Toggle,
    /// Swap on press, unswap on release
    OnOff,
    /// Unswap on press, swap on release
    OffOn,
    /// Swap on release
    On,
    /// Unswap on release
    Off,
    /// Swap for the next key only
    OneShot,
}

/// Usage pages reachable from an [`Action::Usage`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsagePage {
    /// Generic desktop page, system control
    System,
    /// Consumer page
    Consumer,
}

/// Bitwise operators for [`LayerBitOp`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOp {
    And,
    Or,
    Xor,
    Set,
}

/// When a [`LayerBitOp`] is applied
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerTrigger {
    /// Operate on the default layer state, on release
    Default,
    OnPress,
    OnRelease,
    OnBoth,
}

/// A bitwise operation on one 4-bit part of the 32-bit layer state
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerBitOp {
    pub op: BitOp,
    /// Which 4-bit group of layers, 0..=7
    pub part: u8,
    /// 4 bits of layers within the part
    pub bits: u8,
    /// Fill every other part with ones, so that `And` leaves them untouched
    pub xbit: bool,
    pub trigger: LayerTrigger,
}

impl LayerBitOp {
    /// The 32-bit operand applied to the layer state
    pub const fn operand(&self) -> u32 {
        let shift = (self.part & 0x7) as u32 * 4;
        let bits = ((self.bits & 0xF) as u32) << shift;
        let mask = if self.xbit { !(0xFu32 << shift) } else { 0 };
        bits | mask
    }

    /// Whether the operation runs for an event with the given press state
    pub const fn fires_on(&self, pressed: bool) -> bool {
        match self.trigger {
            LayerTrigger::Default => !pressed,
            LayerTrigger::OnPress => pressed,
            LayerTrigger::OnRelease => !pressed,
            LayerTrigger::OnBoth => true,
        }
    }
}

impl Action {
    /// Actions whose behavior depends on the tap count of the record.
    pub fn is_tap_action(&self) -> bool {
        match self {
            Action::ModsTap { .. } => true,
            Action::LayerTap { tap, .. } => matches!(
                tap,
                LayerTapOp::Key(_) | LayerTapOp::TapToggle | LayerTapOp::OneShot
            ),
            Action::SwapHands(op) => matches!(op, SwapHandsOp::Key(_) | SwapHandsOp::TapToggle),
            _ => false,
        }
    }

    /// The keycode sent when this action is tapped, `HidKeyCode::No` if it has none
    pub fn tap_key(&self) -> HidKeyCode {
        match self {
            Action::ModsTap {
                tap: ModsTapOp::Key(k), ..
            }
            | Action::LayerTap {
                tap: LayerTapOp::Key(k), ..
            }
            | Action::SwapHands(SwapHandsOp::Key(k)) => *k,
            _ => HidKeyCode::No,
        }
    }

    /// Whether the keycode carried by this action is a modifier.
    ///
    /// A oneshot layer is not consumed by modifier keys.
    pub fn has_modifier_key(&self) -> bool {
        match self {
            Action::Mods { key, .. } | Action::MouseKey(key) => key.is_modifier(),
            _ => self.tap_key().is_modifier(),
        }
    }

    /// Layer actions, after which the host LEDs are refreshed
    pub fn is_layer_action(&self) -> bool {
        matches!(
            self,
            Action::Layer(_) | Action::LayerMods { .. } | Action::LayerTap { .. }
        )
    }
}
