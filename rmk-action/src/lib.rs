//! # RMK Action
//!
//! The action core of a keyboard firmware: turns resolved key records into HID state.
//!
//! ## Modules
//!
//! - [`keyboard`] - The [`keyboard::Keyboard`] dispatcher, tap-hold, one shot, swap hands and bilateral combinations
//! - [`host`] - Traits implemented by the firmware: keymap, layer stack, HID transport, deferred executor and hooks
//! - [`event`] - Key events and key records
//! - [`config`] - Behavior configuration
//! - [`descriptor`] - The keyboard HID report
//! - [`layout_macro`] - Macros for building keymaps
//!
//! Action and keycode types are re-exported from `rmk-action-types`.

#![no_std]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
pub(crate) mod fmt;

pub mod config;
pub mod descriptor;
pub mod event;
pub(crate) mod hid_state;
pub mod host;
pub mod keyboard;
pub mod layout_macro;

pub use keyboard::Keyboard;
pub use rmk_action_types::{action, keycode, led_indicator, modifier};

pub use crate::keyboard::bilateral::Hand;
pub use crate::keyboard::oneshot::{OneShotLayerPhase, OneShotLayerState};
pub use crate::keyboard::swap_hands::SwapHandsOneShot;
