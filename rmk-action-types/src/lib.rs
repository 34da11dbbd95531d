//! # RMK Action Types
//!
//! Fundamental type definitions used by the RMK action core.
//!
//! ## Modules
//!
//! - [`action`] - The action variants a keymap resolves a key event into
//! - [`keycode`] - HID keycodes and their classification, media and system control keycodes
//! - [`modifier`] - Modifier combinations and the HID modifier byte
//! - [`led_indicator`] - LED indicator states reported by the host

#![no_std]

pub mod action;
pub mod keycode;
pub mod led_indicator;
pub mod modifier;
