mod hand_swap_config;

use embassy_time::Duration;
pub use hand_swap_config::HandSwapConfig;
use rmk_action_types::modifier::HidModifiers;

/// Upper bound of keys in one bilateral chord, the chord's modifiers fit in one byte
pub const BILATERAL_CHORD_MAX: usize = 8;

/// Config for the behaviors of the action core
#[derive(Clone, Copy, Debug, Default)]
pub struct BehaviorConfig {
    pub tap_hold: TapHoldConfig,
    pub one_shot: OneShotConfig,
    pub bilateral: BilateralConfig,
    pub locking: LockingConfig,
    pub mouse_key: MouseKeyConfig,
}

/// Configurations for tap hold behavior
#[derive(Clone, Copy, Debug)]
pub struct TapHoldConfig {
    /// How long a tapped key stays registered
    pub tap_code_delay: Duration,
    /// How long a tapped caps lock stays registered, hosts ignore shorter caps lock taps
    pub tap_hold_caps_delay: Duration,
    /// Number of taps that toggles a tap-toggle key
    pub tapping_toggle: u8,
    /// Tap the tap key when a tap-hold key is released without any other key event in between
    pub retro_tapping: bool,
    /// Keep the tap of an interrupted mod-tap instead of converting it to a hold
    pub ignore_mod_tap_interrupt: bool,
}

impl Default for TapHoldConfig {
    fn default() -> Self {
        Self {
            tap_code_delay: Duration::from_millis(0),
            tap_hold_caps_delay: Duration::from_millis(80),
            tapping_toggle: 5,
            retro_tapping: false,
            ignore_mod_tap_interrupt: false,
        }
    }
}

/// Config for one shot behavior
#[derive(Clone, Copy, Debug)]
pub struct OneShotConfig {
    /// Runtime switch, when disabled one shot keys act as plain modifiers and layers
    pub enable: bool,
    /// Pending one shot state expires after this. Zero disables the timeout
    pub timeout: Duration,
    /// Number of taps that locks a one shot key, must be greater than 1
    pub tap_toggle: Option<u8>,
}

impl Default for OneShotConfig {
    fn default() -> Self {
        Self {
            enable: true,
            timeout: Duration::from_secs(1),
            tap_toggle: None,
        }
    }
}

impl OneShotConfig {
    /// The effective tap toggle count
    pub(crate) fn tap_toggle(&self) -> Option<u8> {
        self.tap_toggle.filter(|&n| n > 1)
    }
}

/// Config for bilateral combinations.
///
/// Time windows are `None` for an infinite window.
#[derive(Clone, Copy, Debug)]
pub struct BilateralConfig {
    pub enable: bool,
    /// Maximum number of mod-tap keys in one chord, clamped to `1..=8`
    pub chord_size: usize,
    /// A same-hand key pressed later than this after the chord started commits the chord's modifiers
    pub same_sided: Option<Duration>,
    /// A key on the other hand pressed later than this after the chord started commits the chord's modifiers
    pub crossover: Option<Duration>,
    /// Delay before the held modifiers in `defer_mask` are registered
    pub defer_mods: Option<Duration>,
    /// Modifiers whose registration is deferred
    pub defer_mask: HidModifiers,
    /// The keyboard is split by rows, the left half holds the first half of the rows
    pub split: bool,
}

impl Default for BilateralConfig {
    fn default() -> Self {
        Self {
            enable: false,
            chord_size: 4,
            same_sided: None,
            crossover: None,
            defer_mods: None,
            defer_mask: HidModifiers::ALL,
            split: false,
        }
    }
}

impl BilateralConfig {
    pub(crate) fn chord_capacity(&self) -> usize {
        self.chord_size.clamp(1, BILATERAL_CHORD_MAX)
    }
}

/// Config for locking keys (locking caps lock, num lock and scroll lock)
#[derive(Clone, Copy, Debug, Default)]
pub struct LockingConfig {
    /// Translate locking keys to a tap of the plain lock key. When disabled, locking keys are sent as-is
    pub enable: bool,
    /// Skip the tap when the host LED already shows the target state
    pub resync: bool,
}

/// Config for mouse keys
#[derive(Clone, Copy, Debug, Default)]
pub struct MouseKeyConfig {
    /// Mouse buttons are handed to the pointing device instead of the mouse key report
    pub pointing_device_buttons: bool,
}
