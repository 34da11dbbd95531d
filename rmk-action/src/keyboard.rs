pub(crate) mod bilateral;
pub(crate) mod layer;
pub(crate) mod oneshot;
pub(crate) mod report;
pub(crate) mod swap_hands;
pub(crate) mod tap_hold;

use embassy_time::Instant;
use rmk_action_types::action::{Action, SwapHandsOp};

use crate::config::{BehaviorConfig, HandSwapConfig};
use crate::event::{KeyRecord, KeyboardEvent, TapState};
use crate::hid_state::HidState;
use crate::host::ActionHost;
use crate::keyboard::bilateral::BilateralState;
use crate::keyboard::oneshot::{OneShotLayerState, OneShotState};
use crate::keyboard::swap_hands::SwapHandsState;

/// The synthetic release of a key that consumed a one shot layer.
///
/// It's dispatched with the one shot layer turned on again, so that the release
/// resolves to the same action as the press.
#[derive(Clone, Copy, Debug)]
struct PendingRelease {
    record: KeyRecord,
    layer: u8,
}

/// The action core of a keyboard.
///
/// `Keyboard` owns every piece of state shared between key events: modifiers and keys
/// of the HID report, one shot modifiers and layer, swap hands and the bilateral chord.
/// All collaborators are reached through the host `H`.
pub struct Keyboard<H: ActionHost, const ROW: usize, const COL: usize, const NUM_ENCODER: usize = 0> {
    pub(crate) host: H,

    /// Behavior config
    pub(crate) behavior: BehaviorConfig,

    /// Modifiers and keys of the keyboard report
    pub(crate) hid: HidState,

    /// One shot modifiers and layer
    pub(crate) oneshot: OneShotState,

    pub(crate) swap_hands: SwapHandsState<ROW, COL, NUM_ENCODER>,

    pub(crate) bilateral: BilateralState,

    /// Events since the last tap or non tap-hold action, a hold followed by its own release reaches 2
    retro_tapping_counter: u8,

    /// Follow-up release of a key that consumed a one shot layer
    pending_release: Option<PendingRelease>,

    /// Actions are read from the current layer state instead of the layer cache
    disable_action_cache: bool,

    /// Timestamp of the latest event, the clock of every timeout
    pub(crate) now: Instant,
}

impl<H: ActionHost, const ROW: usize, const COL: usize, const NUM_ENCODER: usize> Keyboard<H, ROW, COL, NUM_ENCODER> {
    pub fn new(host: H, hand_swap: Option<HandSwapConfig<ROW, COL, NUM_ENCODER>>, behavior: BehaviorConfig) -> Self {
        Self {
            host,
            behavior,
            hid: HidState::default(),
            oneshot: OneShotState::default(),
            swap_hands: SwapHandsState::new(hand_swap),
            bilateral: BilateralState::default(),
            retro_tapping_counter: 0,
            pending_release: None,
            disable_action_cache: false,
            now: Instant::from_ticks(0),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn behavior(&self) -> &BehaviorConfig {
        &self.behavior
    }

    /// First stage of a key event.
    ///
    /// Clears weak modifiers on press, swaps hands, expires one shot state and runs the
    /// `pre_process_record` hook. Returns the record to be resolved by the tapping
    /// stage, or `None` if the hook dropped it.
    pub fn action_exec(&mut self, event: KeyboardEvent) -> Option<KeyRecord> {
        let mut event = event;
        if !event.is_noevent() {
            debug!("action_exec: {:?}", event);
            self.retro_tapping_counter = self.retro_tapping_counter.saturating_add(1);
        }
        if event.time > self.now {
            self.now = event.time;
        }

        if event.pressed {
            // Weak mods left by previously pressed keys
            self.clear_weak_mods();
        }

        if !event.is_noevent() {
            self.swap_hands.process_hand_swap(&mut event);
        }

        if self.behavior.one_shot.enable {
            self.expire_oneshot();
        }

        let mut record = KeyRecord::new(event, TapState::default());
        if event.is_noevent() || self.host.pre_process_record(&mut record) {
            Some(record)
        } else {
            None
        }
    }

    /// Run both stages for a key event whose tap state is already known
    pub fn process_event(&mut self, event: KeyboardEvent, tap: TapState) {
        if let Some(mut record) = self.action_exec(event) {
            record.tap = tap;
            self.process_record(&mut record);
        }
    }

    /// Let time-based state expire without a key event
    pub fn tick(&mut self, now: Instant) {
        let _ = self.action_exec(KeyboardEvent::tick(now));
    }

    /// Dispatch a record whose tap state has been resolved.
    ///
    /// If the record consumed a one shot layer, the synthetic release of the same key
    /// is dispatched afterwards on the one shot layer.
    pub fn process_record(&mut self, record: &mut KeyRecord) {
        self.process_record_inner(record);

        if let Some(pending) = self.pending_release.take() {
            let mut release = pending.record;
            self.host.layer_on(pending.layer);
            self.process_record_inner(&mut release);
            debug_assert!(
                self.pending_release.is_none(),
                "one shot layer release must not trigger another release"
            );
            self.pending_release = None;
            self.host.layer_off(pending.layer);
        }
    }

    /// Dispatch a record with the action of the current layer state.
    ///
    /// The layer a key was pressed on is neither read nor recorded, for replayed
    /// events whose press was never seen by the cache.
    pub fn process_record_nocache(&mut self, record: &mut KeyRecord) {
        self.disable_action_cache = true;
        self.process_record(record);
        self.disable_action_cache = false;
    }

    fn process_record_inner(&mut self, record: &mut KeyRecord) {
        if record.event.is_noevent() {
            return;
        }

        if !self.host.process_record(record) {
            if self.oneshot.is_layer_active() && record.event.pressed && self.behavior.one_shot.enable {
                self.clear_oneshot_layer_state(OneShotLayerState::OTHER_KEY_PRESSED);
            }
            return;
        }

        let action = match record.keycode {
            Some(keycode) => self.host.action_for_keycode(keycode),
            None if self.disable_action_cache => self.host.action_at(record.event.pos),
            None => self.host.store_or_get_action(record.event.pressed, record.event.pos),
        };
        debug!(
            "Action: {:?}, tap: {:?}, layer state: {}, default layer state: {}",
            action,
            record.tap,
            self.host.layer_state(),
            self.host.default_layer_state()
        );

        self.process_action(record, action);
        self.host.post_process_record(record);
    }

    /// Process an action of a record
    pub(crate) fn process_action(&mut self, record: &mut KeyRecord, action: Action) {
        let event = record.event;
        let tap_count = record.tap.count;

        // A one shot layer is only consumed by non-modifier keys
        let oneshot_layer = self.oneshot.layer();
        let mut do_release_oneshot = false;
        if self.oneshot.is_layer_active()
            && event.pressed
            && !action.has_modifier_key()
            && action != Action::SwapHands(SwapHandsOp::OneShot)
            && self.behavior.one_shot.enable
        {
            self.clear_oneshot_layer_state(OneShotLayerState::OTHER_KEY_PRESSED);
            do_release_oneshot = !self.oneshot.is_layer_active();
        }

        match action {
            Action::No => {}
            Action::Mods { mods, key } => self.process_action_mods(mods.to_hid_modifiers(), key, event),
            Action::ModsTap { mods, tap } => self.process_action_mods_tap(record, &action, mods.to_hid_modifiers(), tap),
            Action::Usage { page, code } => self.process_action_usage(page, code, event.pressed),
            Action::MouseKey(key) => self.register_mouse(key, event.pressed),
            Action::Layer(op) => self.process_action_layer_bitop(op, event.pressed),
            Action::LayerMods { layer, mods } => self.process_action_layer_mods(layer, mods, event.pressed),
            Action::LayerTap { layer, tap } => {
                if self.process_action_layer_tap(record, layer, tap) {
                    do_release_oneshot = false;
                }
            }
            Action::SwapHands(op) => self.process_action_swap_hands(record, op),
        }

        if action.is_layer_action() {
            let leds = self.host.keyboard_leds();
            self.host.led_set(leds);
        }

        self.process_retro_tapping(record, &action, tap_count);

        if event.pressed && action != Action::SwapHands(SwapHandsOp::OneShot) {
            self.use_oneshot_swaphands();
        }

        // The layer is switched off after a one shot, so release the key on the one
        // shot layer first or the release resolves on another layer
        if do_release_oneshot && !self.oneshot.layer_state().pressed() {
            let mut release = *record;
            release.event.pressed = false;
            self.pending_release = Some(PendingRelease {
                record: release,
                layer: oneshot_layer,
            });
        }
    }

    /// Retro tapping: a tap-hold key pressed and released with no other event in between sends its tap key
    fn process_retro_tapping(&mut self, record: &KeyRecord, action: &Action, tap_count: u8) {
        if !action.is_tap_action() || tap_count > 0 {
            self.retro_tapping_counter = 0;
            return;
        }
        if record.event.pressed {
            return;
        }
        if self.behavior.tap_hold.retro_tapping
            && self.retro_tapping_counter == 2
            && self.host.retro_tapping(action, record)
        {
            debug!("Retro tapping {:?}", action.tap_key());
            self.tap_code(action.tap_key());
        }
        self.retro_tapping_counter = 0;
    }

    /// Whether the record is handled differently when tapped
    pub fn is_tap_record(&self, record: &KeyRecord) -> bool {
        if record.event.is_noevent() {
            return false;
        }
        let action = match record.keycode {
            Some(keycode) => self.host.action_for_keycode(keycode),
            None => self.host.action_at(record.event.pos),
        };
        action.is_tap_action()
    }

    /// Whether the action is handled differently when tapped
    pub fn is_tap_action(action: &Action) -> bool {
        action.is_tap_action()
    }
}
