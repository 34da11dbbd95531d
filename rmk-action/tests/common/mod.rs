pub mod test_macro;

use embassy_time::{Duration, Instant};
use embedded_hal::delay::DelayNs;
use log::debug;
use rmk_action::action::Action;
use rmk_action::config::{BehaviorConfig, HandSwapConfig};
use rmk_action::descriptor::KeyboardReport;
use rmk_action::event::{KeyPos, KeyRecord, KeyboardEvent, KeyboardEventPos, TapState};
use rmk_action::host::{
    DeferredExecutor, DeferredToken, HidHost, KeymapLookup, LayerStack, LayerState, MouseHost, ProcessHooks,
};
use rmk_action::keyboard::Keyboard;
use rmk_action::keycode::HidKeyCode;
use rmk_action::led_indicator::LedIndicator;
use rmk_action::modifier::{ALT, CTRL, GUI, SHIFT};
use rmk_action::{a, k, layer, lt, mt, osl, osm, sh, tg, wm};
use usbd_hid::descriptor::{MediaKeyboardReport, SystemControlReport};

// Init logger for tests
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub(crate) const KC_LCTRL: u8 = 1 << 0;
pub(crate) const KC_LSHIFT: u8 = 1 << 1;
pub(crate) const KC_LALT: u8 = 1 << 2;
pub(crate) const KC_LGUI: u8 = 1 << 3;

pub const ROW: usize = 2;
pub const COL: usize = 10;
pub const NUM_LAYER: usize = 3;

pub type TestKeyboard = Keyboard<TestHost<ROW, COL, NUM_LAYER>, ROW, COL>;

/// A host which records everything the keyboard sends
pub struct TestHost<const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    pub keymap: [[[Action; COL]; ROW]; NUM_LAYER],
    /// Actions of positions outside the matrix, such as encoders
    pub encoder_actions: Vec<(KeyboardEventPos, Action)>,
    pub layer_state: LayerState,
    pub default_layer_state: LayerState,
    /// Layer each key was pressed on
    pressed_layers: [[u8; COL]; ROW],
    pub reports: Vec<KeyboardReport>,
    pub system_reports: Vec<u8>,
    pub media_reports: Vec<u16>,
    pub mouse_events: Vec<(HidKeyCode, bool)>,
    pub mouse_sends: usize,
    pub leds: LedIndicator,
    pub led_set_count: usize,
    pub delays: Vec<u32>,
    /// Scheduled deferred callbacks and when they are due
    pub deferred: Vec<(DeferredToken, Instant)>,
    pub cancelled: Vec<DeferredToken>,
    next_token: u8,
    /// Clock of the host, blocking delays move it forward
    pub now: Instant,
    /// Records at this position are rejected by the `process_record` hook
    pub reject: Option<KeyboardEventPos>,
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> TestHost<ROW, COL, NUM_LAYER> {
    pub fn new(keymap: [[[Action; COL]; ROW]; NUM_LAYER]) -> Self {
        Self {
            keymap,
            encoder_actions: Vec::new(),
            layer_state: 0,
            default_layer_state: 1,
            pressed_layers: [[0; COL]; ROW],
            reports: Vec::new(),
            system_reports: Vec::new(),
            media_reports: Vec::new(),
            mouse_events: Vec::new(),
            mouse_sends: 0,
            leds: LedIndicator::new(),
            led_set_count: 0,
            delays: Vec::new(),
            deferred: Vec::new(),
            cancelled: Vec::new(),
            next_token: 1,
            now: Instant::from_ticks(0),
            reject: None,
        }
    }

    /// The highest active layer with an action at the position
    fn active_layer(&self, row: usize, col: usize) -> u8 {
        let state = self.layer_state | self.default_layer_state;
        (0..NUM_LAYER)
            .rev()
            .find(|&layer| state & (1u32 << layer) != 0 && self.keymap[layer][row][col] != Action::No)
            .unwrap_or(0) as u8
    }

    fn encoder_action(&self, pos: KeyboardEventPos) -> Action {
        self.encoder_actions
            .iter()
            .find(|(p, _)| *p == pos)
            .map_or(Action::No, |(_, action)| *action)
    }

    fn matrix_pos(pos: KeyboardEventPos) -> Option<(usize, usize)> {
        match pos {
            KeyboardEventPos::Key(KeyPos { row, col }) if (row as usize) < ROW && (col as usize) < COL => {
                Some((row as usize, col as usize))
            }
            _ => None,
        }
    }
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> KeymapLookup for TestHost<ROW, COL, NUM_LAYER> {
    fn action_at(&self, pos: KeyboardEventPos) -> Action {
        match Self::matrix_pos(pos) {
            Some((row, col)) => self.keymap[self.active_layer(row, col) as usize][row][col],
            None => self.encoder_action(pos),
        }
    }

    fn store_or_get_action(&mut self, pressed: bool, pos: KeyboardEventPos) -> Action {
        let Some((row, col)) = Self::matrix_pos(pos) else {
            return self.encoder_action(pos);
        };
        if pressed {
            self.pressed_layers[row][col] = self.active_layer(row, col);
        }
        self.keymap[self.pressed_layers[row][col] as usize][row][col]
    }
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> LayerStack for TestHost<ROW, COL, NUM_LAYER> {
    fn layer_state(&self) -> LayerState {
        self.layer_state
    }

    fn layer_state_set(&mut self, state: LayerState) {
        debug!("Layer state: {:#b}", state);
        self.layer_state = state;
    }

    fn default_layer_state(&self) -> LayerState {
        self.default_layer_state
    }

    fn default_layer_set(&mut self, state: LayerState) {
        self.default_layer_state = state;
    }
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> HidHost for TestHost<ROW, COL, NUM_LAYER> {
    fn send_keyboard_report(&mut self, report: &KeyboardReport) {
        debug!("Report #{}: {:?}", self.reports.len(), report);
        self.reports.push(*report);
    }

    fn send_system_control_report(&mut self, report: SystemControlReport) {
        self.system_reports.push(report.usage_id);
    }

    fn send_media_report(&mut self, report: MediaKeyboardReport) {
        self.media_reports.push(report.usage_id);
    }

    fn keyboard_leds(&self) -> LedIndicator {
        self.leds
    }

    fn led_set(&mut self, _leds: LedIndicator) {
        self.led_set_count += 1;
    }
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> MouseHost for TestHost<ROW, COL, NUM_LAYER> {
    fn mousekey_on(&mut self, key: HidKeyCode) {
        self.mouse_events.push((key, true));
    }

    fn mousekey_off(&mut self, key: HidKeyCode) {
        self.mouse_events.push((key, false));
    }

    fn mousekey_send(&mut self) {
        self.mouse_sends += 1;
    }
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> DeferredExecutor for TestHost<ROW, COL, NUM_LAYER> {
    fn defer(&mut self, delay: Duration) -> Option<DeferredToken> {
        let token = DeferredToken(self.next_token);
        self.next_token += 1;
        self.deferred.push((token, self.now + delay));
        Some(token)
    }

    fn cancel_deferred(&mut self, token: DeferredToken) {
        self.deferred.retain(|(t, _)| *t != token);
        self.cancelled.push(token);
    }
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> ProcessHooks for TestHost<ROW, COL, NUM_LAYER> {
    fn process_record(&mut self, record: &mut KeyRecord) -> bool {
        self.reject != Some(record.event.pos)
    }
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> DelayNs for TestHost<ROW, COL, NUM_LAYER> {
    fn delay_ns(&mut self, ns: u32) {
        self.now += Duration::from_nanos(ns as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now += Duration::from_millis(ms as u64);
    }
}

#[derive(Debug, Clone)]
pub struct TestKeyPress {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
    pub tap: TapState,
    pub delay: u64, // Delay before this key event in milliseconds
}

/// Move the clock to `time`, running deferred callbacks which are due on the way
pub fn advance_to<const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    keyboard: &mut Keyboard<TestHost<ROW, COL, NUM_LAYER>, ROW, COL>,
    time: Instant,
) {
    loop {
        let due = keyboard
            .host()
            .deferred
            .iter()
            .filter(|(_, at)| *at <= time)
            .min_by_key(|(_, at)| *at)
            .copied();
        let Some((token, at)) = due else {
            break;
        };
        let host = keyboard.host_mut();
        host.deferred.retain(|(t, _)| *t != token);
        host.now = host.now.max(at);
        keyboard.run_deferred(token);
    }
    let host = keyboard.host_mut();
    host.now = host.now.max(time);
}

/// Dispatch one key event `delay` ms after the previous one
pub fn send_key<const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    keyboard: &mut Keyboard<TestHost<ROW, COL, NUM_LAYER>, ROW, COL>,
    key: &TestKeyPress,
) {
    let time = keyboard.host().now + Duration::from_millis(key.delay);
    advance_to(keyboard, time);
    let time = keyboard.host().now;
    keyboard.process_event(KeyboardEvent::key(key.row, key.col, key.pressed, time), key.tap);
}

/// Let `delay` ms pass and dispatch a tick
pub fn tick<const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    keyboard: &mut Keyboard<TestHost<ROW, COL, NUM_LAYER>, ROW, COL>,
    delay: u64,
) {
    let time = keyboard.host().now + Duration::from_millis(delay);
    advance_to(keyboard, time);
    let time = keyboard.host().now;
    keyboard.tick(time);
}

// run a keyboard test, input is a seq of key events with delays, the expected reports are verified in order
pub fn run_key_sequence_test<const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    keyboard: &mut Keyboard<TestHost<ROW, COL, NUM_LAYER>, ROW, COL>,
    key_sequence: &[TestKeyPress],
    expected_reports: &[KeyboardReport],
) {
    for key in key_sequence {
        send_key(keyboard, key);
    }
    assert_reports(keyboard.host(), expected_reports);
}

pub fn assert_reports<const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    host: &TestHost<ROW, COL, NUM_LAYER>,
    expected_reports: &[KeyboardReport],
) {
    for (report_index, expected) in expected_reports.iter().enumerate() {
        assert_eq!(
            Some(expected),
            host.reports.get(report_index),
            "on #{} reports, expected left but actually right",
            report_index
        );
    }
    assert_eq!(
        expected_reports.len(),
        host.reports.len(),
        "unexpected extra reports: {:?}",
        &host.reports[expected_reports.len().min(host.reports.len())..]
    );
}

// KEYMAP, 2 rows, 10 cols, cols 0..=4 are the left hand
// Layer 0: MT(A,Gui) MT(S,Alt) MT(D,Ctrl) MT(F,Shift) G     H     MT(J,Shift) MT(K,Ctrl) MT(L,Alt) ;
//          OSM(Sft)  OSL(1)    LT(1,Spc)  SH(Spc)     SH_OS N     M           TG(2)      LCaps     WM(1,Sft)
// Layer 1: 1 2 3 4 5 6 7 8 9 0
//          -  -  -  -  -  Mute Btn1 - LShift Power
// Layer 2: F1 .. F10
//          -  -  -  -  -  -  -  TG(2) -  -
#[rustfmt::skip]
pub const fn get_keymap() -> [[[Action; COL]; ROW]; NUM_LAYER] {
    [
        layer!([
            [mt!(A, GUI), mt!(S, ALT), mt!(D, CTRL), mt!(F, SHIFT), k!(G), k!(H), mt!(J, SHIFT), mt!(K, CTRL), mt!(L, ALT), k!(Semicolon)],
            [osm!(SHIFT), osl!(1), lt!(1, Space), sh!(Key(Space)), sh!(OneShot), k!(N), k!(M), tg!(2), k!(LockingCapsLock), wm!(Kc1, SHIFT)]
        ]),
        layer!([
            [k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0)],
            [a!(No), a!(No), a!(No), a!(No), a!(No), k!(AudioMute), k!(MouseBtn1), a!(No), k!(LShift), k!(SystemPower)]
        ]),
        layer!([
            [k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), k!(F6), k!(F7), k!(F8), k!(F9), k!(F10)],
            [a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), a!(No), tg!(2), a!(No), a!(No)]
        ]),
    ]
}

pub fn create_test_keyboard_with_config(config: BehaviorConfig) -> TestKeyboard {
    init_log();
    Keyboard::new(
        TestHost::new(get_keymap()),
        Some(HandSwapConfig::mirror_columns()),
        config,
    )
}

pub fn create_test_keyboard() -> TestKeyboard {
    create_test_keyboard_with_config(BehaviorConfig::default())
}
