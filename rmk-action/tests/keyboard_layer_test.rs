pub mod common;

use rmk_action::action::{Action, BitOp, LayerBitOp, LayerTapOp, LayerTrigger};
use rmk_action::event::KeyboardEvent;
use rmk_action::keycode::HidKeyCode;
use rmk_action::modifier::HidModifiers;
use rmk_action::{df, lm, mo, to, tt};

use crate::common::{KC_LSHIFT, assert_reports, create_test_keyboard};

#[test]
fn test_toggle_layer_on_release() {
    let mut keyboard = create_test_keyboard();
    let sequence = key_sequence![
        [1, 7, true, 0, 10],  // Press TG(2), nothing happens on press
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0);

    let sequence = key_sequence![
        [1, 7, false, 0, 10], // Release TG(2)
        [0, 0, true, 0, 10],  // Press F1 on layer 2
        [0, 0, false, 0, 10],
        [1, 7, true, 0, 10],  // Toggle layer 2 off, from layer 2
        [1, 7, false, 0, 10],
        [0, 0, true, 1, 10],  // Tap MT(A, Gui) on layer 0
        [0, 0, false, 1, 10],
    ];
    let expected = key_report![
        [0, [kc8!(F1), 0, 0, 0, 0, 0]],
        [0, [0, 0, 0, 0, 0, 0]],
        [0, [kc8!(A), 0, 0, 0, 0, 0]],
        [0, [0, 0, 0, 0, 0, 0]],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &expected);
    assert_eq!(keyboard.host().layer_state, 0);
    assert_eq!(keyboard.host().led_set_count, 4);
}

#[test]
fn test_momentary_layer() {
    let mut keyboard = create_test_keyboard();
    keyboard.host_mut().keymap[0][1][5] = mo!(1);
    let sequence = key_sequence![
        [1, 5, true, 0, 10],  // Hold MO(1)
        [0, 1, true, 0, 10],  // Press 2 on layer 1
        [0, 1, false, 0, 10],
        [1, 5, false, 0, 10], // Release MO(1)
    ];
    let expected = key_report![
        [0, [kc8!(Kc2), 0, 0, 0, 0, 0]],
        [0, [0, 0, 0, 0, 0, 0]],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &expected);
    assert_eq!(keyboard.host().layer_state, 0);
}

#[test]
fn test_layer_off_on() {
    let mut keyboard = create_test_keyboard();
    keyboard.host_mut().layer_state = 0b10;
    let off_on = Action::LayerTap {
        layer: 1,
        tap: LayerTapOp::OffOn,
    };
    keyboard.host_mut().keymap[0][1][5] = off_on;
    keyboard.host_mut().keymap[1][1][5] = off_on;
    let sequence = key_sequence![
        [1, 5, true, 0, 10],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0);
    let sequence = key_sequence![
        [1, 5, false, 0, 10],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0b10);
}

#[test]
fn test_layer_mods() {
    let mut keyboard = create_test_keyboard();
    keyboard.host_mut().keymap[0][1][5] = lm!(1, HidModifiers::LSHIFT);
    let sequence = key_sequence![
        [1, 5, true, 0, 10],  // Hold LM(1, Shift)
        [0, 0, true, 0, 10],  // Press 1 on layer 1
        [0, 0, false, 0, 10],
        [1, 5, false, 0, 10], // Release LM(1, Shift)
    ];
    let expected = key_report![
        [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
        [KC_LSHIFT, [kc8!(Kc1), 0, 0, 0, 0, 0]],
        [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
        [0, [0, 0, 0, 0, 0, 0]],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &expected);
    assert_eq!(keyboard.host().layer_state, 0);
}

#[test]
fn test_default_layer_set() {
    let mut keyboard = create_test_keyboard();
    keyboard.host_mut().keymap[0][1][5] = df!(1);
    let sequence = key_sequence![
        [1, 5, true, 0, 10],
        [1, 5, false, 0, 10],
        [0, 0, true, 0, 10],  // Press 1 on the new default layer
        [0, 0, false, 0, 10],
    ];
    let expected = key_report![
        [0, [kc8!(Kc1), 0, 0, 0, 0, 0]],
        [0, [0, 0, 0, 0, 0, 0]],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &expected);
    assert_eq!(keyboard.host().default_layer_state, 0b10);
    assert_eq!(keyboard.host().layer_state, 0);
}

#[test]
fn test_to_layer() {
    let mut keyboard = create_test_keyboard();
    keyboard.host_mut().layer_state = 0b10;
    keyboard.host_mut().keymap[0][1][5] = to!(2);
    keyboard.host_mut().keymap[1][1][5] = to!(2);
    let sequence = key_sequence![
        [1, 5, true, 0, 10],
        [1, 5, false, 0, 10],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0b100);
}

#[test]
fn test_layer_and_with_xbit() {
    let mut keyboard = create_test_keyboard();
    keyboard.host_mut().layer_state = 0b110;
    // Keep layer 2 of the first part, leave other parts untouched
    let and = Action::Layer(LayerBitOp {
        op: BitOp::And,
        part: 0,
        bits: 0b0100,
        xbit: true,
        trigger: LayerTrigger::OnPress,
    });
    keyboard.host_mut().keymap[0][1][5] = and;
    keyboard.host_mut().keymap[1][1][5] = and;
    let sequence = key_sequence![
        [1, 5, true, 0, 10],
        [1, 5, false, 0, 10],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0b100);
}

#[test]
fn test_layer_tap_toggle() {
    let mut keyboard = create_test_keyboard();
    keyboard.host_mut().keymap[0][1][5] = tt!(1);

    let sequence = key_sequence![
        [1, 5, true, 0, 10],  // Hold TT(1)
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0b10);
    let sequence = key_sequence![
        [1, 5, false, 0, 250],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0);

    // The fifth tap locks the layer
    let sequence = key_sequence![
        [1, 5, true, 1, 10],
        [1, 5, false, 1, 10],
        [1, 5, true, 2, 10],
        [1, 5, false, 2, 10],
        [1, 5, true, 3, 10],
        [1, 5, false, 3, 10],
        [1, 5, true, 4, 10],
        [1, 5, false, 4, 10],
        [1, 5, true, 5, 10],
        [1, 5, false, 5, 10],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0b10);
}

#[test]
fn test_layer_set_clear() {
    let mut keyboard = create_test_keyboard();
    keyboard.host_mut().layer_state = 0b100;
    let set_clear = Action::LayerTap {
        layer: 1,
        tap: LayerTapOp::SetClear,
    };
    keyboard.host_mut().keymap[0][1][5] = set_clear;
    keyboard.host_mut().keymap[2][1][5] = set_clear;
    let sequence = key_sequence![
        [1, 5, true, 0, 10],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0b10);
    let sequence = key_sequence![
        [1, 5, false, 0, 10],
    ];
    common::run_key_sequence_test(&mut keyboard, &sequence, &[]);
    assert_eq!(keyboard.host().layer_state, 0);
}

#[test]
fn test_process_record_nocache_reads_current_layer() {
    let mut keyboard = create_test_keyboard();
    keyboard.host_mut().layer_state = 0b10;
    let sequence = key_sequence![
        [0, 4, true, 0, 10],  // Press 5 on layer 1, the layer is cached
    ];
    for key in &sequence {
        common::send_key(&mut keyboard, key);
    }
    keyboard.host_mut().layer_state = 0;

    // Without the cache the release resolves to G on layer 0
    let now = keyboard.host().now;
    let mut record = keyboard.action_exec(KeyboardEvent::key(0, 4, false, now)).unwrap();
    keyboard.process_record_nocache(&mut record);
    assert!(keyboard.is_key_pressed(HidKeyCode::Kc5));

    // The cached release still reaches layer 1
    let sequence = key_sequence![
        [0, 4, false, 0, 10],
    ];
    for key in &sequence {
        common::send_key(&mut keyboard, key);
    }
    let expected = key_report![
        [0, [kc8!(Kc5), 0, 0, 0, 0, 0]],
        [0, [kc8!(Kc5), 0, 0, 0, 0, 0]],
        [0, [0, 0, 0, 0, 0, 0]],
    ];
    assert_reports(keyboard.host(), &expected);
}
