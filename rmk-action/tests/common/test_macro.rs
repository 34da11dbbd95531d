extern crate rmk_action;

/// Run a key sequence `[row, col, pressed, tap_count, delay]` and verify every keyboard report `[modifier, keycodes]`
#[macro_export]
macro_rules! key_sequence_test {
    (keyboard: $keyboard:expr, sequence: [$([$row:expr, $col:expr, $pressed:expr, $tap:expr, $delay:expr]),* $(,)?], expected_reports: [$([$modifier:expr, $keys:expr]),* $(,)?]) => {
        {
            let mut keyboard = $keyboard;
            let sequence = $crate::key_sequence![$([$row, $col, $pressed, $tap, $delay]),*];
            let expected_reports = $crate::key_report![$([$modifier, $keys]),*];

            $crate::common::run_key_sequence_test(&mut keyboard, &sequence, &expected_reports);
        }
    };
}

// a rust macro to map a keycode name to u8
#[macro_export]
macro_rules! kc8 {
    ($key: ident) => {
        rmk_action::keycode::HidKeyCode::$key as u8
    };
}

// a rust macro to create a key sequence to simulate key presses, the tap count is decided by the caller
#[macro_export]
macro_rules! key_sequence {
    ($([$row:expr, $col:expr, $pressed:expr, $tap:expr, $delay:expr]),* $(,)?) => {
        vec![
            $(
                $crate::common::TestKeyPress {
                    row: $row,
                    col: $col,
                    pressed: $pressed,
                    tap: rmk_action::event::TapState::tap($tap),
                    delay: $delay,
                },
            )*
        ]
    };
}

// a rust macro to create a key report that simulates key status change in hid
#[macro_export]
macro_rules! key_report {
    ($([$modifier:expr, $keys:expr]),* $(,)?) => {
        vec![
            $(
                rmk_action::descriptor::KeyboardReport {
                    modifier: $modifier,
                    keycodes: $keys,
                    leds: 0,
                    reserved: 0,
                },
            )*
        ]
    };
}
