/// Create a layer in keymap
#[macro_export]
macro_rules! layer {
    ([$([$($x: expr), +]), +]) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `Action::Mods { mods: <none>, key: HidKeyCode::A }`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::action::Action::Mods {
            mods: $crate::modifier::ModifierCombination::new(),
            key: $crate::keycode::HidKeyCode::$k,
        }
    };
}

/// Create a normal key with modifier action
#[macro_export]
macro_rules! wm {
    ($x: ident, $m: expr) => {
        $crate::action::Action::Mods {
            mods: $m,
            key: $crate::keycode::HidKeyCode::$x,
        }
    };
}

/// Create a no-op action
#[macro_export]
macro_rules! a {
    (No) => {
        $crate::action::Action::No
    };
}

/// Create a layer activate action. For example, `mo!(1)` activates layer 1 while held.
#[macro_export]
macro_rules! mo {
    ($x: literal) => {
        $crate::action::Action::LayerTap {
            layer: $x,
            tap: $crate::action::LayerTapOp::OnOff,
        }
    };
}

/// Create a layer activate with modifier action
#[macro_export]
macro_rules! lm {
    ($x: literal, $m: expr) => {
        $crate::action::Action::LayerMods { layer: $x, mods: $m }
    };
}

/// Create a layer activate action or tap key(tap/hold)
#[macro_export]
macro_rules! lt {
    ($x: literal, $k: ident) => {
        $crate::action::Action::LayerTap {
            layer: $x,
            tap: $crate::action::LayerTapOp::Key($crate::keycode::HidKeyCode::$k),
        }
    };
}

/// Create a modifier-tap-hold action
#[macro_export]
macro_rules! mt {
    ($k: ident, $m: expr) => {
        $crate::action::Action::ModsTap {
            mods: $m,
            tap: $crate::action::ModsTapOp::Key($crate::keycode::HidKeyCode::$k),
        }
    };
}

/// Create a one shot modifier action
#[macro_export]
macro_rules! osm {
    ($m: expr) => {
        $crate::action::Action::ModsTap {
            mods: $m,
            tap: $crate::action::ModsTapOp::OneShot,
        }
    };
}

/// Create a one shot layer action
#[macro_export]
macro_rules! osl {
    ($x: literal) => {
        $crate::action::Action::LayerTap {
            layer: $x,
            tap: $crate::action::LayerTapOp::OneShot,
        }
    };
}

/// Create a layer toggle action, the layer is toggled on release
#[macro_export]
macro_rules! tg {
    ($x: literal) => {
        $crate::action::Action::Layer($crate::action::LayerBitOp {
            op: $crate::action::BitOp::Xor,
            part: $x / 4,
            bits: 1 << ($x % 4),
            xbit: false,
            trigger: $crate::action::LayerTrigger::OnRelease,
        })
    };
}

/// Create a momentary layer action which is toggled after `tapping_toggle` taps
#[macro_export]
macro_rules! tt {
    ($x: literal) => {
        $crate::action::Action::LayerTap {
            layer: $x,
            tap: $crate::action::LayerTapOp::TapToggle,
        }
    };
}

/// Create a layer action which turns on the layer and turns off all others
#[macro_export]
macro_rules! to {
    ($x: literal) => {
        $crate::action::Action::Layer($crate::action::LayerBitOp {
            op: $crate::action::BitOp::Set,
            part: $x / 4,
            bits: 1 << ($x % 4),
            xbit: false,
            trigger: $crate::action::LayerTrigger::OnPress,
        })
    };
}

/// Create a default layer set action
#[macro_export]
macro_rules! df {
    ($x: literal) => {
        $crate::action::Action::Layer($crate::action::LayerBitOp {
            op: $crate::action::BitOp::Set,
            part: $x / 4,
            bits: 1 << ($x % 4),
            xbit: false,
            trigger: $crate::action::LayerTrigger::Default,
        })
    };
}

/// Create a swap hands action. For example, `sh!(Toggle)` or `sh!(Key(Space))`
#[macro_export]
macro_rules! sh {
    (Key($k: ident)) => {
        $crate::action::Action::SwapHands($crate::action::SwapHandsOp::Key($crate::keycode::HidKeyCode::$k))
    };
    ($op: ident) => {
        $crate::action::Action::SwapHands($crate::action::SwapHandsOp::$op)
    };
}
