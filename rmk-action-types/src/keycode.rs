//! HID keycodes and their classification.
use serde::{Deserialize, Serialize};
use strum::FromRepr;

use crate::led_indicator::LedIndicator;
use crate::modifier::HidModifiers;

/// All key codes defined in HID spec, plus the locking, system, consumer and mouse
/// extensions that share the same 8-bit code space.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidKeyCode {
    /// Reserved, no-key.
    No = 0x0000,
    /// Keyboard roll over error, too many keys are pressed simultaneously, not a physical key.
    /// NKRO: n-key rollover.
    ErrorRollover = 0x0001,
    /// Keyboard post fail error, not a physical key.
    PostFail = 0x0002,
    /// An undefined error, not a physical key.
    ErrorUndefined = 0x0003,
    /// `a` and `A`
    A = 0x0004,
    /// `b` and `B`
    B = 0x0005,
    /// `c` and `C`
    C = 0x0006,
    /// `d` and `D`
    D = 0x0007,
    /// `e` and `E`
    E = 0x0008,
    /// `f` and `F`
    F = 0x0009,
    /// `g` and `G`
    G = 0x000A,
    /// `h` and `H`
    H = 0x000B,
    /// `i` and `I`
    I = 0x000C,
    /// `j` and `J`
    J = 0x000D,
    /// `k` and `K`
    K = 0x000E,
    /// `l` and `L`
    L = 0x000F,
    /// `m` and `M`
    M = 0x0010,
    /// `n` and `N`
    N = 0x0011,
    /// `o` and `O`
    O = 0x0012,
    /// `p` and `P`
    P = 0x0013,
    /// `q` and `Q`
    Q = 0x0014,
    /// `r` and `R`
    R = 0x0015,
    /// `s` and `S`
    S = 0x0016,
    /// `t` and `T`
    T = 0x0017,
    /// `u` and `U`
    U = 0x0018,
    /// `v` and `V`
    V = 0x0019,
    /// `w` and `W`
    W = 0x001A,
    /// `x` and `X`
    X = 0x001B,
    /// `y` and `Y`
    Y = 0x001C,
    /// `z` and `Z`
    Z = 0x001D,
    /// `1` and `!`
    Kc1 = 0x001E,
    /// `2` and `@`
    Kc2 = 0x001F,
    /// `3` and `#`
    Kc3 = 0x0020,
    /// `4` and `$`
    Kc4 = 0x0021,
    /// `5` and `%`
    Kc5 = 0x0022,
    /// `6` and `^`
    Kc6 = 0x0023,
    /// `7` and `&`
    Kc7 = 0x0024,
    /// `8` and `*`
    Kc8 = 0x0025,
    /// `9` and `(`
    Kc9 = 0x0026,
    /// `0` and `)`
    Kc0 = 0x0027,
    /// `Enter`
    Enter = 0x0028,
    /// `Esc`
    Escape = 0x0029,
    /// `Backspace`
    Backspace = 0x002A,
    /// `Tab`
    Tab = 0x002B,
    /// `Space`
    Space = 0x002C,
    /// `-` and `_`
    Minus = 0x002D,
    /// `=` and `+`
    Equal = 0x002E,
    /// `[` and `{`
    LeftBracket = 0x002F,
    /// `]` and `}`
    RightBracket = 0x0030,
    /// `\` and `|`
    Backslash = 0x0031,
    /// Non-US `#` and `~`
    NonusHash = 0x0032,
    /// `;` and `:`
    Semicolon = 0x0033,
    /// `'` and `"`
    Quote = 0x0034,
    /// `~` and `\``
    Grave = 0x0035,
    /// `,` and `<`
    Comma = 0x0036,
    /// `.` and `>`
    Dot = 0x0037,
    /// `/` and `?`
    Slash = 0x0038,
    /// `CapsLock`
    CapsLock = 0x0039,
    /// `F1`
    F1 = 0x003A,
    /// `F2`
    F2 = 0x003B,
    /// `F3`
    F3 = 0x003C,
    /// `F4`
    F4 = 0x003D,
    /// `F5`
    F5 = 0x003E,
    /// `F6`
    F6 = 0x003F,
    /// `F7`
    F7 = 0x0040,
    /// `F8`
    F8 = 0x0041,
    /// `F9`
    F9 = 0x0042,
    /// `F10`
    F10 = 0x0043,
    /// `F11`
    F11 = 0x0044,
    /// `F12`
    F12 = 0x0045,
    /// Print Screen
    PrintScreen = 0x0046,
    /// Scroll Lock
    ScrollLock = 0x0047,
    /// Pause
    Pause = 0x0048,
    /// Insert
    Insert = 0x0049,
    /// Home
    Home = 0x004A,
    /// Page Up
    PageUp = 0x004B,
    /// Delete
    Delete = 0x004C,
    /// End
    End = 0x004D,
    /// Page Down
    PageDown = 0x004E,
    /// Right arrow
    Right = 0x004F,
    /// Left arrow
    Left = 0x0050,
    /// Down arrow
    Down = 0x0051,
    /// Up arrow
    Up = 0x0052,
    /// Nums Lock
    NumLock = 0x0053,
    /// `/` on keypad
    KpSlash = 0x0054,
    /// `*` on keypad
    KpAsterisk = 0x0055,
    /// `-` on keypad
    KpMinus = 0x0056,
    /// `+` on keypad
    KpPlus = 0x0057,
    /// `Enter` on keypad
    KpEnter = 0x0058,
    /// `1` on keypad
    Kp1 = 0x0059,
    /// `2` on keypad
    Kp2 = 0x005A,
    /// `3` on keypad
    Kp3 = 0x005B,
    /// `4` on keypad
    Kp4 = 0x005C,
    /// `5` on keypad
    Kp5 = 0x005D,
    /// `6` on keypad
    Kp6 = 0x005E,
    /// `7` on keypad
    Kp7 = 0x005F,
    /// `8` on keypad
    Kp8 = 0x0060,
    /// `9` on keypad
    Kp9 = 0x0061,
    /// `0` on keypad
    Kp0 = 0x0062,
    /// `.` on keypad
    KpDot = 0x0063,
    /// Non-US `\` or `|`
    NonusBackslash = 0x0064,
    /// `Application`
    Application = 0x0065,
    /// `Power`
    KbPower = 0x0066,
    /// `=` on keypad
    KpEqual = 0x0067,
    /// `F13`
    F13 = 0x0068,
    /// `F14`
    F14 = 0x0069,
    /// `F15`
    F15 = 0x006A,
    /// `F16`
    F16 = 0x006B,
    /// `F17`
    F17 = 0x006C,
    /// `F18`
    F18 = 0x006D,
    /// `F19`
    F19 = 0x006E,
    /// `F20`
    F20 = 0x006F,
    /// `F21`
    F21 = 0x0070,
    /// `F22`
    F22 = 0x0071,
    /// `F23`
    F23 = 0x0072,
    /// `F24`
    F24 = 0x0073,
    Execute = 0x0074,
    Help = 0x0075,
    Menu = 0x0076,
    Select = 0x0077,
    Stop = 0x0078,
    Again = 0x0079,
    Undo = 0x007A,
    Cut = 0x007B,
    Copy = 0x007C,
    Paste = 0x007D,
    Find = 0x007E,
    /// Mute
    KbMute = 0x007F,
    /// Volume Up
    KbVolumeUp = 0x0080,
    /// Volume Down
    KbVolumeDown = 0x0081,
    /// Locking Caps Lock
    LockingCapsLock = 0x0082,
    /// Locking Num Lock
    LockingNumLock = 0x0083,
    /// Locking scroll lock
    LockingScrollLock = 0x0084,
    KpComma = 0x0085,
    KpEqualAs400 = 0x0086,
    International1 = 0x0087,
    International2 = 0x0088,
    International3 = 0x0089,
    International4 = 0x008A,
    International5 = 0x008B,
    International6 = 0x008C,
    International7 = 0x008D,
    International8 = 0x008E,
    International9 = 0x008F,
    Language1 = 0x0090,
    Language2 = 0x0091,
    Language3 = 0x0092,
    Language4 = 0x0093,
    Language5 = 0x0094,
    Language6 = 0x0095,
    Language7 = 0x0096,
    Language8 = 0x0097,
    Language9 = 0x0098,
    AlternateErase = 0x0099,
    SystemRequest = 0x009A,
    Cancel = 0x009B,
    Clear = 0x009C,
    Prior = 0x009D,
    Return = 0x009E,
    Separator = 0x009F,
    Out = 0x00A0,
    Oper = 0x00A1,
    ClearAgain = 0x00A2,
    Crsel = 0x00A3,
    Exsel = 0x00A4,
    SystemPower = 0x00A5,
    SystemSleep = 0x00A6,
    SystemWake = 0x00A7,
    AudioMute = 0x00A8,
    AudioVolUp = 0x00A9,
    AudioVolDown = 0x00AA,
    MediaNextTrack = 0x00AB,
    MediaPrevTrack = 0x00AC,
    MediaStop = 0x00AD,
    MediaPlayPause = 0x00AE,
    MediaSelect = 0x00AF,
    MediaEject = 0x00B0,
    Mail = 0x00B1,
    Calculator = 0x00B2,
    MyComputer = 0x00B3,
    WwwSearch = 0x00B4,
    WwwHome = 0x00B5,
    WwwBack = 0x00B6,
    WwwForward = 0x00B7,
    WwwStop = 0x00B8,
    WwwRefresh = 0x00B9,
    WwwFavorites = 0x00BA,
    MediaFastForward = 0x00BB,
    MediaRewind = 0x00BC,
    /// Brightness Up
    BrightnessUp = 0x00BD,
    /// Brightness Down
    BrightnessDown = 0x00BE,
    ControlPanel = 0x00BF,
    Assistant = 0x00C0,
    MissionControl = 0x00C1,
    Launchpad = 0x00C2,
    /// Mouse Up
    MouseUp = 0x00CD,
    /// Mouse Down
    MouseDown = 0x00CE,
    /// Mouse Left
    MouseLeft = 0x00CF,
    /// Mouse Right
    MouseRight = 0x00D0,
    /// Mouse Button 1(Left)
    MouseBtn1 = 0x00D1,
    /// Mouse Button 2(Right)
    MouseBtn2 = 0x00D2,
    /// Mouse Button 3(Middle)
    MouseBtn3 = 0x00D3,
    /// Mouse Button 4(Back)
    MouseBtn4 = 0x00D4,
    /// Mouse Button 5(Forward)
    MouseBtn5 = 0x00D5,
    MouseBtn6 = 0x00D6,
    MouseBtn7 = 0x00D7,
    MouseBtn8 = 0x00D8,
    MouseWheelUp = 0x00D9,
    MouseWheelDown = 0x00DA,
    MouseWheelLeft = 0x00DB,
    MouseWheelRight = 0x00DC,
    MouseAccel0 = 0x00DD,
    MouseAccel1 = 0x00DE,
    MouseAccel2 = 0x00DF,
    /// Left Control
    LCtrl = 0x00E0,
    /// Left Shift
    LShift = 0x00E1,
    /// Left Alt
    LAlt = 0x00E2,
    /// Left GUI
    LGui = 0x00E3,
    /// Right Control
    RCtrl = 0x00E4,
    /// Right Shift
    RShift = 0x00E5,
    /// Right Alt
    RAlt = 0x00E6,
    /// Right GUI
    RGui = 0x00E7,
}

impl HidKeyCode {
    /// Returns `true` if the keycode is a plain key that occupies a slot in the keyboard report
    pub fn is_basic_key(self) -> bool {
        HidKeyCode::A <= self && self <= HidKeyCode::Exsel
    }

    /// Returns `true` if the keycode is a modifier keycode
    pub fn is_modifier(self) -> bool {
        HidKeyCode::LCtrl <= self && self <= HidKeyCode::RGui
    }

    /// Returns `true` if the keycode is a mouse keycode
    pub fn is_mouse_key(self) -> bool {
        HidKeyCode::MouseUp <= self && self <= HidKeyCode::MouseAccel2
    }

    /// Returns `true` if the keycode is one of the eight mouse buttons
    pub fn is_mouse_button(self) -> bool {
        HidKeyCode::MouseBtn1 <= self && self <= HidKeyCode::MouseBtn8
    }

    /// Returns the modifier byte with the bit of this modifier keycode set.
    /// Non-modifier keycodes give an empty byte.
    pub fn to_hid_modifiers(self) -> HidModifiers {
        if self.is_modifier() {
            HidModifiers::from_bits(1 << (self as u8 - HidKeyCode::LCtrl as u8))
        } else {
            HidModifiers::new()
        }
    }

    /// Some hid keycodes are processed as consumer keys, for compatibility
    pub fn process_as_consumer(&self) -> Option<ConsumerKey> {
        match self {
            HidKeyCode::AudioMute => Some(ConsumerKey::Mute),
            HidKeyCode::AudioVolUp => Some(ConsumerKey::VolumeIncrement),
            HidKeyCode::AudioVolDown => Some(ConsumerKey::VolumeDecrement),
            HidKeyCode::MediaNextTrack => Some(ConsumerKey::NextTrack),
            HidKeyCode::MediaPrevTrack => Some(ConsumerKey::PrevTrack),
            HidKeyCode::MediaStop => Some(ConsumerKey::StopPlay),
            HidKeyCode::MediaPlayPause => Some(ConsumerKey::PlayPause),
            HidKeyCode::MediaSelect => Some(ConsumerKey::Record),
            HidKeyCode::MediaEject => Some(ConsumerKey::Eject),
            HidKeyCode::Mail => Some(ConsumerKey::Email),
            HidKeyCode::Calculator => Some(ConsumerKey::Calculator),
            HidKeyCode::MyComputer => Some(ConsumerKey::LocalBrowser),
            HidKeyCode::WwwSearch => Some(ConsumerKey::Search),
            HidKeyCode::WwwHome => Some(ConsumerKey::Home),
            HidKeyCode::WwwBack => Some(ConsumerKey::Back),
            HidKeyCode::WwwForward => Some(ConsumerKey::Forward),
            HidKeyCode::WwwStop => Some(ConsumerKey::Stop),
            HidKeyCode::WwwRefresh => Some(ConsumerKey::Refresh),
            HidKeyCode::WwwFavorites => Some(ConsumerKey::Bookmarks),
            HidKeyCode::MediaFastForward => Some(ConsumerKey::FastForward),
            HidKeyCode::MediaRewind => Some(ConsumerKey::Rewind),
            HidKeyCode::BrightnessUp => Some(ConsumerKey::BrightnessUp),
            HidKeyCode::BrightnessDown => Some(ConsumerKey::BrightnessDown),
            HidKeyCode::ControlPanel => Some(ConsumerKey::ControlPanel),
            HidKeyCode::Assistant => Some(ConsumerKey::Assistant),
            HidKeyCode::MissionControl => Some(ConsumerKey::DesktopShowAllWindows),
            HidKeyCode::Launchpad => Some(ConsumerKey::AcSoftKeyLeft),
            _ => None,
        }
    }

    /// Some hid keycodes are processed as system control keys, for compatibility
    pub fn process_as_system_control(&self) -> Option<SystemControlKey> {
        match self {
            HidKeyCode::SystemPower => Some(SystemControlKey::PowerDown),
            HidKeyCode::SystemSleep => Some(SystemControlKey::Sleep),
            HidKeyCode::SystemWake => Some(SystemControlKey::WakeUp),
            _ => None,
        }
    }

    /// Classify the keycode by the way it reaches the host.
    ///
    /// Error codes (`ErrorRollover`, `PostFail`, `ErrorUndefined`) are never sent and classify as [`KeyClass::No`].
    pub fn classify(self) -> KeyClass {
        match self {
            HidKeyCode::LockingCapsLock => KeyClass::Locking(LockingKey::CapsLock),
            HidKeyCode::LockingNumLock => KeyClass::Locking(LockingKey::NumLock),
            HidKeyCode::LockingScrollLock => KeyClass::Locking(LockingKey::ScrollLock),
            k if k.is_basic_key() => KeyClass::Basic,
            k if k.is_modifier() => KeyClass::Modifier,
            k if k.is_mouse_key() => KeyClass::Mouse,
            k => {
                if let Some(system) = k.process_as_system_control() {
                    KeyClass::System(system)
                } else if let Some(consumer) = k.process_as_consumer() {
                    KeyClass::Consumer(consumer)
                } else {
                    KeyClass::No
                }
            }
        }
    }
}

impl From<u8> for HidKeyCode {
    fn from(value: u8) -> Self {
        Self::from_repr(value).unwrap_or(HidKeyCode::No)
    }
}

/// How a keycode is delivered to the host
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyClass {
    /// Nothing is sent
    No,
    /// A locking key, tapped on the host as its plain lock key
    Locking(LockingKey),
    /// A key occupying one slot of the keyboard report
    Basic,
    /// A bit of the modifier byte
    Modifier,
    /// A usage of the generic desktop page
    System(SystemControlKey),
    /// A usage of the consumer page
    Consumer(ConsumerKey),
    /// Handled by mouse keys or the pointing device
    Mouse,
}

/// Physical locking keys, which report their own "pressed" state instead of a key event
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockingKey {
    CapsLock,
    NumLock,
    ScrollLock,
}

impl LockingKey {
    /// The non-locking key that flips the same lock on the host
    pub fn key(self) -> HidKeyCode {
        match self {
            LockingKey::CapsLock => HidKeyCode::CapsLock,
            LockingKey::NumLock => HidKeyCode::NumLock,
            LockingKey::ScrollLock => HidKeyCode::ScrollLock,
        }
    }

    /// Whether the host reports this lock as on
    pub fn is_on(self, leds: LedIndicator) -> bool {
        match self {
            LockingKey::CapsLock => leds.caps_lock(),
            LockingKey::NumLock => leds.num_lock(),
            LockingKey::ScrollLock => leds.scroll_lock(),
        }
    }
}

/// Keys in consumer page
/// Ref: <https://www.usb.org/sites/default/files/documents/hut1_12v2.pdf#page=75>
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsumerKey {
    No = 0x00,
    BrightnessUp = 0x6F,
    BrightnessDown = 0x70,
    Record = 0xB2,
    FastForward = 0xB3,
    Rewind = 0xB4,
    NextTrack = 0xB5,
    PrevTrack = 0xB6,
    StopPlay = 0xB7,
    Eject = 0xB8,
    PlayPause = 0xCD,
    Mute = 0xE2,
    VolumeIncrement = 0xE9,
    VolumeDecrement = 0xEA,
    Email = 0x18A,
    Calculator = 0x192,
    LocalBrowser = 0x194,
    ControlPanel = 0x19F,
    Assistant = 0x1CB,
    Search = 0x221,
    Home = 0x223,
    Back = 0x224,
    Forward = 0x225,
    Stop = 0x226,
    Refresh = 0x227,
    Bookmarks = 0x22A,
    DesktopShowAllWindows = 0x29F,
    AcSoftKeyLeft = 0x2A0,
}

impl ConsumerKey {
    /// Usage id in the consumer report
    pub const fn usage_id(self) -> u16 {
        self as u16
    }
}

/// Keys in `Generic Desktop Page`, generally used for system control
/// Ref: <https://www.usb.org/sites/default/files/documents/hut1_12v2.pdf#page=26>
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemControlKey {
    No = 0x00,
    PowerDown = 0x81,
    Sleep = 0x82,
    WakeUp = 0x83,
}

impl SystemControlKey {
    /// Usage id in the system control report
    pub const fn usage_id(self) -> u8 {
        self as u8
    }
}
