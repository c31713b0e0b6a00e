use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a key takes part in a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrowKind {
    /// Momentary trigger resolved by a single event (wheel ticks)
    Single,
    /// Held trigger with a press and a later release (buttons, keyboard keys)
    Double,
}

/// Macro for defining logical keys
///
/// Syntax: `Name = code, kind`
///
/// Kinds: single, double
///
/// Example:
/// ```ignore
/// RightButton = 273, double,
/// WheelUp = 768, single,
/// ```
macro_rules! define_keys {
    (
        $(
            $variant:ident = $code:literal, $kind:ident,
        )*
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum LogicalKey {
            $(
                $variant = $code,
            )*
        }

        impl LogicalKey {
            /// Every key in declaration order
            pub const ALL: &'static [Self] = &[
                $(
                    Self::$variant,
                )*
            ];

            /// Look a key up by its numeric code
            #[must_use]
            pub const fn from_code(code: u16) -> Option<Self> {
                match code {
                    $(
                        $code => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }

            #[must_use]
            pub const fn code(self) -> u16 {
                self as u16
            }

            #[must_use]
            pub const fn kind(self) -> ThrowKind {
                match self {
                    $(
                        Self::$variant => define_keys!(@@kind $kind),
                    )*
                }
            }

            /// Get the name of this key (e.g., "RightButton")
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(
                        Self::$variant => stringify!($variant),
                    )*
                }
            }
        }
    };

    (@@kind single) => { ThrowKind::Single };
    (@@kind double) => { ThrowKind::Double };
}

// Buttons and keyboard keys use their evdev codes; the wheel has no key code
// in evdev so it lives in an unused block above 0x2ff.
define_keys! {
    // Mouse buttons
    LeftButton = 272, double,
    RightButton = 273, double,
    MiddleButton = 274, double,
    X1Button = 275, double,
    X2Button = 276, double,

    // Wheel
    WheelUp = 768, single,
    WheelDown = 769, single,
    WheelLeft = 770, single,
    WheelRight = 771, single,

    // Modifiers (logical keys carry the left-hand code)
    Ctrl = 29, double,
    Shift = 42, double,
    Alt = 56, double,
    Meta = 125, double,

    // Letters
    A = 30, double,
    B = 48, double,
    C = 46, double,
    D = 32, double,
    E = 18, double,
    F = 33, double,
    G = 34, double,
    H = 35, double,
    I = 23, double,
    J = 36, double,
    K = 37, double,
    L = 38, double,
    M = 50, double,
    N = 49, double,
    O = 24, double,
    P = 25, double,
    Q = 16, double,
    R = 19, double,
    S = 31, double,
    T = 20, double,
    U = 22, double,
    V = 47, double,
    W = 17, double,
    X = 45, double,
    Y = 21, double,
    Z = 44, double,

    // Numbers
    D1 = 2, double,
    D2 = 3, double,
    D3 = 4, double,
    D4 = 5, double,
    D5 = 6, double,
    D6 = 7, double,
    D7 = 8, double,
    D8 = 9, double,
    D9 = 10, double,
    D0 = 11, double,

    // Special
    Esc = 1, double,
    Tab = 15, double,
    Enter = 28, double,
    Space = 57, double,
    Backspace = 14, double,

    // Navigation
    Up = 103, double,
    Left = 105, double,
    Right = 106, double,
    Down = 108, double,
    Home = 102, double,
    End = 107, double,
    PageUp = 104, double,
    PageDown = 109, double,

    // Function keys
    F1 = 59, double,
    F2 = 60, double,
    F3 = 61, double,
    F4 = 62, double,
    F5 = 63, double,
    F6 = 64, double,
    F7 = 65, double,
    F8 = 66, double,
    F9 = 67, double,
    F10 = 68, double,
    F11 = 87, double,
    F12 = 88, double,
}

// evdev codes of right-hand modifier variants
const KEY_RIGHTCTRL: u16 = 97;
const KEY_RIGHTSHIFT: u16 = 54;
const KEY_RIGHTALT: u16 = 100;
const KEY_RIGHTMETA: u16 = 126;

impl LogicalKey {
    #[must_use]
    pub const fn is_single_throw(self) -> bool {
        matches!(self.kind(), ThrowKind::Single)
    }

    #[must_use]
    pub const fn is_double_throw(self) -> bool {
        matches!(self.kind(), ThrowKind::Double)
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name: {0}")]
pub struct UnknownKey(pub String);

impl FromStr for LogicalKey {
    type Err = UnknownKey;

    /// Names are matched case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

/// One physical key: a logical key plus the variant that produced it.
///
/// Left and right modifiers share a logical key and differ by `index`
/// (left = 0, right = 1). Keys with a single physical variant use 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalKey {
    pub key: LogicalKey,
    pub index: u8,
}

impl PhysicalKey {
    #[must_use]
    pub const fn new(key: LogicalKey, index: u8) -> Self {
        Self { key, index }
    }

    /// The first (or only) physical variant of a logical key
    #[must_use]
    pub const fn primary(key: LogicalKey) -> Self {
        Self { key, index: 0 }
    }

    /// Normalize an evdev key or button code into a physical key
    #[must_use]
    pub const fn from_evdev_code(code: u16) -> Option<Self> {
        match code {
            KEY_RIGHTCTRL => Some(Self::new(LogicalKey::Ctrl, 1)),
            KEY_RIGHTSHIFT => Some(Self::new(LogicalKey::Shift, 1)),
            KEY_RIGHTALT => Some(Self::new(LogicalKey::Alt, 1)),
            KEY_RIGHTMETA => Some(Self::new(LogicalKey::Meta, 1)),
            _ => match LogicalKey::from_code(code) {
                Some(key) => Some(Self::primary(key)),
                None => None,
            },
        }
    }
}

impl From<LogicalKey> for PhysicalKey {
    fn from(key: LogicalKey) -> Self {
        Self::primary(key)
    }
}

impl fmt::Display for PhysicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.key, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for key in LogicalKey::ALL {
            assert_eq!(LogicalKey::from_code(key.code()), Some(*key));
        }
        assert_eq!(LogicalKey::from_code(0xffff), None);
    }

    #[test]
    fn test_throw_kinds() {
        assert!(LogicalKey::WheelUp.is_single_throw());
        assert!(LogicalKey::RightButton.is_double_throw());
        assert!(LogicalKey::Ctrl.is_double_throw());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("rightbutton".parse::<LogicalKey>(), Ok(LogicalKey::RightButton));
        assert_eq!("WheelDown".parse::<LogicalKey>(), Ok(LogicalKey::WheelDown));
        assert_eq!(
            "Hyper".parse::<LogicalKey>(),
            Err(UnknownKey("Hyper".to_string()))
        );
    }

    #[test]
    fn test_right_modifiers_share_logical_key() {
        let left = PhysicalKey::from_evdev_code(29).unwrap();
        let right = PhysicalKey::from_evdev_code(KEY_RIGHTCTRL).unwrap();
        assert_eq!(left.key, right.key);
        assert_ne!(left, right);
        assert_eq!(right.index, 1);
        assert_eq!(
            PhysicalKey::from_evdev_code(273),
            Some(PhysicalKey::primary(LogicalKey::RightButton))
        );
    }
}
