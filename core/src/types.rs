use serde::{Deserialize, Serialize};

/// Frames in one revolution of the digit display's busy animation: the six
/// outer segments plus a repeat of the first. The frame patterns belong to
/// the device; the frame count is shared so cadence math stays consistent.
pub const BUSY_ANIMATION_FRAMES: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Off,
    Heat,
    Cool,
}

impl Mode {
    /// Lowercase identifier, as transmitted in status records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
        }
    }

    /// The next mode in the fixed Off -> Heat -> Cool -> Off cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::Heat,
            Self::Heat => Self::Cool,
            Self::Cool => Self::Off,
        }
    }

    /// Steady digit-display symbol for this mode.
    pub fn glyph(self) -> Glyph {
        match self {
            Self::Off => Glyph::Off,
            Self::Heat => Glyph::Heat,
            Self::Cool => Glyph::Cool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Fahrenheit,
    Celsius,
}

impl Unit {
    pub fn toggled(self) -> Self {
        match self {
            Self::Fahrenheit => Self::Celsius,
            Self::Celsius => Self::Fahrenheit,
        }
    }

    /// Single-letter suffix used on the text display.
    pub fn letter(self) -> char {
        match self {
            Self::Fahrenheit => 'F',
            Self::Celsius => 'C',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorState {
    Off,
    On,
    Pulsing,
}

impl IndicatorState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Pulsing => "pulsing",
        }
    }
}

/// Symbols the single-digit display can show. The unit-acknowledge glyphs
/// carry the decimal point, which is what distinguishes `UnitCelsius` from
/// the Cool mode's plain 'C'.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Digit(u8),
    Heat,
    Cool,
    Off,
    Up,
    Down,
    UnitFahrenheit,
    UnitCelsius,
}

impl Glyph {
    /// Closest printable character, for console devices and logs.
    pub fn as_char(self) -> char {
        match self {
            Self::Digit(n) => char::from_digit(u32::from(n.min(9)), 10).unwrap_or('0'),
            Self::Heat => 'H',
            Self::Cool => 'C',
            Self::Off => 'O',
            Self::Up => 'u',
            Self::Down => 'd',
            Self::UnitFahrenheit => 'F',
            Self::UnitCelsius => 'C',
        }
    }
}
