//! Daylight saving schedules, keyed by their single-character code.

use std::fmt;

/// The daylight saving schedule an airport follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DstType {
    /// `E`
    Europe,
    /// `A`
    UsCanada,
    /// `S`
    SouthAmerica,
    /// `O`
    Australia,
    /// `Z`
    NewZealand,
    /// `N`
    None,
    /// `U`
    Unknown,
}

impl DstType {
    /// Every schedule, in code order.
    pub const ALL: [DstType; 7] = [
        Self::Europe,
        Self::UsCanada,
        Self::SouthAmerica,
        Self::Australia,
        Self::NewZealand,
        Self::None,
        Self::Unknown,
    ];

    /// Maps a code to its schedule, ignoring case.
    ///
    /// Returns `None` for characters that name no schedule.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'E' => Some(Self::Europe),
            'A' => Some(Self::UsCanada),
            'S' => Some(Self::SouthAmerica),
            'O' => Some(Self::Australia),
            'Z' => Some(Self::NewZealand),
            'N' => Some(Self::None),
            'U' => Some(Self::Unknown),
            _ => Option::None,
        }
    }

    /// Returns the upper-case code of this schedule.
    #[must_use]
    pub const fn to_code(self) -> char {
        match self {
            Self::Europe => 'E',
            Self::UsCanada => 'A',
            Self::SouthAmerica => 'S',
            Self::Australia => 'O',
            Self::NewZealand => 'Z',
            Self::None => 'N',
            Self::Unknown => 'U',
        }
    }
}

impl fmt::Display for DstType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_code())
    }
}
