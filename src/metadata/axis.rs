//! Image axes

use std::fmt;

/// One addressable dimension of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Columns within a plane
    X,
    /// Rows within a plane
    Y,
    /// Focal slices
    Z,
    /// Channels
    Channel,
    /// Time points
    Time,
}

impl Axis {
    /// Every axis in canonical order
    pub const ALL: [Axis; 5] = [Axis::X, Axis::Y, Axis::Z, Axis::Channel, Axis::Time];

    /// Slot of this axis in fixed-size per-axis arrays
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::Channel => 3,
            Axis::Time => 4,
        }
    }

    /// Single letter used in dimension order strings
    pub fn letter(&self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
            Axis::Channel => 'C',
            Axis::Time => 'T',
        }
    }

    /// Parses a dimension order letter, case-insensitively
    pub fn from_letter(letter: char) -> Option<Axis> {
        match letter.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            'C' => Some(Axis::Channel),
            'T' => Some(Axis::Time),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::Channel => "Channel",
            Axis::Time => "Time",
        };
        write!(f, "{}", name)
    }
}
