//! The eight movement headings plus "standing still".

use serde::{Deserialize, Serialize};

use crate::Xy;

/// A heading on the grid.
///
/// Serialized as the compass abbreviations used by the scenario format
/// (`"N"`, `"NE"`, …, `"X"` for none).
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
pub enum Direction {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "W")]
    West,
    #[serde(rename = "NE")]
    NorthEast,
    #[serde(rename = "NW")]
    NorthWest,
    #[serde(rename = "SE")]
    SouthEast,
    #[serde(rename = "SW")]
    SouthWest,
    #[serde(rename = "X")]
    None,
}

impl Direction {
    /// The unit displacement of this heading.  North is negative y.
    pub fn vector(self) -> Xy {
        match self {
            Self::North => Xy::new(0, -1),
            Self::East => Xy::new(1, 0),
            Self::South => Xy::new(0, 1),
            Self::West => Xy::new(-1, 0),
            Self::NorthEast => Xy::new(1, -1),
            Self::NorthWest => Xy::new(-1, -1),
            Self::SouthEast => Xy::new(1, 1),
            Self::SouthWest => Xy::new(-1, 1),
            Self::None => Xy::ZERO,
        }
    }

    /// The heading of a unit displacement.
    ///
    /// # Panics
    ///
    /// Panics if a component of `vector` is outside `[-1, 1]`; velocities
    /// are clamped before this is called.
    pub fn from_vector(vector: Xy) -> Self {
        match (vector.x, vector.y) {
            (0, -1) => Self::North,
            (1, 0) => Self::East,
            (0, 1) => Self::South,
            (-1, 0) => Self::West,
            (1, -1) => Self::NorthEast,
            (-1, -1) => Self::NorthWest,
            (1, 1) => Self::SouthEast,
            (-1, 1) => Self::SouthWest,
            (0, 0) => Self::None,
            _ => panic!("not a unit displacement: {vector}"),
        }
    }

    /// Map a numeric RNG draw onto a heading; out-of-range indices mean
    /// "stand still".
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            3 => Self::West,
            4 => Self::NorthEast,
            5 => Self::NorthWest,
            6 => Self::SouthEast,
            7 => Self::SouthWest,
            _ => Self::None,
        }
    }
}
