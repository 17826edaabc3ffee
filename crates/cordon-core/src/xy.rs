//! Integer cell coordinates and displacement arithmetic.
//!
//! `Xy` doubles as a grid cell and as a displacement between cells; the
//! arithmetic impls below make geometry code read like the math it encodes.
//! Components are `isize` so that padding subtraction may momentarily leave
//! the grid before being clipped back in.

use std::fmt;
use std::ops;

use serde::{Deserialize, Serialize};

/// A two-dimensional integer vector.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Xy {
    pub x: isize,
    pub y: isize,
}

impl Xy {
    /// The origin (both components zero).
    pub const ZERO: Xy = Xy { x: 0, y: 0 };

    #[inline]
    pub fn new(x: isize, y: isize) -> Self {
        Self { x, y }
    }

    /// Clamp both components into `[min, max]`.
    ///
    /// Used to limit a velocity to one cell per axis per tick.
    #[inline]
    pub fn clamp(self, min: isize, max: isize) -> Self {
        Self {
            x: self.x.clamp(min, max),
            y: self.y.clamp(min, max),
        }
    }

    /// Manhattan distance between two cells.
    #[inline]
    pub fn manhattan(self, other: Xy) -> usize {
        (self.x.abs_diff(other.x)) + (self.y.abs_diff(other.y))
    }
}

impl ops::Add for Xy {
    type Output = Xy;
    #[inline]
    fn add(self, rhs: Xy) -> Xy {
        Xy::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl ops::Add<isize> for Xy {
    type Output = Xy;
    #[inline]
    fn add(self, rhs: isize) -> Xy {
        Xy::new(self.x + rhs, self.y + rhs)
    }
}

impl ops::Sub for Xy {
    type Output = Xy;
    #[inline]
    fn sub(self, rhs: Xy) -> Xy {
        Xy::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl ops::Sub<isize> for Xy {
    type Output = Xy;
    #[inline]
    fn sub(self, rhs: isize) -> Xy {
        Xy::new(self.x - rhs, self.y - rhs)
    }
}

impl From<(isize, isize)> for Xy {
    #[inline]
    fn from((x, y): (isize, isize)) -> Xy {
        Xy::new(x, y)
    }
}

impl fmt::Display for Xy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
