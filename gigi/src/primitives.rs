//! Core geometry and color types.
//!
//! Screen coordinates are split into two scalar types, `X` and `Y`, so that a
//! horizontal quantity can never be added to (or multiplied by) a vertical one
//! by accident. `Pt` pairs them and `Rect` pairs two `Pt`s.
//!
//! Rectangles are not normalized: an inverted `Rect` (lower-right above or to
//! the left of upper-left) is a legal value. Consumers treat it as empty.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

macro_rules! coordinate {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            pub const ZERO: Self = Self(0);

            #[inline]
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            /// The underlying integer value.
            #[inline]
            pub const fn value(self) -> i32 {
                self.0
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            #[inline]
            pub fn clamp(self, lo: Self, hi: Self) -> Self {
                Self(self.0.max(lo.0).min(hi.0))
            }

            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }
        }

        impl From<i32> for $name {
            #[inline]
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            #[inline]
            fn from(value: $name) -> i32 {
                value.0
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $name {
            #[inline]
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        // Scaling by a plain integer is fine; scaling by the other axis is not.
        impl Mul<i32> for $name {
            type Output = Self;
            #[inline]
            fn mul(self, rhs: i32) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl Div<i32> for $name {
            type Output = Self;
            #[inline]
            fn div(self, rhs: i32) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|v| v.0).sum())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

coordinate! {
    /// A horizontal screen coordinate or width.
    X
}

coordinate! {
    /// A vertical screen coordinate or height.
    Y
}

/// A point (or a size, when used as an extent) in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pt {
    pub x: X,
    pub y: Y,
}

impl Pt {
    pub const ORIGIN: Self = Self { x: X::ZERO, y: Y::ZERO };

    #[inline]
    pub const fn new(x: X, y: Y) -> Self {
        Self { x, y }
    }

    /// Shorthand for building a point from raw integers.
    #[inline]
    pub const fn xy(x: i32, y: i32) -> Self {
        Self { x: X(x), y: Y(y) }
    }
}

impl From<(i32, i32)> for Pt {
    fn from((x, y): (i32, i32)) -> Self {
        Self::xy(x, y)
    }
}

impl Add for Pt {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Pt {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl AddAssign for Pt {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Pt {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl fmt::Display for Pt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x.0, self.y.0)
    }
}

/// An axis-aligned rectangle given by its upper-left and lower-right corners.
///
/// The lower-right corner is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub ul: Pt,
    pub lr: Pt,
}

impl Rect {
    pub const ZERO: Self = Self {
        ul: Pt::ORIGIN,
        lr: Pt::ORIGIN,
    };

    #[inline]
    pub const fn new(ul: Pt, lr: Pt) -> Self {
        Self { ul, lr }
    }

    /// Build a rectangle from raw corner coordinates.
    #[inline]
    pub const fn ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            ul: Pt::xy(left, top),
            lr: Pt::xy(right, bottom),
        }
    }

    #[inline]
    pub fn from_origin_size(origin: Pt, size: Pt) -> Self {
        Self {
            ul: origin,
            lr: origin + size,
        }
    }

    #[inline]
    pub fn left(&self) -> X {
        self.ul.x
    }

    #[inline]
    pub fn top(&self) -> Y {
        self.ul.y
    }

    #[inline]
    pub fn right(&self) -> X {
        self.lr.x
    }

    #[inline]
    pub fn bottom(&self) -> Y {
        self.lr.y
    }

    /// Width; negative for horizontally inverted rectangles.
    #[inline]
    pub fn width(&self) -> X {
        self.lr.x - self.ul.x
    }

    /// Height; negative for vertically inverted rectangles.
    #[inline]
    pub fn height(&self) -> Y {
        self.lr.y - self.ul.y
    }

    /// The extent of this rectangle as a `Pt`.
    #[inline]
    pub fn size(&self) -> Pt {
        self.lr - self.ul
    }

    /// True for zero-area and inverted rectangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lr.x <= self.ul.x || self.lr.y <= self.ul.y
    }

    /// Half-open containment test. Never true for an empty rectangle.
    #[inline]
    pub fn contains(&self, pt: Pt) -> bool {
        self.ul.x <= pt.x && pt.x < self.lr.x && self.ul.y <= pt.y && pt.y < self.lr.y
    }

    /// Translate both corners by `offset`.
    #[inline]
    pub fn offset(&self, offset: Pt) -> Self {
        Self {
            ul: self.ul + offset,
            lr: self.lr + offset,
        }
    }

    /// Check if this rectangle overlaps another. Empty rectangles overlap nothing.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.ul.x < other.lr.x
            && other.ul.x < self.lr.x
            && self.ul.y < other.lr.y
            && other.ul.y < self.lr.y
    }

    /// Copy of this rectangle with corners swapped as needed so that `ul <= lr`.
    pub fn normalized(&self) -> Self {
        Self {
            ul: Pt::new(self.ul.x.min(self.lr.x), self.ul.y.min(self.lr.y)),
            lr: Pt::new(self.ul.x.max(self.lr.x), self.ul.y.max(self.lr.y)),
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.ul, self.lr)
    }
}

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Clr {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Clr {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack into a u32 (R in lowest byte).
    #[inline]
    pub fn pack(&self) -> u32 {
        u32::from(self.r)
            | (u32::from(self.g) << 8)
            | (u32::from(self.b) << 16)
            | (u32::from(self.a) << 24)
    }
}
