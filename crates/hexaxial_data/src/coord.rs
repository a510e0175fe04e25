use std::{
    fmt::{Display, Formatter},
    ops::{Add, Mul, Neg, Sub},
};

use serde::{Deserialize, Serialize};

use crate::math::{Int, UInt, Vec2};

/// The type that will be used to represent a cell's coordinates.
pub type AxialUnit = Int;
pub type UnsignedAxialUnit = UInt;

/// A fractional axial coordinate, `x` is `q` and `y` is `r`.
pub type FractAxial = Vec2;

/// One of the six edge directions of a pointy hex.
///
/// The order of the variants is fixed, each one is the previous turned by 60 degrees
/// counter-clockwise on screen (with y pointing down).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    Right,
    TopRight,
    TopLeft,
    Left,
    BottomLeft,
    BottomRight,
}

impl HexDirection {
    pub const ALL: [Self; 6] = [
        Self::Right,
        Self::TopRight,
        Self::TopLeft,
        Self::Left,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    /// The unit offset of this direction.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> AxialCoord {
        match self {
            Self::Right => AxialCoord::new(1, 0),
            Self::TopRight => AxialCoord::new(1, -1),
            Self::TopLeft => AxialCoord::new(0, -1),
            Self::Left => AxialCoord::new(-1, 0),
            Self::BottomLeft => AxialCoord::new(-1, 1),
            Self::BottomRight => AxialCoord::new(0, 1),
        }
    }

    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }
}

impl Display for HexDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Represents a cell's coordinate.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AxialCoord {
    pub q: AxialUnit,
    pub r: AxialUnit,
}

impl AxialCoord {
    /// Creates a new coordinate `(q, r)`.
    #[inline]
    #[must_use]
    pub const fn new(q: AxialUnit, r: AxialUnit) -> Self {
        Self { q, r }
    }

    #[inline]
    #[must_use]
    pub const fn s(self) -> AxialUnit {
        -self.q - self.r
    }

    pub const ZERO: Self = Self::new(0, 0);

    pub const RIGHT: Self = HexDirection::Right.offset();
    pub const TOP_RIGHT: Self = HexDirection::TopRight.offset();
    pub const TOP_LEFT: Self = HexDirection::TopLeft.offset();
    pub const LEFT: Self = HexDirection::Left.offset();
    pub const BOTTOM_LEFT: Self = HexDirection::BottomLeft.offset();
    pub const BOTTOM_RIGHT: Self = HexDirection::BottomRight.offset();

    pub const EDGES: [Self; 6] = [
        Self::RIGHT,
        Self::TOP_RIGHT,
        Self::TOP_LEFT,
        Self::LEFT,
        Self::BOTTOM_LEFT,
        Self::BOTTOM_RIGHT,
    ];
}

impl AxialCoord {
    #[inline]
    #[must_use]
    pub const fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }

    #[inline]
    #[must_use]
    pub const fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }

    #[inline]
    #[must_use]
    pub const fn mul(self, rhs: AxialUnit) -> Self {
        Self::new(self.q * rhs, self.r * rhs)
    }

    #[inline]
    #[must_use]
    pub const fn neg(self) -> Self {
        Self::new(-self.q, -self.r)
    }

    /// The adjacent cell in `dir`.
    #[inline]
    #[must_use]
    pub const fn neighbor(self, dir: HexDirection) -> Self {
        self.add(dir.offset())
    }

    /// Creates a list of the neighbors, in [`HexDirection::ALL`] order.
    #[inline]
    #[must_use]
    pub const fn neighbors(self) -> [Self; 6] {
        [
            self.add(Self::EDGES[0]),
            self.add(Self::EDGES[1]),
            self.add(Self::EDGES[2]),
            self.add(Self::EDGES[3]),
            self.add(Self::EDGES[4]),
            self.add(Self::EDGES[5]),
        ]
    }

    /// Rotates `self` around the origin clockwise.
    #[inline]
    #[must_use]
    pub const fn cw(self) -> Self {
        Self::new(-self.r, -self.s())
    }

    /// Rotates `self` around the origin counter-clockwise.
    #[inline]
    #[must_use]
    pub const fn ccw(self) -> Self {
        Self::new(-self.s(), -self.q)
    }

    /// Rotates `self` around `center` clockwise by `m` turns.
    #[inline]
    #[must_use]
    pub const fn rotate_cw_around(self, center: Self, m: u32) -> Self {
        let mut v = self.sub(center);
        let mut i = 0;
        while i < m % 6 {
            v = v.cw();
            i += 1;
        }

        v.add(center)
    }

    /// Rounds a fractional coordinate to the cell containing it.
    ///
    /// Rounds all three cube components, then recomputes the one that moved the most
    /// so that `q + r + s == 0` holds.
    #[inline]
    #[must_use]
    pub fn round(fract: FractAxial) -> Self {
        let q = fract.x;
        let r = fract.y;
        let s = -q - r;

        let [mut q_r, mut r_r, s_r] = [q.round(), r.round(), s.round()];
        let [q_d, r_d, s_d] = [(q_r - q).abs(), (r_r - r).abs(), (s_r - s).abs()];

        if q_d > r_d && q_d > s_d {
            q_r = -r_r - s_r;
        } else if r_d > s_d {
            r_r = -q_r - s_r;
        }

        Self::new(q_r as AxialUnit, r_r as AxialUnit)
    }

    /// Number of steps from the zero cell, the largest of `|q|`, `|r|` and `|s|`.
    ///
    /// See [`Self::ulength`] for the unsigned version
    #[inline]
    #[must_use]
    pub const fn length(self) -> AxialUnit {
        self.ulength() as AxialUnit
    }

    /// Computes coordinates length as an unsigned integer.
    ///
    /// See [`Self::length`] for the signed version
    #[inline]
    #[must_use]
    pub const fn ulength(self) -> UnsignedAxialUnit {
        let (q, r, s) = (self.q.unsigned_abs(), self.r.unsigned_abs(), self.s().unsigned_abs());
        let qr = if q > r { q } else { r };

        if qr > s { qr } else { s }
    }

    /// The hex distance between two cells.
    #[inline]
    #[must_use]
    pub const fn distance_to(self, other: Self) -> AxialUnit {
        self.sub(other).length()
    }

    /// Creates a minimal string representation of the coordinate.
    #[inline]
    #[must_use]
    pub fn to_minimal_string(self) -> String {
        format!("{},{}", self.q, self.r)
    }
}

/// Returns the adjacent cell of `coord` in `dir`.
#[inline]
#[must_use]
pub const fn neighbor(coord: AxialCoord, dir: HexDirection) -> AxialCoord {
    coord.neighbor(dir)
}

/// Returns the hex distance between `a` and `b`.
#[inline]
#[must_use]
pub const fn distance(a: AxialCoord, b: AxialCoord) -> AxialUnit {
    a.distance_to(b)
}

/// Number of cells within `radius` rings of a center cell, the center included.
#[inline]
#[must_use]
pub const fn ring_count(radius: UnsignedAxialUnit) -> usize {
    // formula from https://www.redblobgames.com/grids/hexagons/#rings-spiral
    1 + 3 * (radius as usize) * (radius as usize + 1)
}

impl From<hexx::Hex> for AxialCoord {
    fn from(hex: hexx::Hex) -> Self {
        Self::new(hex.x, hex.y)
    }
}

impl From<AxialCoord> for hexx::Hex {
    fn from(coord: AxialCoord) -> Self {
        hexx::Hex::new(coord.q, coord.r)
    }
}

impl Display for AxialCoord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("[{}, {}]", self.q, self.r))
    }
}

impl Add for AxialCoord {
    type Output = AxialCoord;

    fn add(self, rhs: AxialCoord) -> Self::Output {
        AxialCoord::add(self, rhs)
    }
}

impl Sub for AxialCoord {
    type Output = AxialCoord;

    fn sub(self, rhs: AxialCoord) -> Self::Output {
        AxialCoord::sub(self, rhs)
    }
}

impl Mul<AxialUnit> for AxialCoord {
    type Output = AxialCoord;

    fn mul(self, rhs: AxialUnit) -> Self::Output {
        AxialCoord::mul(self, rhs)
    }
}

impl Mul<AxialCoord> for AxialUnit {
    type Output = AxialCoord;

    fn mul(self, rhs: AxialCoord) -> Self::Output {
        rhs.mul(self)
    }
}

impl Neg for AxialCoord {
    type Output = AxialCoord;

    fn neg(self) -> Self::Output {
        AxialCoord::neg(self)
    }
}

/// Every cell within `radius` rings of `center`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct RadialBounds {
    center: AxialCoord,
    radius: UnsignedAxialUnit,
}

impl RadialBounds {
    #[inline]
    #[must_use]
    pub const fn new(center: AxialCoord, radius: UnsignedAxialUnit) -> Self {
        Self { center, radius }
    }

    #[inline]
    #[must_use]
    pub const fn center(&self) -> AxialCoord {
        self.center
    }

    #[inline]
    #[must_use]
    pub const fn radius(&self) -> UnsignedAxialUnit {
        self.radius
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, coord: AxialCoord) -> bool {
        (coord.sub(self.center)).ulength() <= self.radius
    }
}

/// Walks a [`RadialBounds`] ring by ring, starting at the center.
///
/// Each ring starts at `center + RIGHT * ring` and proceeds around the ring
/// in [`HexDirection::ALL`] order.
#[derive(Debug, Clone)]
pub struct RadialIter {
    bounds: RadialBounds,
    count: usize,
    progress: UnsignedAxialUnit,
    ring: UnsignedAxialUnit,
}

impl RadialIter {
    #[inline]
    #[must_use]
    pub fn new(bounds: RadialBounds) -> Self {
        Self {
            bounds,
            count: ring_count(bounds.radius),
            progress: 0,
            ring: 0,
        }
    }
}

impl Iterator for RadialIter {
    type Item = AxialCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count == 0 {
            debug_assert_eq!(self.progress, 0);
            debug_assert_eq!(self.ring, self.bounds.radius + 1);

            return None;
        }

        let result = if self.ring == 0 {
            self.ring = 1;

            self.bounds.center
        } else {
            #[cfg(debug_assertions)]
            if self.ring > self.bounds.radius {
                panic!("RadialIter exceeded the radius of its bounds. Iterator state: {:?}", self)
            }

            let ring = self.ring;
            let (side, step) = (self.progress / ring, self.progress % ring);

            // walk each side of the ring starting from its corner
            let corner = HexDirection::from_index(side as usize).offset() * ring as AxialUnit;
            let walk = HexDirection::from_index(side as usize + 2).offset() * step as AxialUnit;
            let coord = self.bounds.center + corner + walk;

            self.progress += 1;
            if self.progress == ring * 6 {
                self.progress = 0;
                self.ring += 1;
            }

            coord
        };

        self.count -= 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count, Some(self.count))
    }
}

impl ExactSizeIterator for RadialIter {}

impl IntoIterator for RadialBounds {
    type Item = AxialCoord;
    type IntoIter = RadialIter;

    fn into_iter(self) -> Self::IntoIter {
        RadialIter::new(self)
    }
}
