use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    coord::{AxialCoord, FractAxial},
    math::{Float, Vec2, Vec3, is_finite2, is_finite3},
};

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum LayoutError {
    #[error("side length must be positive and finite, got {0}")]
    InvalidSideLength(Float),
    #[error("layout offset must be finite")]
    InvalidOffset,
}

fn check_side_length(side_length: Float) -> Result<Float, LayoutError> {
    if side_length.is_finite() && side_length > 0.0 {
        Ok(side_length)
    } else {
        Err(LayoutError::InvalidSideLength(side_length))
    }
}

/// A pointy-top hex layout on a 2D plane, with `y` pointing down.
///
/// `side_length` is the distance from a cell's center to any of its vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    offset: Vec2,
    side_length: Float,
}

impl HexLayout {
    pub fn new(offset: Vec2, side_length: Float) -> Result<Self, LayoutError> {
        if !is_finite2(offset) {
            return Err(LayoutError::InvalidOffset);
        }

        Ok(Self {
            offset,
            side_length: check_side_length(side_length)?,
        })
    }

    #[inline]
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    #[must_use]
    pub const fn side_length(&self) -> Float {
        self.side_length
    }

    /// The same layout with a different side length.
    pub fn with_side_length(self, side_length: Float) -> Result<Self, LayoutError> {
        Self::new(self.offset, side_length)
    }

    /// The same layout as a `hexx` one. Positive `r` grows along `+y`, which is down on screen here.
    #[inline]
    #[must_use]
    pub fn hexx(&self) -> hexx::HexLayout {
        hexx::HexLayout {
            orientation: hexx::HexOrientation::Pointy,
            origin: hexx::Vec2::new(self.offset.x, self.offset.y),
            scale: hexx::Vec2::splat(self.side_length),
        }
    }

    /// The same side length, anchored at the origin. Maps axial deltas to pixel deltas.
    #[inline]
    #[must_use]
    pub fn at_origin(self) -> Self {
        Self {
            offset: Vec2::zero(),
            side_length: self.side_length,
        }
    }

    #[inline]
    #[must_use]
    pub fn to_pixel(&self, coord: AxialCoord) -> Vec2 {
        let p = self.hexx().hex_to_world_pos(coord.into());

        Vec2::new(p.x, p.y)
    }

    #[inline]
    #[must_use]
    pub fn to_fract(&self, pos: Vec2) -> FractAxial {
        let hex = self.hexx().world_pos_to_fract_hex(hexx::Vec2::new(pos.x, pos.y));

        FractAxial::new(hex.x, hex.y)
    }

    #[inline]
    #[must_use]
    pub fn from_pixel(&self, pos: Vec2) -> AxialCoord {
        AxialCoord::round(self.to_fract(pos))
    }

    /// Snaps `pos` to the center of the cell containing it.
    #[inline]
    #[must_use]
    pub fn snap(&self, pos: Vec2) -> Vec2 {
        self.to_pixel(self.from_pixel(pos))
    }
}

/// A pointy-top hex layout laid on the X/Z plane of a 3D world, at a fixed height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldLayout {
    offset: Vec3,
    side_length: Float,
}

impl WorldLayout {
    pub fn new(offset: Vec3, side_length: Float) -> Result<Self, LayoutError> {
        if !is_finite3(offset) {
            return Err(LayoutError::InvalidOffset);
        }

        Ok(Self {
            offset,
            side_length: check_side_length(side_length)?,
        })
    }

    #[inline]
    #[must_use]
    pub const fn offset(&self) -> Vec3 {
        self.offset
    }

    #[inline]
    #[must_use]
    pub const fn side_length(&self) -> Float {
        self.side_length
    }

    pub fn with_side_length(self, side_length: Float) -> Result<Self, LayoutError> {
        Self::new(self.offset, side_length)
    }

    /// The planar part of this layout, `x` to `x` and `z` to `y`.
    #[inline]
    #[must_use]
    pub fn planar(&self) -> HexLayout {
        HexLayout {
            offset: Vec2::new(self.offset.x, self.offset.z),
            side_length: self.side_length,
        }
    }

    #[inline]
    #[must_use]
    pub fn to_world(&self, coord: AxialCoord) -> Vec3 {
        let p = self.planar().to_pixel(coord);

        Vec3::new(p.x, self.offset.y, p.y)
    }

    /// The cell under `pos`. The height of `pos` is ignored.
    #[inline]
    #[must_use]
    pub fn from_world(&self, pos: Vec3) -> AxialCoord {
        self.planar().from_pixel(Vec2::new(pos.x, pos.z))
    }
}

/// Maps a cell to its center in 2D space.
#[inline]
#[must_use]
pub fn axial_to_pixel(layout: &HexLayout, coord: AxialCoord) -> Vec2 {
    layout.to_pixel(coord)
}

/// Maps a point in 2D space to the cell containing it.
#[inline]
#[must_use]
pub fn pixel_to_axial(layout: &HexLayout, pos: Vec2) -> AxialCoord {
    layout.from_pixel(pos)
}

/// Maps a cell to its center in the 3D world.
#[inline]
#[must_use]
pub fn axial_to_world3d(layout: &WorldLayout, coord: AxialCoord) -> Vec3 {
    layout.to_world(coord)
}

/// Maps a point in the 3D world to the cell under it.
#[inline]
#[must_use]
pub fn world3d_to_axial(layout: &WorldLayout, pos: Vec3) -> AxialCoord {
    layout.from_world(pos)
}
