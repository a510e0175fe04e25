use serde::{Deserialize, Serialize};

use crate::math::{Float, Rgba, Vec2, consts};

/// The fill state of a placed cell.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fill {
    #[default]
    Dark,
    Light,
}

impl Fill {
    /// The state a toggle moves to. `None` means the cell should be cleared.
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Option<Self> {
        match self {
            Fill::Dark => Some(Fill::Light),
            Fill::Light => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn rgba(self) -> Rgba {
        match self {
            Fill::Dark => Rgba {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
            Fill::Light => Rgba {
                r: 1.0,
                g: 1.0,
                b: 1.0,
                a: 1.0,
            },
        }
    }
}

/// The corners of a pointy hex centered at `origin`, starting at -30 degrees and going clockwise on screen.
#[must_use]
pub fn hex_vertices(origin: Vec2, side_length: Float) -> [Vec2; 6] {
    core::array::from_fn(|i| {
        let angle = (60.0 * i as Float - 30.0).to_radians();

        origin + Vec2::new(angle.cos(), angle.sin()) * side_length
    })
}

/// Everything needed to draw a single hex.
///
/// Always rebuilt as a whole when the origin or side length changes.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexGeometry {
    pub origin: Vec2,
    pub vertices: [Vec2; 6],
    pub side_length: Float,
    pub fill: Fill,
}

impl HexGeometry {
    #[must_use]
    pub fn new(origin: Vec2, side_length: Float, fill: Fill) -> Self {
        Self {
            origin,
            vertices: hex_vertices(origin, side_length),
            side_length,
            fill,
        }
    }

    /// The same cell rebuilt at a new origin and side length, keeping the fill.
    #[inline]
    #[must_use]
    pub fn rebuilt(&self, origin: Vec2, side_length: Float) -> Self {
        Self::new(origin, side_length, self.fill)
    }

    /// Iterates the outline as `(a, b)` segments, closing back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        (0..6).map(|i| (self.vertices[i], self.vertices[(i + 1) % 6]))
    }

    #[inline]
    #[must_use]
    pub fn rgba(&self) -> Rgba {
        self.fill.rgba()
    }

    /// Half of the distance between opposite edges.
    #[inline]
    #[must_use]
    pub fn inner_radius(&self) -> Float {
        self.side_length * consts::SQRT_3 / 2.0
    }
}
