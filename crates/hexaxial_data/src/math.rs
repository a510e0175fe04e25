pub mod consts {
    pub use core::f32::consts::*;

    /// `sqrt(3)`, the width of a pointy hex relative to its side length.
    pub const SQRT_3: f32 = 1.732_050_8;
}

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vec2 = vek::Vec2<Float>;
pub type Vec3 = vek::Vec3<Float>;

pub type Rgba = vek::Rgba<Float>;

#[inline]
#[must_use]
pub fn vec2_to_radians(d: Vec2) -> Float {
    let angle = d.y.atan2(d.x);

    angle.rem_euclid(consts::TAU)
}

/// Returns true if every component of `v` is finite.
#[inline]
#[must_use]
pub fn is_finite2(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

#[inline]
#[must_use]
pub fn is_finite3(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}
