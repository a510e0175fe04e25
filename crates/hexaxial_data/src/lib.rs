pub mod coord;
pub mod geometry;
pub mod layout;
pub mod math;
