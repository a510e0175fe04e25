use std::time::Duration;

use hexaxial_data::{
    coord::AxialCoord,
    layout::LayoutError,
    math::{Float, Vec2},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("a rescale is already in flight")]
    RescaleInFlight,
    #[error("a grid build is already in flight")]
    BuildInFlight,
    #[error("index {index} is out of range {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no cell at {0}")]
    MissingCell(AxialCoord),
    #[error("grid build did not finish within {0:?}")]
    BuildTimedOut(Duration),
    #[error("grid build was dropped before finishing")]
    BuildAborted,
    #[error("side length must be positive and finite, got {0}")]
    InvalidSideLength(Float),
    #[error("pointer {0:?} is outside of the viewport")]
    PointerOutOfBounds(Vec2),
    #[error(transparent)]
    Layout(LayoutError),
}

impl From<LayoutError> for GridError {
    fn from(value: LayoutError) -> Self {
        match value {
            LayoutError::InvalidSideLength(v) => GridError::InvalidSideLength(v),
            v => GridError::Layout(v),
        }
    }
}
