pub mod board;
pub mod builder;
pub mod cache;
pub mod editor;
pub mod error;
pub mod flight;
pub mod options;
pub mod rescale;

pub use error::GridError;
