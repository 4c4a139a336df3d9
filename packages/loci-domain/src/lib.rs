pub mod coordinates;
pub mod geo;
pub mod rating;
pub mod review;

mod error;

pub use coordinates::Coordinates;
pub use error::{Error, Result};
