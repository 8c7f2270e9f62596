mod activation;
mod geometry;
mod preview;
mod tiling;
mod tracker;

pub use activation::*;
pub use geometry::*;
pub use preview::*;
pub use tiling::*;
pub use tracker::*;
