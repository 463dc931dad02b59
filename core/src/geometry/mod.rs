use nalgebra as na;

pub type Point3 = na::Point3<f64>;

pub mod bounds;
pub use bounds::*;

pub mod seed;
pub use seed::bounding_extrude;
