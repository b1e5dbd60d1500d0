//! Geometry kernel: pure, deterministic functions over planar point sets
//!
//! Nothing in here holds state, so every function is safe to call from
//! concurrent planning runs.

pub mod ops;
pub mod polygon;
pub mod projection;
pub mod rect;

pub use ops::{
    difference, distance_to_boundary, intersection, offset_inward, shapes_contain_rect,
    total_area, union, union_all,
};
pub use polygon::{area, centroid, contains, segments_intersect, Shape};
pub use projection::GeoProjection;
pub use rect::OrientedRect;
