//! Polyhouse Planner - greenhouse layout optimization for land parcels
//!
//! Given a parcel boundary, user zones and optional terrain analysis, the
//! planner decides how many modular structures to build, their sizes,
//! positions and orientation. Large structures go first, all at one
//! solar-aligned angle, each keeping an access corridor; smaller infill
//! structures only fill what is left.

pub mod core;
pub mod geometry;
pub mod orientation;
pub mod parcel;
pub mod placement;
pub mod planning;
pub mod region;
