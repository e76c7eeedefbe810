pub mod map;
pub mod planner;

pub use map::{Bounds, MapMarker, MapView};
pub use planner::TripPlanner;
