//! Region quadtree over the flat collision plane.
//!
//! Annotations are projected into a 180x360 rectangle (latitude along x,
//! longitude along y) and stored as circles. The tree answers "which stored
//! circles overlap this one" so that labels can avoid covering each other.

mod quadtree;

pub use quadtree::{Circle, DEFAULT_MAX_DEPTH, DEFAULT_MAX_OBJECTS, Quadtree, Rect};
