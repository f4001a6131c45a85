//! Pure math for the globe: spherical mapping, great-circle distance, the 2D
//! collision projection, label canvas sizing and color handling.

pub mod color;
pub mod geo;
pub mod label;

pub use color::{ColorParseError, ColorScheme, Rgb, RgbBasis};
pub use geo::{
    CollisionFootprint, EARTH_RADIUS_M, GLOBE_RADIUS, haversine_m, lat_lon_2d, lat_lon_to_pixel,
    map_point, map_point_scaled, unmap_point,
};
pub use label::{ApproxTextMeasure, LabelCanvas, LabelLayout, TextMeasure, nearest_pow2};
