//! The globe scene: pins with collision-aware labels, chained markers with
//! animated trails, satellites, the intro sequence and the frame loop that
//! drives them.

pub mod clock;
pub mod data;
pub mod error;
pub mod globe;
pub mod intro;
pub mod marker;
pub mod pin;
pub mod readiness;
pub mod satellite;
pub mod stage;
pub mod trail;

pub use clock::{Clock, ManualClock, SystemClock};
pub use data::{DataPoint, PendingData};
pub use error::GlobeError;
pub use globe::{
    BASE_CAMERA_DISTANCE, DESTROY_GRACE_MS, Globe, GlobeOptions, GlobeState, PIN_ALTITUDE,
    PUSH_BACK_AGE_MS,
};
pub use intro::{IntroLines, intro_opacity};
pub use marker::{Connection, MARKER_ALTITUDE, Marker, MarkerId, MarkerSpec, attenuate_scale};
pub use pin::{ALTITUDE_CHANGE_MS, Pin, PinAction, PinFlags, PinId, PinOptions, PinSpec};
pub use readiness::{CapabilityProbe, FontError, FontLoader, StaticFontLoader, StaticProbe, preflight};
pub use satellite::{
    SATELLITE_SIZE, Satellite, SatelliteOptions, SatelliteSpec, satellite_key,
    satellite_orientation, tilt_direction, tilt_multiplier,
};
pub use stage::{Stage, Tweened};
pub use trail::{
    ARC_THRESHOLD_M, TRAIL_ALTITUDE, Trail, TrailPhase, Waypoint, dotted_waypoints, trail_waypoints,
    trail_widths,
};
