//! Satellites hovering above the globe.
//!
//! A satellite is a camera-facing square that tilts with the orbit so it
//! reads as circling the globe, plus a wave animation whose phase the frame
//! loop advances.

use std::f64::consts::FRAC_PI_2;

use glam::{DMat3, DQuat, DVec2, DVec3};
use hexglobe_math::{Rgb, map_point};
use hexglobe_render::{NodeId, NodeKind, Scene, SceneNode, TextureHandle};

/// Side length of the satellite glyph in scene units.
pub const SATELLITE_SIZE: f64 = 32.0;

/// Overrides for a single satellite.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SatelliteOptions {
    /// Core color; the configured satellite color when unset.
    pub core_color: Option<Rgb>,
}

/// One entry of a constellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteSpec {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
}

/// Lookup key of the satellite at `lat`/`lon`.
pub fn satellite_key(lat: f64, lon: f64) -> String {
    format!("{lat}_{lon}")
}

/// How far a satellite at `lat` leans with the orbit, in radians.
pub fn tilt_multiplier(lat: f64) -> f64 {
    FRAC_PI_2 * (1.0 - lat.abs() / 90.0)
}

/// Lean direction: northern satellites lean one way, the rest the other.
pub fn tilt_direction(lat: f64) -> f64 {
    if lat > 0.0 { -1.0 } else { 1.0 }
}

/// Rotation that points local +Z from `position` at `target`, keeping +Y up
/// where possible.
fn look_at_rotation(position: DVec3, target: DVec3) -> DQuat {
    let z = (target - position).normalize_or_zero();
    if z == DVec3::ZERO {
        return DQuat::IDENTITY;
    }
    let up = if z.cross(DVec3::Y).length_squared() < 1e-12 {
        DVec3::Z
    } else {
        DVec3::Y
    };
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    DQuat::from_mat3(&DMat3::from_cols(x, y, z))
}

/// Orientation of a satellite at `position` for the current camera.
pub fn satellite_orientation(
    position: DVec3,
    camera: DVec3,
    camera_angle: f64,
    lon: f64,
    multiplier: f64,
    direction: f64,
) -> DQuat {
    let lean = -(camera_angle + lon.to_radians()).sin() * multiplier * direction;
    look_at_rotation(position, camera)
        * DQuat::from_rotation_z(direction * FRAC_PI_2)
        * DQuat::from_rotation_z(lean)
}

#[derive(Debug)]
pub struct Satellite {
    key: String,
    lat: f64,
    lon: f64,
    altitude: f64,
    position: DVec3,
    node: NodeId,
    texture: TextureHandle,
    tilt_multiplier: f64,
    tilt_direction: f64,
    wave_period_ms: f64,
    wave_phase_ms: f64,
}

impl Satellite {
    pub(crate) fn spawn(
        spec: SatelliteSpec,
        texture: TextureHandle,
        wave_period_ms: f64,
        scene: &mut Scene,
    ) -> Self {
        let SatelliteSpec { lat, lon, altitude } = spec;
        let position = map_point(lat, lon) * altitude;
        let node = scene.add(
            SceneNode::new(NodeKind::Plane {
                texture,
                size: DVec2::splat(SATELLITE_SIZE),
            })
            .at(position),
        );
        Self {
            key: satellite_key(lat, lon),
            lat,
            lon,
            altitude,
            position,
            node,
            texture,
            tilt_multiplier: tilt_multiplier(lat),
            tilt_direction: tilt_direction(lat),
            wave_period_ms,
            wave_phase_ms: 0.0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Wave animation progress in `[0, 1)`.
    pub fn wave_progress(&self) -> f64 {
        if self.wave_period_ms <= 0.0 {
            return 0.0;
        }
        self.wave_phase_ms / self.wave_period_ms
    }

    /// Advance the wave and face the camera.
    pub(crate) fn tick(&mut self, camera: DVec3, camera_angle: f64, dt_ms: f64, scene: &mut Scene) {
        if self.wave_period_ms > 0.0 {
            self.wave_phase_ms = (self.wave_phase_ms + dt_ms.max(0.0)) % self.wave_period_ms;
        }
        if let Some(node) = scene.get_mut(self.node) {
            node.rotation = satellite_orientation(
                self.position,
                camera,
                camera_angle,
                self.lon,
                self.tilt_multiplier,
                self.tilt_direction,
            );
        }
    }

    pub(crate) fn detach(&self, scene: &mut Scene) {
        scene.remove(self.node);
    }
}
