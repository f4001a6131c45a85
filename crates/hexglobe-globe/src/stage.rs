//! Everything that exists only once the globe is running.

use glam::DVec3;
use hexglobe_animation::TweenEngine;
use hexglobe_particles::SmokeProvider;
use hexglobe_render::{Fog, PerspectiveCamera, Scene, TextureCache};

use crate::{IntroLines, MarkerId, PinId};

/// What a running tween drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tweened {
    /// Stalk tip rising from the surface, values `[x, y, z]`.
    PinRise(PinId),
    /// Label and top opacity, values `[opacity]`.
    PinFade(PinId),
    /// Altitude change, values `[altitude]`.
    PinAltitude(PinId),
    /// Icon grow-in, values `[size]`.
    MarkerIcon(MarkerId),
    /// Label fade-in, values `[opacity]`.
    MarkerLabel(MarkerId),
}

/// Scene, camera and the shared services annotations draw into.
pub struct Stage {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub fog: Fog,
    pub smoke: SmokeProvider,
    pub textures: TextureCache,
    pub tweens: TweenEngine<Tweened>,
    pub intro: Option<IntroLines>,
}

impl Stage {
    /// Place the camera on its orbit and aim it at the globe centre.
    pub fn orbit_camera(&mut self, distance: f64, angle: f64, view_angle: f64) {
        self.camera.position = DVec3::new(
            distance * angle.cos() * view_angle.cos(),
            view_angle.sin() * distance,
            distance * angle.sin() * view_angle.cos(),
        );
        self.camera.look_at(DVec3::ZERO);
    }

    /// Move fog and the far plane to follow the camera distance.
    pub fn follow_distance(&mut self, distance: f64, depth: f64) {
        self.fog.near = distance;
        self.fog.far = distance + depth;
        self.camera.far = distance + depth;
        self.smoke.set_fog(&self.fog);
    }
}
