//! Decorative lines that sweep around the globe while it first draws in.

use glam::DQuat;
use hexglobe_config::ViewConfig;
use hexglobe_math::map_point;
use hexglobe_render::{NodeId, NodeKind, Scene, SceneNode};
use rand::Rng;
use tracing::debug;

/// Opacity lines are created with, before the first tick.
const INITIAL_OPACITY: f64 = 0.5;

/// Opacity at `total_ms` into an intro lasting `duration_ms`: a quick fade
/// in, a hold, and a fade out over the last fifth.
pub fn intro_opacity(total_ms: f64, duration_ms: f64) -> f64 {
    let r = total_ms / duration_ms;
    if r < 0.1 {
        (r * 10.0 - 0.2).max(0.0)
    } else if r > 0.8 {
        (1.0 - r).max(0.0) * 5.0
    } else {
        1.0
    }
}

#[derive(Debug)]
pub struct IntroLines {
    lines: Vec<NodeId>,
    rotation: f64,
}

impl IntroLines {
    /// Scatter `view.intro_line_count` short lines just above the surface.
    pub fn spawn<R: Rng + ?Sized>(scene: &mut Scene, view: &ViewConfig, rng: &mut R) -> Self {
        let lines = (0..view.intro_line_count)
            .map(|_| {
                let lat = rng.random::<f64>() * 180.0 + 90.0;
                let mut lon = rng.random::<f64>() * 5.0;
                let mut len = 4 + (rng.random::<f64>() * 5.0).floor() as usize;
                if rng.random::<f64>() < 0.3 {
                    lon = rng.random::<f64>() * 30.0 - 50.0;
                    len = 3 + (rng.random::<f64>() * 3.0).floor() as usize;
                }
                let vertices = (0..len)
                    .map(|j| map_point(lat, lon - j as f64 * 5.0) * view.intro_line_altitude)
                    .collect();
                scene.add(
                    SceneNode::new(NodeKind::Line {
                        vertices,
                        widths: Vec::new(),
                        color: view.intro_line_color,
                    })
                    .with_opacity(INITIAL_OPACITY),
                )
            })
            .collect();
        Self {
            lines,
            rotation: 0.0,
        }
    }

    pub fn lines(&self) -> &[NodeId] {
        &self.lines
    }

    /// Accumulated rotation about the globe axis, in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Fade and spin the lines. Once the intro is over the lines are removed
    /// and `false` is returned.
    pub fn tick(&mut self, total_ms: f64, dt_ms: f64, duration_ms: f64, scene: &mut Scene) -> bool {
        if duration_ms <= total_ms {
            self.remove(scene);
            debug!("Intro lines finished");
            return false;
        }
        let opacity = intro_opacity(total_ms, duration_ms);
        self.rotation += std::f64::consts::TAU * dt_ms / duration_ms;
        let rotation = DQuat::from_rotation_y(self.rotation);
        for id in &self.lines {
            if let Some(node) = scene.get_mut(*id) {
                node.opacity = opacity;
                node.rotation = rotation;
            }
        }
        true
    }

    pub fn remove(&self, scene: &mut Scene) {
        for id in &self.lines {
            scene.remove(*id);
        }
    }
}
