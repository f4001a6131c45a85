//! Animated trails between chained markers.
//!
//! A trail is `segments + 1` waypoints from the previous marker to the next.
//! It is drawn one waypoint per `draw_ms / segments`: the vertex for the
//! newest waypoint moves to its final position and every vertex past it is
//! pulled along, so the line grows from the start. Removal runs the same
//! schedule the other way, collapsing vertices from the start onto the end.

use glam::DVec3;
use hexglobe_animation::StepTimer;
use hexglobe_config::LineConfig;
use hexglobe_math::{haversine_m, map_point};
use hexglobe_render::{NodeId, NodeKind, Scene, SceneNode, TextureDescriptor, TextureHandle, TextureKind, TextureParams};
use tracing::debug;

use crate::MarkerId;
use crate::stage::Stage;

/// Altitude trails are drawn at.
pub const TRAIL_ALTITUDE: f64 = 1.2;

/// Beyond this great-circle distance the latitude is bowed into an arc.
pub const ARC_THRESHOLD_M: f64 = 3_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
}

/// Waypoints from `from` to `to`, inclusive of both ends.
///
/// Latitude and longitude are interpolated linearly with wraparound. Long
/// trails get a cosine-weighted latitude so they read as an arc.
pub fn trail_waypoints(from: Waypoint, to: Waypoint, segments: usize) -> Vec<Waypoint> {
    let segments = segments.max(1);
    let seg = segments as f64;
    let lat_step = (to.lat - from.lat) / seg;
    let lon_step = (to.lon - from.lon) / seg;
    let arc = haversine_m(to.lat, to.lon, from.lat, from.lon) > ARC_THRESHOLD_M;

    (0..=segments)
        .map(|j| {
            let j = j as f64;
            let mut lat = ((90.0 + from.lat + j * lat_step) % 180.0) - 90.0;
            if arc {
                let bow = 0.5 + (j * (5.0 * std::f64::consts::PI / 2.0) / seg).cos() / 2.0;
                lat = lat * bow + (j * to.lat / seg / 2.0);
            }
            let lon = ((180.0 + from.lon + j * lon_step) % 360.0) - 180.0;
            Waypoint { lat, lon }
        })
        .collect()
}

/// The dotted twin: interior waypoints one degree further north.
pub fn dotted_waypoints(waypoints: &[Waypoint]) -> Vec<Waypoint> {
    let last = waypoints.len().saturating_sub(1);
    waypoints
        .iter()
        .enumerate()
        .map(|(i, w)| {
            if i == 0 || i == last {
                *w
            } else {
                Waypoint {
                    lat: w.lat + 1.0,
                    lon: w.lon,
                }
            }
        })
        .collect()
}

/// Line width profile along a trail, thin at the ends.
pub fn trail_widths(vertex_count: usize) -> Vec<f32> {
    let last = vertex_count.saturating_sub(1).max(1) as f64;
    (0..vertex_count)
        .map(|i| {
            let p = i as f64 / last;
            (0.5 + 3.0 * (p * std::f64::consts::PI).sin()) as f32
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrailPhase {
    Revealing(StepTimer),
    Drawn,
    Retracting(StepTimer),
}

#[derive(Debug)]
pub struct Trail {
    from: MarkerId,
    to: MarkerId,
    waypoints: Vec<Waypoint>,
    dotted_waypoints: Vec<Waypoint>,
    vertices: Vec<DVec3>,
    dotted: Vec<DVec3>,
    dotted_altitude: f64,
    interval_ms: f64,
    line: NodeId,
    dotted_line: Option<NodeId>,
    texture: TextureHandle,
    phase: TrailPhase,
}

impl Trail {
    /// Attach a trail from `from` to `to` and reveal its first waypoint.
    pub(crate) fn spawn(
        (from, from_at): (MarkerId, Waypoint),
        (to, to_at): (MarkerId, Waypoint),
        lines: &LineConfig,
        stage: &mut Stage,
    ) -> Self {
        let waypoints = trail_waypoints(from_at, to_at, lines.segments);
        let dotted_waypoints = dotted_waypoints(&waypoints);
        let start = map_point(from_at.lat, from_at.lon) * TRAIL_ALTITUDE;
        let n = waypoints.len();

        let texture = stage.textures.get_or_create(TextureKind::Line, || {
            TextureDescriptor::square(lines.canvas, TextureParams::Line { color: lines.color })
        });
        let line = stage.scene.add(
            SceneNode::new(NodeKind::Line {
                vertices: vec![start; n],
                widths: trail_widths(n),
                color: lines.color,
            })
            .with_opacity(lines.opacity),
        );
        let dotted_line = (lines.dot_wiggle != 0.0).then(|| {
            stage.scene.add(
                SceneNode::new(NodeKind::LineSegments {
                    vertices: vec![start; n],
                    color: lines.color,
                })
                .with_opacity(lines.opacity),
            )
        });

        let interval_ms = lines.draw_ms / lines.segments.max(1) as f64;
        let mut trail = Self {
            from,
            to,
            waypoints,
            dotted_waypoints,
            vertices: vec![start; n],
            dotted: vec![start; n],
            dotted_altitude: TRAIL_ALTITUDE - lines.dot_wiggle,
            interval_ms,
            line,
            dotted_line,
            texture,
            phase: TrailPhase::Revealing(StepTimer::new(interval_ms, n - 1)),
        };
        trail.reveal(0);
        trail.sync(&mut stage.scene);
        trail
    }

    pub fn from(&self) -> MarkerId {
        self.from
    }

    pub fn to(&self) -> MarkerId {
        self.to
    }

    pub fn touches(&self, marker: MarkerId) -> bool {
        self.from == marker || self.to == marker
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn dotted_vertices(&self) -> &[DVec3] {
        &self.dotted
    }

    pub fn phase(&self) -> &TrailPhase {
        &self.phase
    }

    pub fn line_node(&self) -> NodeId {
        self.line
    }

    pub fn dotted_node(&self) -> Option<NodeId> {
        self.dotted_line
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn is_retracting(&self) -> bool {
        matches!(self.phase, TrailPhase::Retracting(_))
    }

    fn reveal(&mut self, step: usize) {
        let (Some(w), Some(d)) = (self.waypoints.get(step), self.dotted_waypoints.get(step)) else {
            return;
        };
        let p = map_point(w.lat, w.lon) * TRAIL_ALTITUDE;
        let q = map_point(d.lat, d.lon) * self.dotted_altitude;
        for v in &mut self.vertices[step..] {
            *v = p;
        }
        for v in &mut self.dotted[step..] {
            *v = q;
        }
    }

    fn collapse(&mut self, step: usize) {
        if let Some(&p) = self.vertices.get(step) {
            for v in &mut self.vertices[..step] {
                *v = p;
            }
        }
        if let Some(&q) = self.dotted.get(step) {
            for v in &mut self.dotted[..step] {
                *v = q;
            }
        }
    }

    /// Start taking the trail down, from wherever its reveal has got to.
    pub(crate) fn retract(&mut self) {
        if !self.is_retracting() {
            let target = self.vertices.len().saturating_sub(1);
            self.phase = TrailPhase::Retracting(StepTimer::new(self.interval_ms, target));
        }
    }

    /// Advance reveal or retraction. Returns true once a retraction has
    /// finished and the trail's nodes are gone.
    pub(crate) fn advance(&mut self, dt_ms: f64, scene: &mut Scene) -> bool {
        let mut changed = false;
        let mut finished = false;
        match &mut self.phase {
            TrailPhase::Revealing(timer) => {
                let steps = timer.advance(dt_ms);
                let done = timer.is_done();
                for step in steps {
                    self.reveal(step);
                    changed = true;
                }
                if done {
                    debug!(from = self.from.0, to = self.to.0, "Trail drawn");
                    self.phase = TrailPhase::Drawn;
                }
            }
            TrailPhase::Drawn => {}
            TrailPhase::Retracting(timer) => {
                let steps = timer.advance(dt_ms);
                finished = timer.is_done();
                for step in steps {
                    self.collapse(step);
                    changed = true;
                }
            }
        }
        if finished {
            self.detach(scene);
            debug!(from = self.from.0, to = self.to.0, "Trail retracted");
            return true;
        }
        if changed {
            self.sync(scene);
        }
        false
    }

    fn sync(&self, scene: &mut Scene) {
        if let Some(v) = scene.get_mut(self.line).and_then(|n| n.line_vertices_mut()) {
            v.clone_from(&self.vertices);
        }
        if let Some(id) = self.dotted_line
            && let Some(v) = scene.get_mut(id).and_then(|n| n.line_vertices_mut())
        {
            v.clone_from(&self.dotted);
        }
    }

    pub(crate) fn detach(&self, scene: &mut Scene) {
        scene.remove(self.line);
        if let Some(id) = self.dotted_line {
            scene.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Waypoint = Waypoint { lat: 0.0, lon: 0.0 };

    #[test]
    fn test_waypoints_span_both_ends() {
        let b = Waypoint { lat: 20.0, lon: 10.0 };
        let w = trail_waypoints(A, b, 8);
        assert_eq!(w.len(), 9);
        assert_eq!(w[0], A);
        assert!((w[8].lat - 20.0).abs() < 1e-9);
        assert!((w[8].lon - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_trail_is_linear() {
        let b = Waypoint { lat: 10.0, lon: 10.0 };
        let w = trail_waypoints(A, b, 4);
        assert!((w[2].lat - 5.0).abs() < 1e-9);
        assert!((w[2].lon - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_trail_bows_latitude() {
        let from = Waypoint { lat: 10.0, lon: -60.0 };
        let to = Waypoint { lat: 40.0, lon: 60.0 };
        let w = trail_waypoints(from, to, 10);
        let linear = ((90.0 + 10.0 + 5.0 * 3.0) % 180.0) - 90.0;
        let bow = 0.5 + (5.0 * (5.0 * std::f64::consts::PI / 2.0) / 10.0).cos() / 2.0;
        assert!((w[5].lat - (linear * bow + 5.0 * 40.0 / 10.0 / 2.0)).abs() < 1e-9);
        assert!((w[10].lat - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_wraps_across_antimeridian() {
        let from = Waypoint { lat: 0.0, lon: 170.0 };
        let to = Waypoint { lat: 0.0, lon: 190.0 };
        let w = trail_waypoints(from, to, 2);
        assert!((w[2].lon - -170.0).abs() < 1e-9);
    }

    #[test]
    fn test_dotted_lifts_interior_only() {
        let b = Waypoint { lat: 0.0, lon: 10.0 };
        let d = dotted_waypoints(&trail_waypoints(A, b, 4));
        assert_eq!(d[0].lat, 0.0);
        assert_eq!(d[4].lat, 0.0);
        assert!(d[1..4].iter().all(|w| (w.lat - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_width_profile_peaks_mid_trail() {
        let w = trail_widths(5);
        assert!((w[0] - 0.5).abs() < 1e-6);
        assert!((w[2] - 3.5).abs() < 1e-6);
        assert!((w[4] - 0.5).abs() < 1e-5);
    }
}
