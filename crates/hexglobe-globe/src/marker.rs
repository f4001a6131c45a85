//! Chained markers.
//!
//! Markers live in an arena on the globe and refer to each other by id: a
//! marker knows the one it was chained onto and the ones chained onto it.
//! The trail between two markers belongs to the globe, not to either end.

use glam::DVec3;
use hexglobe_animation::{Easing, TweenSpec};
use hexglobe_config::GlobeConfig;
use hexglobe_math::{LabelLayout, TextMeasure, map_point};
use hexglobe_render::{
    NodeId, NodeKind, Scene, SceneNode, TextureDescriptor, TextureHandle, TextureKind,
    TextureParams,
};
use tracing::trace;

use crate::stage::{Stage, Tweened};

/// Altitude markers sit at.
pub const MARKER_ALTITUDE: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Where a marker goes and what its label says.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
}

impl MarkerSpec {
    pub fn new(lat: f64, lon: f64, label: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            label: label.into(),
        }
    }
}

/// What a new marker chains onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connection {
    /// A standalone trail head.
    #[default]
    None,
    /// The most recently added marker, if any.
    Last,
    To(MarkerId),
}

/// Scene scale divisor for marker sprites: `max(scale, 1)^2.5`.
pub fn attenuate_scale(scale: f64) -> f64 {
    scale.max(1.0).powf(2.5)
}

#[derive(Debug)]
pub struct Marker {
    id: MarkerId,
    lat: f64,
    lon: f64,
    text: String,
    altitude: f64,
    previous: Option<MarkerId>,
    next: Vec<MarkerId>,
    icon: NodeId,
    label: NodeId,
    label_texture: TextureHandle,
    label_scale: (f64, f64),
    icon_size: f64,
    growing: bool,
}

impl Marker {
    /// Create the icon and label. The icon grows in once the incoming trail,
    /// if any, has been drawn.
    pub(crate) fn spawn(
        id: MarkerId,
        spec: MarkerSpec,
        previous: Option<MarkerId>,
        scale: f64,
        stage: &mut Stage,
        config: &GlobeConfig,
        measure: &dyn TextMeasure,
    ) -> Self {
        let point = map_point(spec.lat, spec.lon);
        let altitude = MARKER_ALTITUDE;
        let markers = &config.markers;
        let labels = &config.labels;

        let texture = stage.textures.get_or_create(TextureKind::Marker, || {
            TextureDescriptor::square(
                markers.canvas,
                TextureParams::Marker {
                    stroke_width: markers.stroke_width,
                    inner_radius: markers.inner_radius,
                    outer_radius: markers.outer_radius,
                    color: markers.color,
                },
            )
        });
        let icon = stage.scene.add(
            SceneNode::new(NodeKind::Sprite { texture })
                .at(point * altitude)
                .with_scale(DVec3::new(0.0, 0.0, 1.0))
                .with_opacity(markers.opacity),
        );
        let delay = if previous.is_some() { config.lines.draw_ms } else { 0.0 };
        stage.tweens.add(
            Tweened::MarkerIcon(id),
            TweenSpec::new([0.0], [markers.canvas as f64], markers.scale_ms)
                .with_easing(Easing::ElasticOut)
                .with_delay(delay),
        );

        let text = spec.label.to_uppercase();
        let layout = LabelLayout {
            font_size: labels.size,
            padding_x: labels.padding_x,
            padding_y: labels.padding_y,
            underline_width: Some(labels.underline_width),
        };
        let canvas = layout.canvas_for(&text, &labels.font_family, measure);
        let mut descriptor =
            TextureDescriptor::label(text.as_str(), labels.font_family.as_str(), canvas, labels.color);
        if let TextureParams::Label { underline, .. } = &mut descriptor.params {
            *underline = Some(labels.underline_color);
        }
        let label_texture = stage.textures.insert(descriptor);
        let label_scale = canvas.sprite_scale();
        let s = attenuate_scale(scale);
        let lift = if point.y < 0.0 { -15.0 } else { 30.0 };
        let label = stage.scene.add(
            SceneNode::new(NodeKind::Sprite {
                texture: label_texture,
            })
            .at(DVec3::new(
                point.x * altitude * 1.1,
                point.y * altitude * 1.05 + lift,
                point.z * altitude * 1.1,
            ))
            .with_scale(DVec3::new(label_scale.0 / s, label_scale.1 / s, 1.0))
            .with_opacity(0.0),
        );
        stage.tweens.add(
            Tweened::MarkerLabel(id),
            TweenSpec::new([0.0], [1.0], labels.fade_ms),
        );

        trace!(id = id.0, lat = spec.lat, lon = spec.lon, ?previous, "Spawned marker");
        Self {
            id,
            lat: spec.lat,
            lon: spec.lon,
            text,
            altitude,
            previous,
            next: Vec::new(),
            icon,
            label,
            label_texture,
            label_scale,
            icon_size: markers.canvas as f64,
            growing: true,
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Label text, uppercased.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn previous(&self) -> Option<MarkerId> {
        self.previous
    }

    pub fn next(&self) -> &[MarkerId] {
        &self.next
    }

    pub fn icon_node(&self) -> NodeId {
        self.icon
    }

    pub fn label_node(&self) -> NodeId {
        self.label
    }

    pub(crate) fn link_next(&mut self, id: MarkerId) {
        self.next.push(id);
    }

    pub(crate) fn unlink(&mut self, id: MarkerId) {
        self.next.retain(|n| *n != id);
        if self.previous == Some(id) {
            self.previous = None;
        }
    }

    pub(crate) fn apply_icon(&mut self, size: f64, finished: bool, scale: f64, scene: &mut Scene) {
        let s = attenuate_scale(scale);
        if let Some(node) = scene.get_mut(self.icon) {
            node.scale = DVec3::new(size / s, size / s, 1.0);
        }
        if finished {
            self.growing = false;
        }
    }

    pub(crate) fn apply_label(&self, opacity: f64, scene: &mut Scene) {
        if let Some(node) = scene.get_mut(self.label) {
            node.opacity = opacity;
        }
    }

    /// Resize sprites for a new camera scale. A growing icon picks the new
    /// scale up from its tween.
    pub(crate) fn rescale(&self, scale: f64, scene: &mut Scene) {
        let s = attenuate_scale(scale);
        if !self.growing
            && let Some(node) = scene.get_mut(self.icon)
            && node.scale.x > 0.0
        {
            node.scale = DVec3::new(self.icon_size / s, self.icon_size / s, 1.0);
        }
        if let Some(node) = scene.get_mut(self.label) {
            node.scale = DVec3::new(self.label_scale.0 / s, self.label_scale.1 / s, 1.0);
        }
    }

    pub(crate) fn remove(&self, stage: &mut Stage) {
        stage.scene.remove(self.icon);
        stage.scene.remove(self.label);
        stage.textures.release(self.label_texture);
        let id = self.id;
        stage.tweens.cancel_where(|key| {
            matches!(key, Tweened::MarkerIcon(m) | Tweened::MarkerLabel(m) if *m == id)
        });
        trace!(id = id.0, "Removed marker");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation_never_enlarges() {
        assert_eq!(attenuate_scale(0.25), 1.0);
        assert_eq!(attenuate_scale(1.0), 1.0);
        assert!((attenuate_scale(2.0) - 2f64.powf(2.5)).abs() < 1e-12);
    }

    #[test]
    fn test_spec_keeps_label_text() {
        let spec = MarkerSpec::new(51.5, -0.1, "London");
        assert_eq!(spec.label, "London");
        assert_eq!(Connection::default(), Connection::None);
    }
}
