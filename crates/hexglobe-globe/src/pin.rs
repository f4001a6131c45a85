//! Timed point annotations.
//!
//! A pin is a stalk rising from the surface, a disc on top, a text label and
//! optionally a column of smoke. Label, top and smoke can each be hidden and
//! shown again; the globe hides them on older pins when labels collide.

use glam::DVec3;
use hexglobe_animation::{Easing, TweenSpec};
use hexglobe_config::GlobeConfig;
use hexglobe_math::{LabelLayout, TextMeasure, lat_lon_2d, map_point};
use hexglobe_particles::SmokeHandle;
use hexglobe_render::{
    NodeId, NodeKind, Scene, SceneNode, TextureDescriptor, TextureHandle, TextureKind,
    TextureParams,
};
use hexglobe_spatial::Circle;
use tracing::trace;

use crate::stage::{Stage, Tweened};

/// Duration of an altitude change.
pub const ALTITUDE_CHANGE_MS: f64 = 1500.0;

/// Stable identifier of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u64);

/// Per-pin visibility overrides. Unset flags follow whether the pin has text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinOptions {
    pub show_label: Option<bool>,
    pub show_top: Option<bool>,
    pub show_smoke: Option<bool>,
}

/// Which sub-visuals of a pin are currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFlags {
    pub label: bool,
    pub top: bool,
    pub smoke: bool,
}

impl PinFlags {
    fn resolve(opts: &PinOptions, has_text: bool) -> Self {
        Self {
            label: opts.show_label.unwrap_or(has_text),
            top: opts.show_top.unwrap_or(has_text),
            smoke: opts.show_smoke.unwrap_or(has_text),
        }
    }
}

/// Operations on a single pin, applied through the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinAction {
    HideLabel,
    ShowLabel,
    HideTop,
    ShowTop,
    HideSmoke,
    ShowSmoke,
    ChangeAltitude(f64),
}

/// Where a pin goes and what it says.
#[derive(Debug, Clone, PartialEq)]
pub struct PinSpec {
    pub id: PinId,
    pub lat: f64,
    pub lon: f64,
    pub text: String,
    pub altitude: f64,
    pub created_ms: f64,
    pub options: PinOptions,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinNodes {
    line: NodeId,
    label: NodeId,
    top: NodeId,
}

#[derive(Debug)]
pub struct Pin {
    id: PinId,
    lat: f64,
    lon: f64,
    text: String,
    altitude: f64,
    created_ms: f64,
    flags: PinFlags,
    surface: DVec3,
    footprint: Circle,
    nodes: PinNodes,
    label_texture: TextureHandle,
    smoke: Option<SmokeHandle>,
}

/// Label sprite position for a surface point at `altitude`.
fn label_position(surface: DVec3, altitude: f64) -> DVec3 {
    let lift = if surface.y < 0.0 { -15.0 } else { 30.0 };
    DVec3::new(
        surface.x * altitude * 1.1,
        surface.y * altitude + lift,
        surface.z * altitude * 1.1,
    )
}

impl Pin {
    /// Create the pin's visuals and start its rise and fade-in.
    pub(crate) fn spawn(
        spec: PinSpec,
        stage: &mut Stage,
        config: &GlobeConfig,
        measure: &dyn TextMeasure,
    ) -> Self {
        let PinSpec {
            id,
            lat,
            lon,
            text,
            altitude,
            created_ms,
            options,
        } = spec;
        let has_text = !text.is_empty();
        let flags = PinFlags::resolve(&options, has_text);
        let surface = map_point(lat, lon);

        let pins = &config.pins;
        let line = stage.scene.add(SceneNode::new(NodeKind::Line {
            vertices: vec![surface, surface],
            widths: Vec::new(),
            color: pins.line_color,
        }));

        let layout = LabelLayout {
            font_size: pins.text_size,
            padding_x: config.labels.padding_x,
            padding_y: config.labels.padding_y,
            underline_width: None,
        };
        let canvas = layout.canvas_for(&text, &config.labels.font_family, measure);
        let label_texture = stage.textures.insert(TextureDescriptor::label(
            text.as_str(),
            config.labels.font_family.as_str(),
            canvas,
            config.labels.color,
        ));
        let (sx, sy) = canvas.sprite_scale();
        let label = stage.scene.add(
            SceneNode::new(NodeKind::Sprite {
                texture: label_texture,
            })
            .at(label_position(surface, altitude))
            .with_scale(DVec3::new(sx, sy, 1.0))
            .with_opacity(0.0),
        );

        let top_texture = stage.textures.get_or_create(TextureKind::PinTop, || {
            TextureDescriptor::square(
                pins.canvas,
                TextureParams::PinTop {
                    outer_radius: pins.outer_radius,
                    color: pins.color,
                },
            )
        });
        let size = pins.canvas as f64;
        let top = stage.scene.add(
            SceneNode::new(NodeKind::Sprite {
                texture: top_texture,
            })
            .at(surface * altitude)
            .with_scale(DVec3::new(size, size, 1.0))
            .with_opacity(0.0),
        );

        let smoke = flags.smoke.then(|| stage.smoke.set_fire(lat, lon, altitude));

        if flags.top || flags.label {
            stage.tweens.add(
                Tweened::PinFade(id),
                TweenSpec::new([0.0], [1.0], pins.fade_ms).with_delay(pins.draw_ms - pins.fade_ms),
            );
        }
        let tip = surface * altitude;
        stage.tweens.add(
            Tweened::PinRise(id),
            TweenSpec::new(surface.to_array(), tip.to_array(), pins.draw_ms)
                .with_easing(Easing::ElasticOut),
        );

        let pos = lat_lon_2d(lat, lon);
        let radius = if has_text { pos.radius } else { 1.0 };
        let footprint = Circle::new(pos.x.trunc(), pos.y.trunc(), radius);

        trace!(id = id.0, lat, lon, altitude, "Spawned pin");
        Self {
            id,
            lat,
            lon,
            text,
            altitude,
            created_ms,
            flags,
            surface,
            footprint,
            nodes: PinNodes { line, label, top },
            label_texture,
            smoke,
        }
    }

    pub fn id(&self) -> PinId {
        self.id
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    /// Committed altitude. Changes land when their tween completes.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn flags(&self) -> PinFlags {
        self.flags
    }

    pub fn smoke_handle(&self) -> Option<SmokeHandle> {
        self.smoke
    }

    /// Circle stored in the collision quadtree.
    pub fn footprint(&self) -> Circle {
        self.footprint
    }

    pub fn label_node(&self) -> NodeId {
        self.nodes.label
    }

    pub fn top_node(&self) -> NodeId {
        self.nodes.top
    }

    pub fn line_node(&self) -> NodeId {
        self.nodes.line
    }

    pub fn age(&self, now_ms: f64) -> f64 {
        now_ms - self.created_ms
    }

    pub(crate) fn apply(&mut self, action: PinAction, stage: &mut Stage) {
        match action {
            PinAction::HideLabel => self.hide_label(&mut stage.scene),
            PinAction::ShowLabel => self.show_label(&mut stage.scene),
            PinAction::HideTop => self.hide_top(&mut stage.scene),
            PinAction::ShowTop => self.show_top(&mut stage.scene),
            PinAction::HideSmoke => self.hide_smoke(stage),
            PinAction::ShowSmoke => self.show_smoke(stage),
            PinAction::ChangeAltitude(altitude) => self.change_altitude(altitude, stage),
        }
    }

    pub(crate) fn hide_label(&mut self, scene: &mut Scene) {
        if self.flags.label {
            set_opacity(scene, self.nodes.label, 0.0);
            self.flags.label = false;
        }
    }

    pub(crate) fn show_label(&mut self, scene: &mut Scene) {
        if !self.flags.label {
            set_opacity(scene, self.nodes.label, 1.0);
            self.flags.label = true;
        }
    }

    pub(crate) fn hide_top(&mut self, scene: &mut Scene) {
        if self.flags.top {
            set_opacity(scene, self.nodes.top, 0.0);
            self.flags.top = false;
        }
    }

    pub(crate) fn show_top(&mut self, scene: &mut Scene) {
        if !self.flags.top {
            set_opacity(scene, self.nodes.top, 1.0);
            self.flags.top = true;
        }
    }

    pub(crate) fn hide_smoke(&mut self, stage: &mut Stage) {
        if self.flags.smoke {
            if let Some(handle) = self.smoke {
                stage.smoke.extinguish(handle);
            }
            self.flags.smoke = false;
        }
    }

    pub(crate) fn show_smoke(&mut self, stage: &mut Stage) {
        if !self.flags.smoke {
            self.smoke = Some(stage.smoke.set_fire(self.lat, self.lon, self.altitude));
            self.flags.smoke = true;
        }
    }

    /// Tween every part of the pin to `altitude`. A change in flight, and
    /// the initial rise, are superseded.
    pub(crate) fn change_altitude(&mut self, altitude: f64, stage: &mut Stage) {
        let id = self.id;
        stage
            .tweens
            .cancel_where(|key| matches!(key, Tweened::PinAltitude(p) | Tweened::PinRise(p) if *p == id));
        stage.tweens.add(
            Tweened::PinAltitude(id),
            TweenSpec::new([self.altitude], [altitude], ALTITUDE_CHANGE_MS)
                .with_easing(Easing::ElasticOut),
        );
    }

    pub(crate) fn apply_rise(&self, tip: &[f64], scene: &mut Scene) {
        if let [x, y, z] = *tip {
            self.set_tip(scene, DVec3::new(x, y, z));
        }
    }

    pub(crate) fn apply_fade(&self, opacity: f64, scene: &mut Scene) {
        set_opacity(scene, self.nodes.top, if self.flags.top { opacity } else { 0.0 });
        set_opacity(scene, self.nodes.label, if self.flags.label { opacity } else { 0.0 });
    }

    pub(crate) fn apply_altitude(&mut self, altitude: f64, finished: bool, stage: &mut Stage) {
        if self.flags.smoke
            && let Some(handle) = self.smoke
        {
            stage.smoke.change_altitude(altitude, handle);
        }
        if self.flags.top
            && let Some(node) = stage.scene.get_mut(self.nodes.top)
        {
            node.position = self.surface * altitude;
        }
        if self.flags.label
            && let Some(node) = stage.scene.get_mut(self.nodes.label)
        {
            node.position = label_position(self.surface, altitude);
        }
        self.set_tip(&mut stage.scene, self.surface * altitude);
        if finished {
            self.altitude = altitude;
        }
    }

    fn set_tip(&self, scene: &mut Scene, tip: DVec3) {
        if let Some(vertices) = scene.get_mut(self.nodes.line).and_then(|n| n.line_vertices_mut())
            && let Some(v) = vertices.get_mut(1)
        {
            *v = tip;
        }
    }

    /// Detach every visual and stop the pin's smoke and tweens.
    pub(crate) fn remove(&self, stage: &mut Stage) {
        stage.scene.remove(self.nodes.label);
        stage.scene.remove(self.nodes.line);
        stage.scene.remove(self.nodes.top);
        stage.textures.release(self.label_texture);
        if self.flags.smoke
            && let Some(handle) = self.smoke
        {
            stage.smoke.extinguish(handle);
        }
        let id = self.id;
        stage.tweens.cancel_where(|key| {
            matches!(
                key,
                Tweened::PinRise(p) | Tweened::PinFade(p) | Tweened::PinAltitude(p) if *p == id
            )
        });
        trace!(id = id.0, "Removed pin");
    }
}

fn set_opacity(scene: &mut Scene, id: NodeId, opacity: f64) {
    if let Some(node) = scene.get_mut(id) {
        node.opacity = opacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_default_to_has_text() {
        let labelled = PinFlags::resolve(&PinOptions::default(), true);
        assert_eq!(
            labelled,
            PinFlags {
                label: true,
                top: true,
                smoke: true
            }
        );
        let bare = PinFlags::resolve(&PinOptions::default(), false);
        assert!(!bare.label && !bare.top && !bare.smoke);
    }

    #[test]
    fn test_explicit_flags_win() {
        let opts = PinOptions {
            show_smoke: Some(false),
            show_top: Some(true),
            ..Default::default()
        };
        let flags = PinFlags::resolve(&opts, false);
        assert!(!flags.smoke);
        assert!(flags.top);
        assert!(!flags.label);
    }

    #[test]
    fn test_label_sits_above_north_and_below_south() {
        let north = label_position(DVec3::new(100.0, 200.0, 0.0), 1.2);
        assert!(north.abs_diff_eq(DVec3::new(132.0, 270.0, 0.0), 1e-9));
        let south = label_position(DVec3::new(0.0, -200.0, 100.0), 1.0);
        assert_eq!(south.y, -215.0);
        assert!((south.z - 110.0).abs() < 1e-9);
    }
}
