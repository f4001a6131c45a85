//! Frame renderer boundary.

use glam::DMat4;
use tracing::trace;

use crate::{PerspectiveCamera, Scene};

/// Draws a scene from a camera.
pub trait FrameRenderer {
    /// Resize the drawing surface in CSS pixels at the given device pixel ratio.
    fn set_size(&mut self, width: u32, height: u32, pixel_ratio: f64);

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera);
}

/// Summary of the last rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub nodes: usize,
    pub visible_nodes: usize,
    pub view_proj: DMat4,
}

/// Renderer without a GPU surface. Records what it would have drawn.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
    pub stats: FrameStats,
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
            stats: FrameStats::default(),
        }
    }

    /// Backing buffer size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width as f64 * self.pixel_ratio).round() as u32,
            (self.height as f64 * self.pixel_ratio).round() as u32,
        )
    }
}

impl FrameRenderer for HeadlessRenderer {
    fn set_size(&mut self, width: u32, height: u32, pixel_ratio: f64) {
        self.width = width;
        self.height = height;
        self.pixel_ratio = pixel_ratio;
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        self.stats = FrameStats {
            frames: self.stats.frames + 1,
            nodes: scene.len(),
            visible_nodes: scene.visible_count(),
            view_proj: camera.view_projection_matrix(),
        };
        trace!(frame = self.stats.frames, nodes = self.stats.nodes, "Rendered frame");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeKind, SceneNode};

    #[test]
    fn test_headless_counts_frames_and_nodes() {
        let mut renderer = HeadlessRenderer::new(640, 480);
        let mut scene = Scene::default();
        scene.add(SceneNode::new(NodeKind::Custom {
            label: "tiles",
            vertex_count: 3,
        }));
        let camera = PerspectiveCamera::default();
        renderer.render(&scene, &camera);
        renderer.render(&scene, &camera);
        assert_eq!(renderer.stats.frames, 2);
        assert_eq!(renderer.stats.nodes, 1);
    }

    #[test]
    fn test_physical_size_applies_pixel_ratio() {
        let mut renderer = HeadlessRenderer::new(100, 50);
        renderer.set_size(200, 100, 2.0);
        assert_eq!(renderer.physical_size(), (400, 200));
    }
}
