//! Retained scene of drawable nodes.

use std::collections::BTreeMap;

use glam::{DQuat, DVec2, DVec3};
use hexglobe_math::Rgb;
use tracing::trace;

use crate::texture::TextureHandle;

/// Stable handle of a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Camera-facing textured quad.
    Sprite { texture: TextureHandle },
    /// Connected polyline with an optional per-vertex width profile.
    Line { vertices: Vec<DVec3>, widths: Vec<f32>, color: Rgb },
    /// Disjoint segments, drawn pairwise.
    LineSegments { vertices: Vec<DVec3>, color: Rgb },
    /// Textured plane mesh such as a satellite.
    Plane { texture: TextureHandle, size: DVec2 },
    /// Custom-shaded geometry owned elsewhere (tile mesh, particles).
    Custom { label: &'static str, vertex_count: usize },
}

/// A drawable node and its transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub kind: NodeKind,
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
    pub opacity: f64,
    pub visible: bool,
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn at(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    /// Mutable access to line vertices, if this node is a line of either kind.
    pub fn line_vertices_mut(&mut self) -> Option<&mut Vec<DVec3>> {
        match &mut self.kind {
            NodeKind::Line { vertices, .. } | NodeKind::LineSegments { vertices, .. } => Some(vertices),
            _ => None,
        }
    }

    pub fn line_vertices(&self) -> Option<&[DVec3]> {
        match &self.kind {
            NodeKind::Line { vertices, .. } | NodeKind::LineSegments { vertices, .. } => Some(vertices),
            _ => None,
        }
    }
}

/// Ordered collection of scene nodes plus the clear color.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    pub background: Rgb,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Rgb::BLACK)
    }
}

impl Scene {
    pub fn new(background: Rgb) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            background,
        }
    }

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        self.nodes.remove(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Detach every node.
    pub fn clear(&mut self) {
        trace!(nodes = self.nodes.len(), "Clearing scene");
        self.nodes.clear();
    }

    /// Nodes that would be drawn this frame.
    pub fn visible_count(&self) -> usize {
        self.nodes.values().filter(|n| n.visible && n.opacity > 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> SceneNode {
        SceneNode::new(NodeKind::LineSegments {
            vertices: vec![DVec3::ZERO, DVec3::X],
            color: Rgb::WHITE,
        })
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut scene = Scene::default();
        let a = scene.add(line());
        scene.remove(a);
        let b = scene.add(line());
        assert_ne!(a, b);
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
    }

    #[test]
    fn test_visible_count_skips_hidden_and_transparent() {
        let mut scene = Scene::default();
        scene.add(line());
        scene.add(line().with_opacity(0.0));
        let hidden = scene.add(line());
        scene.get_mut(hidden).unwrap().visible = false;
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.visible_count(), 1);
    }

    #[test]
    fn test_line_vertices_are_editable() {
        let mut scene = Scene::default();
        let id = scene.add(line());
        scene.get_mut(id).unwrap().line_vertices_mut().unwrap()[1] = DVec3::Y;
        assert_eq!(scene.get(id).unwrap().line_vertices().unwrap()[1], DVec3::Y);
    }

    #[test]
    fn test_clear_detaches_everything() {
        let mut scene = Scene::default();
        for _ in 0..4 {
            scene.add(line());
        }
        scene.clear();
        assert!(scene.is_empty());
    }
}
