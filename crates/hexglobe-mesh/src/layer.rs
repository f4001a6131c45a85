//! The tile mesh as a scene layer.

use hexglobe_math::{ColorScheme, Rgb};
use hexglobe_render::{Fog, NodeId, NodeKind, Scene, SceneNode, ShaderMaterial};
use rand::Rng;

use crate::{TILE_SHADER_SOURCE, Tile, TileMesh, build_tile_mesh};

/// Radial scale and opacity the tile shader applies to a vertex in band
/// `lng` at `current_time`.
pub fn intro_reveal(current_time: f64, lng: f64, intro_duration: f64, intro_altitude: f64) -> (f64, f64) {
    let t = current_time;
    let intro_start = intro_duration * ((180.0 + lng) / 360.0);
    let pop_end = intro_start + intro_duration / 8.0;

    let mut scale = 1.0;
    let mut opacity = 0.0;
    if t > intro_start {
        opacity = 1.0;
    }
    if t > intro_start && t < pop_end {
        scale = intro_altitude;
        opacity = 0.3;
    }
    if t > pop_end && t < pop_end + 200.0 {
        scale = 1.0 + (intro_altitude - 1.0) * (1.0 - (t - pop_end) / 200.0);
    }
    (scale, opacity)
}

/// Tile records, their built mesh and the material they are drawn with.
pub struct TileLayer {
    tiles: Vec<Tile>,
    mesh: TileMesh,
    material: ShaderMaterial,
    node: Option<NodeId>,
}

impl TileLayer {
    pub fn new(tiles: Vec<Tile>, intro_duration_ms: f64, intro_altitude: f64) -> Self {
        let mut material = ShaderMaterial::new("tiles", TILE_SHADER_SOURCE);
        material.transparent = true;
        material.uniforms.intro_duration = intro_duration_ms as f32;
        material.uniforms.intro_altitude = intro_altitude as f32;
        Self {
            tiles,
            mesh: TileMesh::default(),
            material,
            node: None,
        }
    }

    /// Build (or rebuild) the mesh and replace the layer's scene node.
    pub fn build<R: Rng + ?Sized>(&mut self, scene: &mut Scene, scheme: &dyn ColorScheme, anomaly_color: Rgb, rng: &mut R) {
        if let Some(old) = self.node.take() {
            scene.remove(old);
        }
        self.mesh = build_tile_mesh(&self.tiles, scheme, anomaly_color, rng);
        self.node = Some(scene.add(SceneNode::new(NodeKind::Custom {
            label: "tiles",
            vertex_count: self.mesh.vertices.len(),
        })));
    }

    pub fn set_current_time(&mut self, ms: f64) {
        self.material.set_current_time(ms);
    }

    pub fn set_fog(&mut self, fog: &Fog) {
        self.material.set_fog(fog);
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn mesh(&self) -> &TileMesh {
        &self.mesh
    }

    pub fn material(&self) -> &ShaderMaterial {
        &self.material
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexglobe_math::RgbBasis;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_reveal_sweeps_by_longitude() {
        // Band -180 starts at 0 ms, band 0 halfway through a 2000 ms intro.
        assert_eq!(intro_reveal(-1.0, -180.0, 2000.0, 1.1), (1.0, 0.0));
        assert_eq!(intro_reveal(10.0, -180.0, 2000.0, 1.1), (1.1, 0.3));
        assert_eq!(intro_reveal(10.0, 0.0, 2000.0, 1.1), (1.0, 0.0));
        assert_eq!(intro_reveal(1100.0, 0.0, 2000.0, 1.1), (1.1, 0.3));
    }

    #[test]
    fn test_reveal_settles_after_pop() {
        // Band -180: pop ends at 250 ms, settles by 450 ms.
        let (scale, opacity) = intro_reveal(350.0, -180.0, 2000.0, 1.1);
        assert!((scale - 1.05).abs() < 1e-9);
        assert_eq!(opacity, 1.0);
        assert_eq!(intro_reveal(1000.0, -180.0, 2000.0, 1.1), (1.0, 1.0));
    }

    #[test]
    fn test_rebuild_replaces_scene_node() {
        let mut scene = Scene::default();
        let tile = Tile {
            value: Some(0.5),
            anomaly: false,
            kind: 0,
            lng: 0,
            boundary: vec![[0.0; 3]; 6],
        };
        let mut layer = TileLayer::new(vec![tile], 2000.0, 1.1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let scheme = RgbBasis::brown_earth();

        layer.build(&mut scene, &scheme, Rgb::BLACK, &mut rng);
        let first = layer.node().unwrap();
        layer.build(&mut scene, &scheme, Rgb::WHITE, &mut rng);
        let second = layer.node().unwrap();

        assert_ne!(first, second);
        assert!(!scene.contains(first));
        assert_eq!(scene.len(), 1);
        assert_eq!(layer.mesh().triangle_count(), 4);
    }

    #[test]
    fn test_time_uniform_tracks_run_time() {
        let mut layer = TileLayer::new(Vec::new(), 2000.0, 1.1);
        layer.set_current_time(512.0);
        assert_eq!(layer.material().current_time(), 512.0);
        assert_eq!(layer.material().uniforms.intro_altitude, 1.1);
    }
}
