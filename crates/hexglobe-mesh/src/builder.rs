//! Tile triangulation into a flat-shaded vertex buffer.

use bytemuck::{Pod, Zeroable};
use hexglobe_math::{ColorScheme, Rgb};
use rand::Rng;
use tracing::{debug, warn};

use crate::Tile;

/// Largest triangle count per draw range whose vertices fit 16-bit indices:
/// `floor(2^16 / 3)`.
pub const CHUNK_SIZE: usize = 21_845;

/// Fan triangles over boundary indices. The last one closes hexagons only.
const FAN: [[usize; 3]; 4] = [[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 5, 4]];

/// One tile mesh vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TileVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    /// The owning tile's longitude band, for the intro reveal.
    pub lng: f32,
}

/// A contiguous run of vertices drawn in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    /// First vertex.
    pub start: u32,
    /// Vertex count, always a multiple of 3.
    pub count: u32,
}

/// Triangulated tiles, three unshared vertices per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileMesh {
    pub vertices: Vec<TileVertex>,
    pub groups: Vec<DrawRange>,
}

impl TileMesh {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Triangulate `tiles` and color each one.
///
/// Anomalous tiles take `anomaly_color`; the rest map their value through
/// `scheme`, with a random value standing in for missing data. Tiles with
/// fewer than five boundary vertices only get the fan triangles their
/// vertices support.
pub fn build_tile_mesh<R: Rng + ?Sized>(
    tiles: &[Tile],
    scheme: &dyn ColorScheme,
    anomaly_color: Rgb,
    rng: &mut R,
) -> TileMesh {
    let mut vertices = Vec::with_capacity(tiles.len() * 4 * 3);
    let mut degraded = 0usize;

    for tile in tiles {
        let color = if tile.anomaly {
            anomaly_color
        } else {
            let v = match tile.value {
                Some(v) => v,
                None => rng.random::<f64>(),
            };
            scheme.sample(v)
        };
        let color = color.to_array();
        let lng = tile.lng as f32;

        let n = tile.boundary.len();
        if n < 5 {
            degraded += 1;
        }
        let fan = if n > 5 { &FAN[..] } else { &FAN[..3] };
        for tri in fan {
            if tri.iter().any(|&i| i >= n) {
                continue;
            }
            for &i in tri {
                vertices.push(TileVertex {
                    position: tile.boundary[i],
                    color,
                    lng,
                });
            }
        }
    }

    if degraded > 0 {
        warn!(degraded, "Tiles with fewer than 5 boundary vertices left partially open");
    }

    let triangles = vertices.len() / 3;
    let groups = (0..triangles.div_ceil(CHUNK_SIZE))
        .map(|i| DrawRange {
            start: (i * CHUNK_SIZE * 3) as u32,
            count: ((triangles - i * CHUNK_SIZE).min(CHUNK_SIZE) * 3) as u32,
        })
        .collect::<Vec<_>>();

    debug!(tiles = tiles.len(), triangles, groups = groups.len(), "Built tile mesh");
    TileMesh { vertices, groups }
}
