//! Tile shader and vertex layout.
//!
//! | Location | Offset | Format    | Field    |
//! |----------|--------|-----------|----------|
//! | 0        | 0      | Float32x3 | position |
//! | 1        | 12     | Float32x3 | color    |
//! | 2        | 24     | Float32   | lng      |

use std::mem;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::TileVertex;

pub const TILE_VERTEX_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32,
        offset: 24,
        shader_location: 2,
    },
];

pub const TILE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<TileVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &TILE_VERTEX_ATTRIBUTES,
};

const _: () = assert!(
    mem::size_of::<TileVertex>() == 28,
    "TileVertex size changed, update TILE_VERTEX_LAYOUT"
);
const _: () = assert!(TILE_VERTEX_ATTRIBUTES[2].offset + 4 <= mem::size_of::<TileVertex>() as u64);

/// Tiles stay hidden until `intro_start = intro_duration * (180 + lng) / 360`,
/// then pop up at the intro altitude at 0.3 opacity for an eighth of the
/// intro duration, then settle onto the surface over 200 ms.
pub const TILE_SHADER_SOURCE: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    fog_color: vec3<f32>,
    current_time: f32,
    color: vec3<f32>,
    fog_near: f32,
    fog_far: f32,
    intro_duration: f32,
    intro_altitude: f32,
    opacity: f32,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) lng: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) depth: f32,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let t = u.current_time;
    let intro_start = u.intro_duration * ((180.0 + in.lng) / 360.0);
    let pop_end = intro_start + u.intro_duration / 8.0;

    var pos = in.position;
    var alpha = 0.0;
    if (t > intro_start) {
        alpha = 1.0;
    }
    if (t > intro_start && t < pop_end) {
        pos = in.position * u.intro_altitude;
        alpha = 0.3;
    }
    if (t > pop_end && t < pop_end + 200.0) {
        let k = 1.0 - (t - pop_end) / 200.0;
        pos = in.position * (1.0 + (u.intro_altitude - 1.0) * k);
    }

    out.clip_position = u.view_proj * vec4<f32>(pos, 1.0);
    out.color = vec4<f32>(in.color, alpha);
    out.depth = out.clip_position.w;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let fog = clamp((in.depth - u.fog_near) / max(u.fog_far - u.fog_near, 0.0001), 0.0, 1.0);
    return vec4<f32>(mix(in.color.rgb, u.fog_color, fog), in.color.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_stride_matches_vertex_struct_size() {
        assert_eq!(TILE_VERTEX_LAYOUT.array_stride, mem::size_of::<TileVertex>() as u64);
    }

    #[test]
    fn test_attribute_offsets_match_struct_fields() {
        assert_eq!(TILE_VERTEX_ATTRIBUTES[0].offset, mem::offset_of!(TileVertex, position) as u64);
        assert_eq!(TILE_VERTEX_ATTRIBUTES[1].offset, mem::offset_of!(TileVertex, color) as u64);
        assert_eq!(TILE_VERTEX_ATTRIBUTES[2].offset, mem::offset_of!(TileVertex, lng) as u64);
    }

    #[test]
    fn test_shader_reads_intro_uniforms() {
        for needle in ["intro_duration", "intro_altitude", "@location(2) lng", "fn vs_main", "fn fs_main"] {
            assert!(TILE_SHADER_SOURCE.contains(needle), "missing {needle}");
        }
    }
}
