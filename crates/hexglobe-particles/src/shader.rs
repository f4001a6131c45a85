//! Smoke shader source and vertex layout.
//!
//! | Location | Offset | Format  | Field        |
//! |----------|--------|---------|--------------|
//! | 0        | 0      | Float32 | start_time   |
//! | 1        | 4      | Float32 | lat          |
//! | 2        | 8      | Float32 | lon          |
//! | 3        | 12     | Float32 | altitude     |
//! | 4        | 16     | Float32 | active       |

use std::mem;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexStepMode};

use crate::SmokeSlot;

pub const SMOKE_SLOT_ATTRIBUTES: [VertexAttribute; 5] = wgpu::vertex_attr_array![
    0 => Float32,
    1 => Float32,
    2 => Float32,
    3 => Float32,
    4 => Float32
];

/// One vertex per slot, drawn as a point list.
pub const SMOKE_SLOT_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<SmokeSlot>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &SMOKE_SLOT_ATTRIBUTES,
};

const _: () = assert!(mem::size_of::<SmokeSlot>() == 20);
const _: () = assert!(SMOKE_SLOT_ATTRIBUTES[4].offset == 16);

/// Particle position and alpha are computed entirely from
/// `current_time - start_time`; extinguished or unstarted slots are moved
/// outside the clip volume.
pub const SMOKE_SHADER_SOURCE: &str = r#"
const PI: f32 = 3.141592653589793;
const RADIUS: f32 = 500.0;
const LIFETIME: f32 = 1500.0;

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

struct SlotInput {
    @location(0) start_time: f32,
    @location(1) lat: f32,
    @location(2) lon: f32,
    @location(3) altitude: f32,
    @location(4) active: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) depth: f32,
};

fn map_point(lat: f32, lon: f32, scale: f32) -> vec3<f32> {
    let phi = (90.0 - lat) * PI / 180.0;
    let theta = (180.0 - lon) * PI / 180.0;
    return vec3<f32>(
        scale * sin(phi) * cos(theta),
        scale * cos(phi),
        scale * sin(phi) * sin(theta),
    );
}

@vertex
fn vs_main(in: SlotInput) -> VertexOutput {
    var out: VertexOutput;
    var age = u.current_time - in.start_time;
    if (in.active <= 0.0 || age <= 0.0) {
        out.clip_position = vec4<f32>(2.0, 2.0, 2.0, 1.0);
        out.color = vec4<f32>(0.0);
        out.depth = 0.0;
        return out;
    }
    age = age % LIFETIME;
    let opacity = 1.0 - age / LIFETIME;
    let pos = map_point(in.lat, in.lon - age / 50.0, RADIUS * in.altitude);
    out.clip_position = u.view_proj * vec4<f32>(pos, 1.0);
    out.color = vec4<f32>(u.color, opacity);
    out.depth = out.clip_position.w;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let fog = clamp((in.depth - u.fog_near) / max(u.fog_far - u.fog_near, 0.0001), 0.0, 1.0);
    return vec4<f32>(mix(in.color.rgb, u.fog_color, fog), in.color.a);
}
"#;
