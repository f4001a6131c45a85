//! Shader materials and their shared uniform block.

use bytemuck::{Pod, Zeroable};
use hexglobe_math::Rgb;

/// Linear fog between `near` and `far` camera distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Rgb,
    pub near: f64,
    pub far: f64,
}

impl Fog {
    /// Fog factor in `[0, 1]` at `depth`.
    pub fn factor(&self, depth: f64) -> f64 {
        if self.far <= self.near {
            return if depth >= self.far { 1.0 } else { 0.0 };
        }
        ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// Uniform block shared by the globe's custom shaders.
///
/// Laid out for WGSL uniform address space: every `vec3` is followed by a
/// scalar so the struct has no implicit padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub fog_color: [f32; 3],
    pub current_time: f32,
    pub color: [f32; 3],
    pub fog_near: f32,
    pub fog_far: f32,
    pub intro_duration: f32,
    pub intro_altitude: f32,
    pub opacity: f32,
}

impl Default for MaterialUniforms {
    fn default() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            fog_color: [0.0; 3],
            current_time: 0.0,
            color: [1.0; 3],
            fog_near: 1.0,
            fog_far: 2000.0,
            intro_duration: 0.0,
            intro_altitude: 1.0,
            opacity: 1.0,
        }
    }
}

const _: () = assert!(std::mem::size_of::<MaterialUniforms>() == 112);
const _: () = assert!(std::mem::size_of::<MaterialUniforms>() % 16 == 0);

/// Bind group entry for [`MaterialUniforms`] at binding 0.
pub fn material_uniform_layout_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: std::num::NonZeroU64::new(std::mem::size_of::<MaterialUniforms>() as u64),
        },
        count: None,
    }
}

/// How a material's fragments combine with the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

impl Blending {
    pub fn blend_state(&self) -> wgpu::BlendState {
        match self {
            Blending::Normal => wgpu::BlendState::ALPHA_BLENDING,
            Blending::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            },
        }
    }
}

/// WGSL shader source plus the uniform values it is drawn with.
#[derive(Debug, Clone)]
pub struct ShaderMaterial {
    pub label: &'static str,
    pub source: &'static str,
    pub uniforms: MaterialUniforms,
    pub transparent: bool,
    pub depth_write: bool,
    pub blending: Blending,
}

impl ShaderMaterial {
    pub fn new(label: &'static str, source: &'static str) -> Self {
        Self {
            label,
            source,
            uniforms: MaterialUniforms::default(),
            transparent: false,
            depth_write: true,
            blending: Blending::Normal,
        }
    }

    pub fn set_current_time(&mut self, ms: f64) {
        self.uniforms.current_time = ms as f32;
    }

    pub fn current_time(&self) -> f64 {
        self.uniforms.current_time as f64
    }

    pub fn set_fog(&mut self, fog: &Fog) {
        self.uniforms.fog_color = fog.color.to_array();
        self.uniforms.fog_near = fog.near as f32;
        self.uniforms.fog_far = fog.far as f32;
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.uniforms.color = color.to_array();
    }

    pub fn color(&self) -> Rgb {
        let [r, g, b] = self.uniforms.color;
        Rgb::new(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fog_factor_is_linear_and_clamped() {
        let fog = Fog {
            color: Rgb::BLACK,
            near: 100.0,
            far: 200.0,
        };
        assert_eq!(fog.factor(50.0), 0.0);
        assert_eq!(fog.factor(150.0), 0.5);
        assert_eq!(fog.factor(500.0), 1.0);
    }

    #[test]
    fn test_material_setters_write_uniforms() {
        let mut m = ShaderMaterial::new("test", "");
        m.set_current_time(1234.0);
        m.set_color(Rgb::new(1.0, 0.5, 0.0));
        m.set_fog(&Fog {
            color: Rgb::WHITE,
            near: 10.0,
            far: 20.0,
        });
        assert_eq!(m.current_time(), 1234.0);
        assert_eq!(m.color(), Rgb::new(1.0, 0.5, 0.0));
        assert_eq!(m.uniforms.fog_color, [1.0; 3]);
        assert_eq!((m.uniforms.fog_near, m.uniforms.fog_far), (10.0, 20.0));
    }

    #[test]
    fn test_additive_blend_adds_destination() {
        let state = Blending::Additive.blend_state();
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(Blending::Normal.blend_state(), wgpu::BlendState::ALPHA_BLENDING);
    }
}
