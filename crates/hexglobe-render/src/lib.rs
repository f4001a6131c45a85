//! Rendering boundary for the globe: a retained scene of drawable nodes, the
//! perspective camera, shader materials with their uniform block, the shared
//! texture cache and the [`FrameRenderer`] trait that turns a scene and camera
//! into a frame.

pub mod camera;
pub mod material;
pub mod renderer;
pub mod scene;
pub mod texture;

pub use camera::{CameraUniform, PerspectiveCamera};
pub use material::{Blending, Fog, MaterialUniforms, ShaderMaterial, material_uniform_layout_entry};
pub use renderer::{FrameRenderer, FrameStats, HeadlessRenderer};
pub use scene::{NodeId, NodeKind, Scene, SceneNode};
pub use texture::{TextureCache, TextureDescriptor, TextureHandle, TextureKind, TextureParams};
