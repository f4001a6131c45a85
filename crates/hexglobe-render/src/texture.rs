//! Texture descriptors and the shared texture cache.
//!
//! Textures are described by the geometric parameters that would be used to
//! rasterize them; the renderer owns the actual pixels. Shared textures are
//! created once per [`TextureKind`] and looked up afterwards. Per-entity
//! textures such as labels bypass the cache.

use hexglobe_math::{LabelCanvas, Rgb};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Handle of a texture registered with a [`TextureCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Kinds of texture shared between every annotation that uses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    PinTop,
    Marker,
    Line,
    Satellite,
}

/// Rasterization parameters for a texture.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureParams {
    /// Filled disc drawn at the tip of a pin stalk.
    PinTop { outer_radius: f64, color: Rgb },
    /// Ring with a filled centre.
    Marker {
        stroke_width: f64,
        inner_radius: f64,
        outer_radius: f64,
        color: Rgb,
    },
    /// Soft horizontal stroke used to texture trails.
    Line { color: Rgb },
    /// Square satellite glyph.
    Satellite { color: Rgb },
    /// Text label on a power-of-two canvas.
    Label {
        text: String,
        font_family: String,
        canvas: LabelCanvas,
        color: Rgb,
        underline: Option<Rgb>,
        background: Option<Rgb>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub params: TextureParams,
}

impl TextureDescriptor {
    pub fn square(size: u32, params: TextureParams) -> Self {
        Self {
            width: size,
            height: size,
            params,
        }
    }

    pub fn label(
        text: impl Into<String>,
        font_family: impl Into<String>,
        canvas: LabelCanvas,
        color: Rgb,
    ) -> Self {
        Self {
            width: canvas.pow2_width,
            height: canvas.pow2_height,
            params: TextureParams::Label {
                text: text.into(),
                font_family: font_family.into(),
                canvas,
                color,
                underline: None,
                background: None,
            },
        }
    }
}

/// Owns every texture descriptor and caches the shared ones by kind.
#[derive(Debug, Default)]
pub struct TextureCache {
    shared: FxHashMap<TextureKind, TextureHandle>,
    textures: FxHashMap<TextureHandle, TextureDescriptor>,
    next: u32,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared texture of `kind`, created with `make` on first request.
    pub fn get_or_create(&mut self, kind: TextureKind, make: impl FnOnce() -> TextureDescriptor) -> TextureHandle {
        if let Some(handle) = self.shared.get(&kind) {
            return *handle;
        }
        let handle = self.insert(make());
        debug!(?kind, handle = handle.0, "Created shared texture");
        self.shared.insert(kind, handle);
        handle
    }

    pub fn shared(&self, kind: TextureKind) -> Option<TextureHandle> {
        self.shared.get(&kind).copied()
    }

    /// Register a texture that is not shared.
    pub fn insert(&mut self, descriptor: TextureDescriptor) -> TextureHandle {
        let handle = TextureHandle(self.next);
        self.next += 1;
        self.textures.insert(handle, descriptor);
        handle
    }

    /// Release a texture. Shared textures stay cached and are not released.
    pub fn release(&mut self, handle: TextureHandle) -> Option<TextureDescriptor> {
        if self.shared.values().any(|h| *h == handle) {
            return None;
        }
        self.textures.remove(&handle)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&TextureDescriptor> {
        self.textures.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn clear(&mut self) {
        self.shared.clear();
        self.textures.clear();
    }
}
