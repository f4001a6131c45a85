//! Tile mesh generation.
//!
//! Tiles are the pentagon and hexagon patches covering the globe. This crate
//! parses them from the compact array format, triangulates them into a flat
//! shaded vertex buffer split into 16-bit addressable draw ranges, and owns
//! the tile shader with its longitude-ordered intro reveal.

pub mod builder;
pub mod layer;
pub mod shader;
pub mod tile;

pub use builder::{CHUNK_SIZE, DrawRange, TileMesh, TileVertex, build_tile_mesh};
pub use layer::{TileLayer, intro_reveal};
pub use shader::{TILE_SHADER_SOURCE, TILE_VERTEX_ATTRIBUTES, TILE_VERTEX_LAYOUT};
pub use tile::{Tile, TileParseError, parse_tiles};
