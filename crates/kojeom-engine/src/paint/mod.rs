//! Color primitives shared by clears, vertices and procedural textures.

mod color;

pub use color::Color;
