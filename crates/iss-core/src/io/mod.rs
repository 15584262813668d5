pub mod image_io;
pub mod manifest;

pub use image_io::{load_plane, save_plane};
pub use manifest::{load_stack, StackManifest, TileEntry};
