//! Ember Core - asset import for the Ember path tracer.
//!
//! This crate provides:
//!
//! - **Meshes**: OBJ import into an indexed [`Mesh`]
//! - **Images**: decoded RGB8 buffers for image textures
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{load_obj, ImageData};
//!
//! let mesh = load_obj("meshes/bunny.obj")?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//!
//! let earth = ImageData::load("textures/earthmap.jpg")?;
//! println!("{}x{}", earth.width(), earth.height());
//! ```

pub mod mesh;
pub mod texture;

// Re-export commonly used types
pub use mesh::{load_obj, Mesh, MeshError};
pub use texture::{srgb_to_linear, ImageData, TextureError};
