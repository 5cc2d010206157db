//! ASCII PLY point-cloud loader.
//!
//! This crate provides:
//!
//! - **Header parsing**: format, comments, elements and typed properties
//! - **Body decoding**: the `vertex` element decoded into flat `f32`
//!   attribute buffers (`position`, optional `normal`, and one 1-component
//!   buffer per extra property)
//!
//! Binary PLY bodies are not decoded; they produce an empty [`Geometry`]
//! and a logged warning.
//!
//! # Example
//!
//! ```ignore
//! use ply_loader::parse;
//!
//! let bytes = std::fs::read("point_cloud.ply")?;
//! let geometry = parse(&bytes)?;
//! println!("Loaded {} vertices", geometry.vertex_count());
//! ```

pub mod body;
pub mod error;
pub mod geometry;
pub mod header;
pub mod loader;

// Re-export commonly used types
pub use body::BlankLines;
pub use error::{PlyError, PlyResult};
pub use geometry::{Attribute, Bounds, Geometry};
pub use header::{parse_header, Element, Header, Property};
pub use loader::{parse, parse_str, parse_str_with_options, parse_with_options, LoadOptions};
