//! Drawing support for the adapter's pixel buffer
//!
//! Colors and their packing into buffer encodings live in [`color`]; the
//! drawing capability the scene renders through lives in [`canvas`].

pub mod canvas;
pub mod color;

pub use canvas::Canvas;
pub use color::{ColorOps, Rgb};
