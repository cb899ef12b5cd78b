//! Rendering layer: fixed-style YAML emission.

pub mod yaml;

pub use yaml::{RenderOptions, render};
