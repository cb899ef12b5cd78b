//! Spec layer: document kinds + fixed per-kind schemas.
//!
//! This module is intentionally separate from collection and rendering.
//! It owns:
//! - DocKind (closed set of document kinds) and the path classifier
//! - the schema rules applied to each kind

pub mod kind;
pub mod rules;

pub use kind::{DocKind, classify};
pub use rules::{ValidationError, check};
