//! Deterministic prompt template parsing and rendering.
//!
//! A template is parsed once into an ordered `Section` list; rendering is a pure
//! function of (AST, gathered fragments, user input) and performs no I/O. Callers
//! (`ac-engine`) parse the template once at build time and reuse the same
//! `Template` for every turn.

pub mod render;
pub mod section;

pub use render::render;
pub use section::{parse, Section, Template};
