//! Caching of resolved message bodies.

pub mod cache;
