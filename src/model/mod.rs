//! Core data model types: the MIME tree and the resolved body.

pub mod content;
pub mod node;
