//! Rendering: content classification, markup formatting and text previews.

pub mod classify;
pub mod format;
pub mod preview;
