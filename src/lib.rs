//! `msgbody` — resolve mail API message trees into one displayable body.
//!
//! The core is [`resolve::resolve`]: given a [`model::node::MimeNode`] tree
//! (typically built from Gmail API JSON by [`parser::gmail`]) it selects the
//! best text part, repairs and decodes its base64url body, cleans up
//! mojibake and returns markup ready to render. It performs no I/O and
//! always returns a value.

pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod resolve;
pub mod select;
pub mod store;

pub use model::content::{ContentKind, ResolvedContent};
pub use model::node::{MimeNode, MimeType};
pub use resolve::{resolve, ResolveOptions, Resolver};
