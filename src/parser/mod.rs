//! Message ingestion: mail API JSON into the resolver's MIME tree.

pub mod gmail;
