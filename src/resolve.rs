//! Resolution pipeline: MIME tree in, displayable body out.
//!
//! ```text
//! Start → Selecting → Decoding → Repairing → Classifying → Formatting → Done
//!             │           │
//!             └───────────┴──→ UsedFallback
//! ```
//!
//! Every path ends in a [`ResolvedContent`]; nothing here returns an error
//! or panics on malformed input.

use tracing::{debug, trace};

use crate::decode::{base64url, mojibake};
use crate::model::content::{ContentKind, DecodedCandidate, ResolvedContent};
use crate::model::node::{MimeNode, MimeType};
use crate::render::{classify, format};
use crate::select::{Candidate, Selector, DEFAULT_MAX_DEPTH};

/// Tunables for [`Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Nesting depth at which the selector gives up.
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// One state of the pipeline, carrying the value produced so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage<'a> {
    Start,
    Selecting,
    Decoding(Candidate<'a>),
    Repairing(DecodedCandidate),
    Classifying {
        text: String,
        source_mime_type: MimeType,
    },
    Formatting {
        text: String,
        kind: ContentKind,
    },
    Done(ResolvedContent),
    UsedFallback(ResolvedContent),
}

impl Stage<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Selecting => "selecting",
            Self::Decoding(_) => "decoding",
            Self::Repairing(_) => "repairing",
            Self::Classifying { .. } => "classifying",
            Self::Formatting { .. } => "formatting",
            Self::Done(_) => "done",
            Self::UsedFallback(_) => "used_fallback",
        }
    }

    /// The result, if this is a terminal stage.
    pub fn into_resolved(self) -> Option<ResolvedContent> {
        match self {
            Self::Done(resolved) | Self::UsedFallback(resolved) => Some(resolved),
            _ => None,
        }
    }
}

/// Resolves message trees with a fixed set of options.
///
/// Stateless apart from its options; one instance can serve any number of
/// threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolver {
    selector: Selector,
}

impl Resolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            selector: Selector::new(options.max_depth),
        }
    }

    /// Resolve `root` into a displayable body.
    ///
    /// `snippet` is the mail API's short preview; it replaces the body when
    /// no part can be selected or decoded.
    pub fn resolve(&self, root: &MimeNode, snippet: Option<&str>) -> ResolvedContent {
        let mut stage = Stage::Start;
        loop {
            trace!(stage = stage.name(), "Resolving");
            stage = match self.advance(stage, root, snippet) {
                Ok(next) => next,
                Err(terminal) => return terminal,
            };
        }
    }

    /// Run one transition. `Err` carries the final value once a terminal
    /// stage is reached.
    pub fn advance<'a>(
        &self,
        stage: Stage<'a>,
        root: &'a MimeNode,
        snippet: Option<&str>,
    ) -> Result<Stage<'a>, ResolvedContent> {
        let next = match stage {
            Stage::Start => Stage::Selecting,

            Stage::Selecting => match self.selector.select(root) {
                Ok(candidate) => Stage::Decoding(candidate),
                Err(miss) => {
                    debug!(reason = %miss, "No body part selected, using snippet");
                    Stage::UsedFallback(ResolvedContent::fallback(snippet.unwrap_or_default()))
                }
            },

            Stage::Decoding(candidate) => {
                let decoded = decode_candidate(&candidate);
                if decoded.decode_succeeded {
                    Stage::Repairing(decoded)
                } else {
                    Stage::UsedFallback(ResolvedContent::fallback(
                        snippet.map_or(decoded.text, str::to_string),
                    ))
                }
            }

            Stage::Repairing(decoded) => Stage::Classifying {
                text: mojibake::repair(&decoded.text),
                source_mime_type: decoded.source_mime_type,
            },

            Stage::Classifying {
                text,
                source_mime_type,
            } => {
                let kind = classify::classify(&text, &source_mime_type);
                Stage::Formatting { text, kind }
            }

            Stage::Formatting { text, kind } => Stage::Done(ResolvedContent {
                body: format::format(&text, kind),
                content_kind: kind,
                used_fallback: false,
            }),

            Stage::Done(resolved) | Stage::UsedFallback(resolved) => return Err(resolved),
        };
        Ok(next)
    }
}

/// Resolve with default options.
pub fn resolve(root: &MimeNode, snippet: Option<&str>) -> ResolvedContent {
    Resolver::default().resolve(root, snippet)
}

fn decode_candidate(candidate: &Candidate<'_>) -> DecodedCandidate {
    match base64url::decode(candidate.raw_body) {
        Ok(text) => DecodedCandidate {
            source_mime_type: candidate.mime_type.clone(),
            text,
            decode_succeeded: true,
        },
        Err(e) => {
            debug!(
                mime = %candidate.mime_type,
                error = %e,
                "Body did not decode, falling back"
            );
            DecodedCandidate {
                source_mime_type: candidate.mime_type.clone(),
                text: candidate.raw_body.to_string(),
                decode_succeeded: false,
            }
        }
    }
}
