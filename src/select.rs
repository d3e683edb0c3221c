//! MIME tree selection: find the one part whose body should be displayed.
//!
//! Precedence, first match wins:
//!
//! 1. `multipart/alternative`: a direct `text/html` child, else a direct
//!    `text/plain` child, else recurse into the children in order.
//! 2. `multipart/related`: the first child if it is `text/html`, else a
//!    depth-first search for `text/html`, then for `text/plain`.
//! 3. `multipart/mixed`: rule 1 on the first `multipart/alternative` child,
//!    else direct `text/html` then `text/plain` children, else recurse.
//! 4. A `text/html` or `text/plain` node with a body is taken as is.
//! 5. Otherwise a pre-order search of the whole subtree for `text/html`,
//!    then for `text/plain`.
//!
//! HTML is preferred over plain text and nearby parts over distant ones.
//! A part only qualifies if it carries a non-empty body.

use tracing::trace;

use crate::error::SelectionMiss;
use crate::model::node::{MimeNode, MimeType};

/// Default nesting limit. Real messages rarely exceed a depth of 6.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The part chosen for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub mime_type: &'a MimeType,
    pub raw_body: &'a str,
}

impl<'a> Candidate<'a> {
    fn of(node: &'a MimeNode) -> Option<Self> {
        node.raw_body().map(|raw_body| Self {
            mime_type: node.mime_type(),
            raw_body,
        })
    }
}

/// Select the display candidate with the default depth limit.
///
/// Returns `None` when nothing qualifies or the tree is nested too deeply.
pub fn select_candidate(root: &MimeNode) -> Option<Candidate<'_>> {
    Selector::default().select(root).ok()
}

/// Intermediate result: `Ok(None)` means "keep looking", `Err` aborts the walk.
type Step<'a> = Result<Option<Candidate<'a>>, SelectionMiss>;

/// Walks a [`MimeNode`] tree applying the selection precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    max_depth: usize,
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Selector {
    /// A selector that gives up below `max_depth` levels (at least 1).
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Select the display candidate, reporting why nothing was found.
    pub fn select<'a>(&self, root: &'a MimeNode) -> Result<Candidate<'a>, SelectionMiss> {
        self.select_node(root, 0)?
            .ok_or(SelectionMiss::NoCandidate)
    }

    fn guard(&self, depth: usize) -> Result<(), SelectionMiss> {
        if depth >= self.max_depth {
            return Err(SelectionMiss::RecursionLimitExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn select_node<'a>(&self, node: &'a MimeNode, depth: usize) -> Step<'a> {
        self.guard(depth)?;
        trace!(mime = %node.mime_type(), depth, "Selecting");

        let structured = match node.mime_type() {
            MimeType::MultipartAlternative => self.select_alternative(node, depth)?,
            MimeType::MultipartRelated => self.select_related(node, depth)?,
            MimeType::MultipartMixed => self.select_mixed(node, depth)?,
            MimeType::TextHtml | MimeType::TextPlain => Candidate::of(node),
            MimeType::Other(_) => None,
        };

        // A multipart rule that finds nothing has already visited every part
        // below it, so only leaves and unknown containers need rule 5.
        let visited_all = matches!(
            node.mime_type(),
            MimeType::MultipartAlternative | MimeType::MultipartRelated | MimeType::MultipartMixed
        );
        match (structured, visited_all) {
            (Some(found), _) => Ok(Some(found)),
            (None, true) => Ok(None),
            (None, false) => self.search_text(node, depth),
        }
    }

    /// Rule 1.
    fn select_alternative<'a>(&self, node: &'a MimeNode, depth: usize) -> Step<'a> {
        if let Some(found) = direct_text_child(node) {
            return Ok(Some(found));
        }
        self.select_children(node, depth, None)
    }

    /// Rule 2.
    fn select_related<'a>(&self, node: &'a MimeNode, depth: usize) -> Step<'a> {
        if let Some(first) = node.children().first() {
            if first.has_body_of(&MimeType::TextHtml) {
                return Ok(Candidate::of(first));
            }
        }
        self.search_text(node, depth)
    }

    /// Rule 3.
    fn select_mixed<'a>(&self, node: &'a MimeNode, depth: usize) -> Step<'a> {
        let alternative = node
            .children()
            .iter()
            .find(|c| c.mime_type() == &MimeType::MultipartAlternative);

        if let Some(alt) = alternative {
            self.guard(depth + 1)?;
            if let Some(found) = self.select_alternative(alt, depth + 1)? {
                return Ok(Some(found));
            }
        }

        if let Some(found) = direct_text_child(node) {
            return Ok(Some(found));
        }
        // The alternative child holds no text part, skip it.
        self.select_children(node, depth, alternative)
    }

    /// Apply the full precedence to each child in order, except `skip`.
    fn select_children<'a>(
        &self,
        node: &'a MimeNode,
        depth: usize,
        skip: Option<&MimeNode>,
    ) -> Step<'a> {
        for child in node.children() {
            if skip.is_some_and(|s| std::ptr::eq(s, child)) {
                continue;
            }
            if let Some(found) = self.select_node(child, depth + 1)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Rule 5: pre-order search for HTML, then for plain text.
    fn search_text<'a>(&self, node: &'a MimeNode, depth: usize) -> Step<'a> {
        if let Some(found) = self.find_preorder(node, &MimeType::TextHtml, depth)? {
            return Ok(Some(found));
        }
        self.find_preorder(node, &MimeType::TextPlain, depth)
    }

    fn find_preorder<'a>(&self, node: &'a MimeNode, mime: &MimeType, depth: usize) -> Step<'a> {
        self.guard(depth)?;
        if node.has_body_of(mime) {
            return Ok(Candidate::of(node));
        }
        for child in node.children() {
            if let Some(found) = self.find_preorder(child, mime, depth + 1)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

/// A direct `text/html` child with a body, else a direct `text/plain` one.
fn direct_text_child(node: &MimeNode) -> Option<Candidate<'_>> {
    [MimeType::TextHtml, MimeType::TextPlain]
        .iter()
        .find_map(|mime| {
            node.children()
                .iter()
                .find(|c| c.has_body_of(mime))
                .and_then(Candidate::of)
        })
}
