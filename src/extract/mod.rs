// src/extract/mod.rs
// =============================================================================
// This module pulls secure links out of HTML as it streams in.
//
// Submodules:
// - decode: bytes -> text, chunk by chunk
// - anchor: which tags and attribute values count as links
// - tokenize: the html5ever token sink and the per-document extractor
// =============================================================================

mod anchor;
mod decode;
mod tokenize;

pub use tokenize::LinkExtractor;

/// A link found in a page, on its way to the aggregator.
///
/// Each value is produced once by one task and moved through the link
/// channel; it is never shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredLink(String);

impl DiscoveredLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self(href.into())
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
