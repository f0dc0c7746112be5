//! Error types for the content pipeline.

use toot_tree::ParseError;

/// Error while turning status HTML into a content tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ContentError {
    /// The (preprocessed) HTML could not be parsed.
    #[error("failed to parse content HTML: {0}")]
    Parse(#[from] ParseError),
}
