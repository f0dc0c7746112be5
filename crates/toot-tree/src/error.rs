//! Error types for HTML parsing.

/// Error while parsing an HTML fragment into a [`Tree`](crate::Tree).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// XML tokenizer error (unterminated tag, bad markup, ...).
    #[error("HTML parse error")]
    Syntax(#[from] quick_xml::Error),

    /// Encoding error while decoding text or names.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
