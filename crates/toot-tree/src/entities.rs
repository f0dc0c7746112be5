//! Input normalization ahead of XML tokenizing.
//!
//! Server HTML uses named entities XML does not know (`&nbsp;`, `&hellip;`)
//! and occasionally a bare `&`. Both are rewritten so the XML reader accepts
//! the fragment. The five XML entities are left for the reader to decode.

use std::sync::LazyLock;

use regex::Regex;

/// Named entity, numeric reference, or a bare ampersand.
static AMPERSAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:([a-zA-Z][a-zA-Z0-9]*);|(#[0-9]+;|#[xX][0-9a-fA-F]+;))?")
        .expect("invalid ampersand regex")
});

/// Prepare an HTML fragment for the XML reader.
///
/// - Named HTML entities with a known Unicode equivalent are replaced by it.
/// - XML entities, numeric references and unknown named entities are kept.
/// - Ampersands that do not start a reference become `&amp;`.
pub(crate) fn normalize_entities(html: &str) -> String {
    AMPERSAND_PATTERN
        .replace_all(html, |caps: &regex::Captures| {
            if let Some(name) = caps.get(1) {
                return html_entity(name.as_str())
                    .map_or_else(|| caps[0].to_owned(), str::to_owned);
            }
            if caps.get(2).is_some() {
                return caps[0].to_owned();
            }
            "&amp;".to_owned()
        })
        .into_owned()
}

/// Decode an entity reference reported by the XML reader (without `&` and `;`).
///
/// Unknown references are returned verbatim, including the delimiters.
pub(crate) fn decode_reference(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

/// Map an HTML entity name to its Unicode text.
///
/// XML entities map to `None` so the reader keeps handling them.
fn html_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",
        "middot" => "\u{00b7}",
        "shy" => "\u{00ad}",
        "zwj" => "\u{200d}",
        "zwnj" => "\u{200c}",

        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",

        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "plusmn" => "\u{00b1}",
        "deg" => "\u{00b0}",

        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",

        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",

        "iexcl" => "\u{00a1}",
        "iquest" => "\u{00bf}",
        "sect" => "\u{00a7}",
        "para" => "\u{00b6}",

        _ => return None,
    })
}
