//! Text normalization shared by the matchers and the role predictor.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:http|www)\S+").expect("URL pattern is valid"));

/// Canonical lowercase token stream.
///
/// Order matters: URLs are removed before punctuation so their fragments do not
/// survive as short tokens ("www example com") that look like skill names.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let without_urls = URL_RE.replace_all(&lowered, " ");

    let cleaned: String = without_urls
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    collapse_whitespace(&cleaned)
}

/// Lowercased, URL-free text with punctuation kept, so catalog phrases such as
/// `c++`, `node.js` or `ci/cd` can still be found by the lexical matcher.
pub fn prepare_for_matching(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let without_urls = URL_RE.replace_all(&lowered, " ");
    collapse_whitespace(&without_urls)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
