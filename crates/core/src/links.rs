//! Extraction of shoppable links from generated text.

use std::sync::LazyLock;

use regex::Regex;

/// Compiled once, reused forever.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>()\[\]"'`]+"#).expect("valid regex"));

/// Extract every HTTP(S) URL from `text`, de-duplicated, in order of first
/// appearance.
///
/// Trailing sentence punctuation (`.`, `,`, `;`, `:`, `!`, `?`, `*`) is not
/// part of the link.
pub fn extract_links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for m in URL_RE.find_iter(text) {
        let link = m
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', '*']);
        if !links.iter().any(|l| l == link) {
            links.push(link.to_string());
        }
    }
    links
}
