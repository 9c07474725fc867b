//! Pure text-cleaning helpers applied before a comment becomes speakable.

use html_escape::decode_html_entities;

/// Authors whose comments are never read aloud.
const AUTHOR_DENYLIST: &[&str] = &[
    "automoderator",
    "automod",
    "moderator",
    "bot",
    "modbot",
    "reddit",
];

/// Strip link noise from comment text.
///
/// Markdown links keep their label, bare URLs and subreddit/user
/// references are dropped entirely, then whitespace runs collapse.
pub fn strip_links(text: &str) -> String {
    let decoded = decode_html_entities(text);
    let unlinked = strip_markdown_links(&decoded);

    let mut tokens: Vec<String> = Vec::new();
    for token in unlinked.split_whitespace() {
        let core = token.trim_end_matches(|c: char| matches!(c, ',' | '.' | ';' | ':' | '!' | '?'));
        if is_link_token(core) {
            // Keep trailing punctuation so sentence rhythm survives.
            let tail = &token[core.len()..];
            if !tail.is_empty() {
                tokens.push(tail.to_string());
            }
        } else {
            tokens.push(token.to_string());
        }
    }

    tokens.join(" ").trim().to_string()
}

/// True for authors that should be skipped entirely during extraction.
///
/// An absent author never filters; anonymous comments are still read.
pub fn is_filtered_author(author: Option<&str>) -> bool {
    let Some(author) = author else {
        return false;
    };

    let name = author.trim().to_lowercase();
    if name.is_empty() {
        return false;
    }

    AUTHOR_DENYLIST.contains(&name.as_str())
        || name.contains("bot")
        || name.starts_with("mod")
}

/// Replace `[label](url)` constructs with their label.
fn strip_markdown_links(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' {
            if let Some(close) = text[i + 1..].find(']').map(|p| i + 1 + p) {
                if bytes.get(close + 1) == Some(&b'(') {
                    if let Some(end) = text[close + 2..].find(')').map(|p| close + 2 + p) {
                        out.push_str(&text[i + 1..close]);
                        i = end + 1;
                        continue;
                    }
                }
            }
        }

        match text[i..].chars().next() {
            Some(c) => {
                out.push(c);
                i += c.len_utf8();
            }
            None => break,
        }
    }

    out
}

fn is_link_token(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }

    let lower = token.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.") {
        return true;
    }

    // Subreddit and user references, with or without a leading slash.
    let bare = token.strip_prefix('/').unwrap_or(token);
    for prefix in ["r/", "u/"] {
        if let Some(rest) = bare.strip_prefix(prefix) {
            if !rest.is_empty() {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_label_retained_urls_removed() {
        let input = "Check [this](http://x.com/y) out at https://example.com and r/funny, u/bob";
        assert_eq!(strip_links(input), "Check this out at and ,");
    }

    #[test]
    fn test_bare_url_variants() {
        assert_eq!(strip_links("see www.example.org for more"), "see for more");
        assert_eq!(strip_links("HTTPS://EXAMPLE.COM works"), "works");
    }

    #[test]
    fn test_slash_prefixed_references() {
        assert_eq!(strip_links("go to /r/rust and ask /u/someone"), "go to and ask");
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(strip_links("a    b\n\n  c"), "a b c");
    }

    #[test]
    fn test_html_entities_decoded() {
        assert_eq!(strip_links("fish &amp; chips"), "fish & chips");
    }

    #[test]
    fn test_unclosed_markdown_left_alone() {
        assert_eq!(strip_links("a [label without url"), "a [label without url");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip_links("nothing to strip here"), "nothing to strip here");
    }

    #[test]
    fn test_filtered_authors() {
        assert!(is_filtered_author(Some("AutoModerator")));
        assert!(is_filtered_author(Some("SomeBot_99")));
        assert!(is_filtered_author(Some("Moderator_Jane")));
        assert!(is_filtered_author(Some("helper_bot")));
        assert!(is_filtered_author(Some("reddit")));
        assert!(!is_filtered_author(Some("regular_user")));
        assert!(!is_filtered_author(Some("robbie")));
        assert!(!is_filtered_author(None));
    }
}
