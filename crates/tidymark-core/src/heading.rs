//! ATX heading recognition.
//!
//! A heading line is one or more `#` characters, a single space, then the
//! heading text. The hash count is the heading depth. Bare `#` runs with no
//! trailing ` text` are not headings, so code and hashtags pass through.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#+) (.*)$").unwrap_or_else(|e| panic!("invalid heading regex: {e}"))
});

/// Splits `line` into `(depth, text)` if it is an ATX heading.
///
/// Returns `None` for every other line, including `#hashtag` and blank
/// lines. The text is returned untrimmed; callers decide whether trailing
/// whitespace matters.
#[must_use]
pub fn heading_line(line: &str) -> Option<(usize, &str)> {
    let caps = HEADING.captures(line)?;
    let hashes = caps.get(1)?.as_str().len();
    let text = caps.get(2)?.as_str();
    Some((hashes, text))
}

/// True if `line` is a heading of exactly `depth` hashes.
#[must_use]
pub fn is_heading_at(line: &str, depth: usize) -> bool {
    heading_line(line).is_some_and(|(d, _)| d == depth)
}

/// True if `re` matches at the very start of `text`.
///
/// Used for anchored title matching with patterns whose own anchors the
/// caller does not control.
#[must_use]
pub fn match_at_start(re: &Regex, text: &str) -> bool {
    re.find(text).is_some_and(|m| m.start() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_depths() {
        assert_eq!(heading_line("# Title"), Some((1, "Title")));
        assert_eq!(heading_line("### Deep one"), Some((3, "Deep one")));
        assert_eq!(heading_line("## "), Some((2, "")));
    }

    #[test]
    fn rejects_non_headings() {
        assert_eq!(heading_line("plain text"), None);
        assert_eq!(heading_line("#hashtag"), None);
        assert_eq!(heading_line(""), None);
        assert_eq!(heading_line(" # indented"), None);
    }

    #[test]
    fn depth_check_is_exact() {
        assert!(is_heading_at("## Sub", 2));
        assert!(!is_heading_at("## Sub", 1));
        assert!(!is_heading_at("# Top", 2));
    }

    #[test]
    fn anchored_match() {
        let re = Regex::new("Proj").unwrap();
        assert!(match_at_start(&re, "Project A"));
        assert!(!match_at_start(&re, "My Project"));
    }
}
