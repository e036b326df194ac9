//! String transforms used by the text rules
//!
//! Each transform is narrow and total; the composite rules in
//! [`Rule`](super::Rule) sequence them.

use regex::Regex;
use std::sync::LazyLock;

static DUPE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \u{a0}]{2,}").expect("valid dupe-space pattern"));

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Fa-f0-9]{3}){1,2}$").expect("valid hex color pattern"));

/// Join all non-blank lines with single spaces.
///
/// `\r\n`, `\r` and `\n` all count as line breaks. Lines that are blank or a
/// lone `&nbsp;` paragraph are dropped.
pub fn single_line(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "&nbsp;")
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse runs of two or more spaces / non-breaking spaces into one space
pub fn collapse_spaces(input: &str) -> String {
    DUPE_SPACE.replace_all(input, " ").into_owned()
}

/// Replace every non-breaking space form (raw, named, numeric) with a space
pub fn replace_nbsp(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace('\u{a0}', " ")
}

/// Replace tabs with spaces
pub fn replace_tabs(input: &str) -> String {
    input.replace('\t', " ")
}

/// Undo upstream slash-escaping, then encode remaining backslashes as `&#92;`
pub fn escape_backslashes(input: &str) -> String {
    strip_slashes(input).replace('\\', "&#92;")
}

/// Remove markup: tags, comments and processing instructions.
///
/// A `<` only opens a tag when followed by a letter, `/`, `!` or `?`, so
/// `a < b` survives. An unterminated tag swallows the rest of the input.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let opens_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));

        if !opens_tag {
            out.push_str(&rest[..=start]);
            rest = after;
            continue;
        }

        out.push_str(&rest[..start]);
        rest = if let Some(comment) = after.strip_prefix("!--") {
            comment.find("-->").map_or("", |end| &comment[end + 3..])
        } else {
            tag_end(after).map_or("", |end| &after[end + 1..])
        };
    }

    out.push_str(rest);
    out
}

/// Remove markup and every space; for opaque tokens like verification codes
pub fn strip_tags_and_spaces(input: &str) -> String {
    strip_tags(input).replace(' ', "")
}

/// Normalize a hex color to 3 or 6 hex digits without `#`; anything else is `""`
pub fn hex_color(input: &str) -> String {
    let color = input.trim_matches(|c| c == '#' || c == ' ');
    if HEX_COLOR.is_match(color) {
        color.to_string()
    } else {
        String::new()
    }
}

fn strip_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Byte offset of the `>` closing a tag body, skipping quoted attribute values
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\r\n\r\nb\tc   d"), "a b\tc   d");
        assert_eq!(single_line("  one\n\n   \ntwo  \rthree "), "one two three");
        assert_eq!(single_line("x\n&nbsp;\ny"), "x y");
        assert_eq!(single_line(""), "");
    }

    #[test]
    fn test_collapse_spaces() {
        assert_eq!(collapse_spaces("a  b\u{a0}\u{a0}c \u{a0} d"), "a b c d");
        assert_eq!(collapse_spaces("  lead"), " lead");
        assert_eq!(collapse_spaces("single space"), "single space");
    }

    #[test]
    fn test_nbsp_and_tabs() {
        assert_eq!(replace_nbsp("a&nbsp;b&#160;c\u{a0}d"), "a b c d");
        assert_eq!(replace_tabs("a\tb\t\tc"), "a b  c");
    }

    #[test]
    fn test_escape_backslashes() {
        assert_eq!(escape_backslashes(r"C:\\path"), r"C:&#92;path");
        assert_eq!(escape_backslashes(r"it\'s"), "it's");
        assert_eq!(escape_backslashes("&#92;"), "&#92;");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>bold</b> text"), "bold text");
        assert_eq!(strip_tags(r#"<a href="x>y">link</a>"#), "link");
        assert_eq!(strip_tags("a < b and c > d"), "a < b and c > d");
        assert_eq!(strip_tags("keep<!-- a > b -->this"), "keepthis");
        assert_eq!(strip_tags("cut <span class="), "cut ");
    }

    #[test]
    fn test_strip_tags_and_spaces() {
        assert_eq!(strip_tags_and_spaces("<meta> abc 123 </meta>"), "abc123");
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#fff"), "fff");
        assert_eq!(hex_color(" #00aaFF "), "00aaFF");
        assert_eq!(hex_color("#abcd"), "");
        assert_eq!(hex_color("zzz"), "");
        assert_eq!(hex_color("##"), "");
    }
}
