//! URL, profile and social-handle normalization

use super::coerce::to_non_negative_int;
use super::text::strip_tags;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use url::{Url, form_urlencoded};

static ABSOLUTE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?:)?//[^/]+(/.*)").expect("valid absolute url pattern")
});

/// Schemes a stored URL may use
pub const ALLOWED_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "gopher", "nntp", "feed", "telnet",
    "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

/// Default service base for the profile-URL rule
pub const DEFAULT_PROFILE_BASE: &str = "https://www.facebook.com";

/// Validate a URL, keeping its query.
///
/// Disallowed characters are dropped and spaces encoded. A URL without any
/// scheme gets `http://`. Root-relative (`/`), fragment (`#`) and query (`?`)
/// references are kept as-is when they resolve. Anything that does not parse,
/// or uses a scheme outside [`ALLOWED_SCHEMES`], becomes `""`.
pub fn clean_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut url: String = trimmed
        .replace(' ', "%20")
        .chars()
        .filter(|c| is_url_char(*c))
        .collect();
    if url.is_empty() {
        return String::new();
    }

    if url.starts_with(['/', '#', '?']) {
        let resolves = Url::parse("http://localhost/")
            .and_then(|base| base.join(&url))
            .is_ok();
        return if resolves { url } else { String::new() };
    }

    if !url.contains(':') {
        url.insert_str(0, "http://");
    }

    match Url::parse(&url) {
        Ok(parsed) if ALLOWED_SCHEMES.contains(&parsed.scheme()) => url,
        Ok(parsed) => {
            log::debug!("Rejected URL with scheme '{}'", parsed.scheme());
            String::new()
        }
        Err(_) => String::new(),
    }
}

/// Validate a URL after cutting it at the first `?`
pub fn clean_url_without_query(input: &str) -> String {
    clean_url(without_query(input))
}

/// Reduce a full URL to its path, without the leading slash.
///
/// `https://example.com/a/b` becomes `a/b`. Input that is not an absolute
/// (or protocol-relative) URL with a path only loses leading spaces and slashes.
pub fn root_relative(url: &str) -> String {
    ABSOLUTE_PREFIX
        .replace(url, "${1}")
        .trim_start_matches([' ', '\\', '/'])
        .to_string()
}

/// Normalize a social handle: `https://twitter.com/someone/` becomes `@someone`
pub fn social_handle(input: &str) -> String {
    let stripped = strip_tags(input);
    let relative = root_relative(stripped.trim());
    let profile = relative.trim_end_matches([' ', '/']);
    if profile.is_empty() {
        return String::new();
    }

    let mut handle = if profile.starts_with('@') {
        profile.to_string()
    } else {
        format!("@{profile}")
    };
    handle.retain(|c| c != ' ' && c != '\t');
    handle
}

/// Rewrite any profile link onto `base`.
///
/// A `profile.php` link keeps only its numeric `id` query argument; without
/// one the link is rejected. Every other link is validated with its query.
pub fn profile_url(input: &str, base: &str) -> String {
    let stripped = strip_tags(input);
    let link = stripped.trim();
    if link.is_empty() {
        return String::new();
    }

    let base = base.trim_end_matches('/');
    let full = format!("{base}/{}", root_relative(link));
    let full = full.trim_end_matches([' ', '/']);

    if !full.contains("profile.php") {
        return clean_url(full);
    }

    let query = full
        .split_once('?')
        .and_then(|(_, q)| q.split('?').next())
        .unwrap_or("");
    let id = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "id")
        .map(|(_, id)| to_non_negative_int(&Value::String(id.into_owned())));

    match id {
        Some(id) => clean_url(&format!("{base}/profile.php?id={id}")),
        None => String::new(),
    }
}

/// Everything before the first `?`, or the whole input when that part is empty
fn without_query(input: &str) -> &str {
    input.split('?').find(|part| !part.is_empty()).unwrap_or(input)
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || !c.is_ascii() || "-~+_.?#=!&;,/:%@$|*'()[]".contains(c)
}
