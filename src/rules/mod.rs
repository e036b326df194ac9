//! Rule library
//!
//! A [`Rule`] turns a submitted value into an accepted one. Every rule is
//! pure and total: invalid input never errors, it falls back to the previous
//! stored value, a static default, or an empty value, depending on the rule.
//!
//! Rules are a closed set of kinds, each carrying its own parameters, so a
//! rule table can be declared in code or loaded from JSON:
//!
//! ```rust
//! use rcsan::Rule;
//! use serde_json::json;
//!
//! let rule: Rule = serde_json::from_value(json!({
//!     "kind": "clamp", "min": 1, "max": 50000
//! })).unwrap();
//!
//! assert_eq!(rule.validate(&json!(999999), &json!(""), None), json!(50000));
//! ```

pub mod coerce;
pub mod text;
pub mod url;

use coerce::{as_text, is_empty, is_truthy, to_int, to_non_negative_int};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Rule Kinds
// =============================================================================

/// Where an enum-constrained rule goes when the candidate is not a member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Keep the previous value; use the default only when previous is empty
    #[default]
    PreviousOrDefault,
    /// Always use the default
    Default,
}

/// A validation/normalization rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Accept only members of a closed set
    OneOf {
        allowed: Vec<String>,
        #[serde(default)]
        fallback: Fallback,
    },
    /// Canonical `1`/`0` by truthiness
    Boolean,
    /// Integer, negative and non-numeric input become `0`
    NonNegativeInt,
    /// Integer rendered as a string (`"3"`)
    NumericString,
    /// Integer clamped into `[min, max]`; `0` means unset and yields the default
    Clamp { min: i64, max: i64 },
    /// Join non-blank lines with single spaces
    SingleLine,
    /// Collapse runs of spaces / non-breaking spaces
    DupeSpace,
    /// Non-breaking spaces to plain spaces
    Nbsp,
    /// Tabs to spaces
    Tabs,
    /// Encode backslashes as `&#92;`
    Backslash,
    /// Trim surrounding whitespace
    Trim,
    /// Remove markup
    StripTags,
    /// Remove markup and all spaces
    StripTagsAndSpaces,
    /// Validated URL without its query
    Url,
    /// Validated URL with its query
    UrlQuery,
    /// `@handle` from a handle or profile URL
    SocialHandle,
    /// Canonical profile URL on a fixed service
    ProfileUrl {
        #[serde(default = "default_profile_base")]
        base: String,
    },
    /// 3 or 6 digit hex color, `""` otherwise
    HexColor,
    /// Map of post type → flag, every flag normalized to `1`/`0`
    PostTypes,
    /// Like [`Rule::PostTypes`], dropping post types that are always enabled
    DisabledPostTypes { forced: Vec<String> },
    /// Apply rules in order
    Chain { rules: Vec<Rule> },
}

fn default_profile_base() -> String {
    url::DEFAULT_PROFILE_BASE.to_string()
}

impl Rule {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Closed set, falling back to previous, then default
    pub fn one_of<I, T>(allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Rule::OneOf {
            allowed: allowed.into_iter().map(Into::into).collect(),
            fallback: Fallback::PreviousOrDefault,
        }
    }

    /// Closed set, falling back straight to the default
    pub fn one_of_or_default<I, T>(allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Rule::OneOf {
            allowed: allowed.into_iter().map(Into::into).collect(),
            fallback: Fallback::Default,
        }
    }

    /// Bounded integer
    pub fn clamp(min: i64, max: i64) -> Self {
        Rule::Clamp { min, max }
    }

    /// Profile URL on the default service
    pub fn profile_url() -> Self {
        Rule::ProfileUrl {
            base: default_profile_base(),
        }
    }

    /// Post-type flags without the force-enabled types
    pub fn disabled_post_types<I, T>(forced: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Rule::DisabledPostTypes {
            forced: forced.into_iter().map(Into::into).collect(),
        }
    }

    /// Sequence of rules; order matters
    pub fn chain(rules: impl Into<Vec<Rule>>) -> Self {
        Rule::Chain {
            rules: rules.into(),
        }
    }

    /// One-line title text.
    ///
    /// Single-line must run before the space collapse so joined lines are
    /// collapsed too.
    pub fn title() -> Self {
        Self::chain([
            Rule::SingleLine,
            Rule::Nbsp,
            Rule::Tabs,
            Rule::Backslash,
            Rule::DupeSpace,
            Rule::Trim,
        ])
    }

    /// One-line description text (same pipeline as titles)
    pub fn description() -> Self {
        Self::title()
    }

    /// Excerpt: markup removed, then the description pipeline
    pub fn excerpt() -> Self {
        Self::chain([Rule::StripTags, Self::description()])
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate `candidate` against this rule.
    ///
    /// `previous` is the currently stored value (empty string when none) and
    /// `default` the static default for the key being validated, if any.
    pub fn validate(&self, candidate: &Value, previous: &Value, default: Option<&Value>) -> Value {
        match self {
            Rule::OneOf { allowed, fallback } => {
                one_of(allowed, *fallback, candidate, previous, default)
            }
            Rule::Boolean => Value::from(i64::from(is_truthy(candidate))),
            Rule::NonNegativeInt => Value::from(to_non_negative_int(candidate)),
            Rule::NumericString => Value::String(to_int(candidate).to_string()),
            Rule::Clamp { min, max } => clamp(*min, *max, candidate, default),
            Rule::SingleLine => map_text(candidate, text::single_line),
            Rule::DupeSpace => map_text(candidate, text::collapse_spaces),
            Rule::Nbsp => map_text(candidate, text::replace_nbsp),
            Rule::Tabs => map_text(candidate, text::replace_tabs),
            Rule::Backslash => map_text(candidate, text::escape_backslashes),
            Rule::Trim => map_text(candidate, |s| s.trim().to_string()),
            Rule::StripTags => map_text(candidate, text::strip_tags),
            Rule::StripTagsAndSpaces => map_text(candidate, text::strip_tags_and_spaces),
            Rule::Url => map_text(candidate, url::clean_url_without_query),
            Rule::UrlQuery => map_text(candidate, url::clean_url),
            Rule::SocialHandle => map_text(candidate, url::social_handle),
            Rule::ProfileUrl { base } => map_text(candidate, |s| url::profile_url(s, base)),
            Rule::HexColor => map_text(candidate, text::hex_color),
            Rule::PostTypes => post_types(candidate, &[]),
            Rule::DisabledPostTypes { forced } => post_types(candidate, forced),
            Rule::Chain { rules } => rules.iter().fold(candidate.clone(), |value, rule| {
                rule.validate(&value, previous, default)
            }),
        }
    }

    /// Validate the rule definition itself
    ///
    /// Checks:
    /// - Closed sets are not empty
    /// - Clamp range has min <= max
    /// - Profile base is an absolute URL
    pub fn check(&self) -> Result<(), String> {
        match self {
            Rule::OneOf { allowed, .. } if allowed.is_empty() => {
                Err("allowed set cannot be empty".to_string())
            }
            Rule::Clamp { min, max } if min > max => {
                Err(format!("min ({min}) cannot be greater than max ({max})"))
            }
            Rule::ProfileUrl { base } => ::url::Url::parse(base)
                .map(|_| ())
                .map_err(|e| format!("invalid profile base '{base}': {e}")),
            Rule::Chain { rules } => rules.iter().try_for_each(Rule::check),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Rule Bodies
// =============================================================================

fn map_text(candidate: &Value, transform: impl FnOnce(&str) -> String) -> Value {
    Value::String(transform(&as_text(candidate)))
}

fn one_of(
    allowed: &[String],
    fallback: Fallback,
    candidate: &Value,
    previous: &Value,
    default: Option<&Value>,
) -> Value {
    if matches!(candidate, Value::String(_) | Value::Number(_)) {
        let text = as_text(candidate);
        if allowed.contains(&text) {
            return Value::String(text);
        }
    }

    let previous = match fallback {
        Fallback::PreviousOrDefault if !is_empty(previous) => Some(previous),
        _ => None,
    };

    previous
        .or(default.filter(|d| !is_empty(d)))
        .map(as_text)
        .or_else(|| allowed.first().cloned())
        .map_or_else(|| Value::String(String::new()), Value::String)
}

fn clamp(min: i64, max: i64, candidate: &Value, default: Option<&Value>) -> Value {
    let n = to_int(candidate);
    if n == 0 {
        return Value::from(default.map(to_int).filter(|d| *d != 0).unwrap_or(min));
    }
    Value::from(n.clamp(min, max))
}

fn post_types(candidate: &Value, forced: &[String]) -> Value {
    let Value::Object(flags) = candidate else {
        return Value::Object(Map::new());
    };

    flags
        .iter()
        .filter(|(post_type, _)| !forced.contains(*post_type))
        .map(|(post_type, flag)| (post_type.clone(), Value::from(i64::from(is_truthy(flag)))))
        .collect::<Map<String, Value>>()
        .into()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_of_accepts_members() {
        let rule = Rule::one_of(["left", "right"]);
        assert_eq!(rule.validate(&json!("right"), &json!("left"), None), json!("right"));
    }

    #[test]
    fn test_one_of_falls_back_to_previous_then_default() {
        let rule = Rule::one_of(["left", "right"]);
        let default = json!("right");

        assert_eq!(rule.validate(&json!("up"), &json!("left"), Some(&default)), json!("left"));
        assert_eq!(rule.validate(&json!("up"), &json!(""), Some(&default)), json!("right"));
        assert_eq!(rule.validate(&json!(null), &json!(null), None), json!("left"));
    }

    #[test]
    fn test_one_of_or_default_ignores_previous() {
        let rule = Rule::one_of_or_default(["automatic", "http", "https"]);
        let default = json!("automatic");

        assert_eq!(rule.validate(&json!("https"), &json!("http"), Some(&default)), json!("https"));
        assert_eq!(rule.validate(&json!("gopher"), &json!("http"), Some(&default)), json!("automatic"));
    }

    #[test]
    fn test_boolean_is_idempotent() {
        let once = Rule::Boolean.validate(&json!(5), &json!(0), None);
        assert_eq!(once, json!(1));
        assert_eq!(Rule::Boolean.validate(&once, &json!("anything"), None), json!(1));
        assert_eq!(Rule::Boolean.validate(&json!("0"), &json!(1), None), json!(0));
    }

    #[test]
    fn test_non_negative_and_numeric_string() {
        assert_eq!(Rule::NonNegativeInt.validate(&json!(-3), &json!(""), None), json!(0));
        assert_eq!(Rule::NonNegativeInt.validate(&json!("12"), &json!(""), None), json!(12));
        assert_eq!(Rule::NumericString.validate(&json!(7.8), &json!(""), None), json!("7"));
        assert_eq!(Rule::NumericString.validate(&json!("x"), &json!(""), None), json!("0"));
    }

    #[test]
    fn test_clamp_boundaries() {
        let rule = Rule::clamp(1, 50000);
        let default = json!(3000);

        assert_eq!(rule.validate(&json!(0), &json!(""), Some(&default)), json!(3000));
        assert_eq!(rule.validate(&json!(-5), &json!(""), Some(&default)), json!(1));
        assert_eq!(rule.validate(&json!(999999), &json!(""), Some(&default)), json!(50000));
        assert_eq!(rule.validate(&json!(42), &json!(""), Some(&default)), json!(42));
        // No default configured: unset becomes the lower bound
        assert_eq!(rule.validate(&json!("junk"), &json!(""), None), json!(1));
    }

    #[test]
    fn test_title_pipeline() {
        let rule = Rule::title();
        let once = rule.validate(&json!("a\r\n\r\nb\tc   d"), &json!(""), None);
        assert_eq!(once, json!("a b c d"));
        assert_eq!(rule.validate(&once, &once, None), once);

        let nbsp = rule.validate(&json!("&nbsp;Lead\u{a0}\u{a0}text\\"), &json!(""), None);
        assert_eq!(nbsp, json!("Lead text"));
    }

    #[test]
    fn test_excerpt_strips_markup_first() {
        let rule = Rule::excerpt();
        let out = rule.validate(&json!("<p>First</p>\n<p>Second</p>"), &json!(""), None);
        assert_eq!(out, json!("First Second"));
    }

    #[test]
    fn test_hex_color_has_no_previous_fallback() {
        assert_eq!(Rule::HexColor.validate(&json!("#12G"), &json!("abc"), None), json!(""));
        assert_eq!(Rule::HexColor.validate(&json!("#1a2b3c"), &json!(""), None), json!("1a2b3c"));
    }

    #[test]
    fn test_post_types() {
        let out = Rule::PostTypes.validate(&json!({"post": "on", "page": 0, "book": "1"}), &json!(""), None);
        assert_eq!(out, json!({"post": 1, "page": 0, "book": 1}));

        assert_eq!(Rule::PostTypes.validate(&json!("post"), &json!(""), None), json!({}));
    }

    #[test]
    fn test_disabled_post_types_drops_forced() {
        let rule = Rule::disabled_post_types(["post", "page"]);
        let out = rule.validate(&json!({"post": 1, "page": 1, "product": "yes"}), &json!(""), None);
        assert_eq!(out, json!({"product": 1}));
    }

    #[test]
    fn test_string_rules_stringify_scalars() {
        assert_eq!(Rule::StripTags.validate(&json!(42), &json!(""), None), json!("42"));
        assert_eq!(Rule::SocialHandle.validate(&json!(null), &json!(""), None), json!(""));
    }

    #[test]
    fn test_check_rejects_bad_definitions() {
        assert!(Rule::clamp(1, 50000).check().is_ok());
        assert!(Rule::clamp(10, 1).check().is_err());
        assert!(Rule::one_of(Vec::<String>::new()).check().is_err());
        assert!(Rule::ProfileUrl { base: "not a url".into() }.check().is_err());
        assert!(Rule::chain([Rule::Trim, Rule::clamp(5, 0)]).check().is_err());
    }

    #[test]
    fn test_serde_tagging() {
        let rule: Rule = serde_json::from_value(json!({
            "kind": "one_of",
            "allowed": ["summary", "summary_large_image"]
        }))
        .unwrap();
        assert_eq!(rule, Rule::one_of(["summary", "summary_large_image"]));

        let profile: Rule = serde_json::from_value(json!({"kind": "profile_url"})).unwrap();
        assert_eq!(profile, Rule::profile_url());

        let json = serde_json::to_value(Rule::title()).unwrap();
        assert_eq!(json["kind"], "chain");
        assert_eq!(json["rules"][0]["kind"], "single_line");
    }
}
