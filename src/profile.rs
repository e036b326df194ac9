//! Per-user profile fields
//!
//! Authors can store their own social profiles. Each submitted field goes
//! through its rule; a field that sanitizes to empty falls back to its
//! default instead of being stored empty.

use crate::rules::Rule;
use crate::rules::coerce::is_empty;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Facebook profile page of the author
pub const FACEBOOK_PAGE: &str = "facebook_page";

/// Twitter handle of the author
pub const TWITTER_PAGE: &str = "twitter_page";

#[derive(Debug, Clone, PartialEq)]
struct ProfileField {
    rule: Rule,
    default: Value,
}

/// Sanitizer for user profile fields
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileFields {
    fields: BTreeMap<String, ProfileField>,
}

impl Default for ProfileFields {
    /// `facebook_page` and `twitter_page`, both defaulting to `""`
    fn default() -> Self {
        Self::empty()
            .field(FACEBOOK_PAGE, Rule::profile_url(), Value::String(String::new()))
            .field(TWITTER_PAGE, Rule::SocialHandle, Value::String(String::new()))
    }
}

impl ProfileFields {
    /// No fields
    #[must_use]
    pub fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Add or replace a field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rule: Rule, default: Value) -> Self {
        self.fields.insert(name.into(), ProfileField { rule, default });
        self
    }

    /// Known field names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Sanitize the submitted fields.
    ///
    /// Only known fields that were submitted appear in the result; a missing
    /// field means "leave the stored value alone".
    #[must_use]
    pub fn sanitize(&self, submitted: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|(name, field)| {
                let value = submitted.get(name)?;
                let accepted = field.rule.validate(value, &Value::Null, Some(&field.default));
                let accepted = if is_empty(&accepted) {
                    field.default.clone()
                } else {
                    accepted
                };
                Some((name.clone(), accepted))
            })
            .collect()
    }
}

/// Sanitize submitted profile fields with the default field set
#[must_use]
pub fn sanitize_user_profile(submitted: &Map<String, Value>) -> Map<String, Value> {
    ProfileFields::default().sanitize(submitted)
}
