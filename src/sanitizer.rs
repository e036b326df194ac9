//! Sanitization dispatcher
//!
//! Applies the registered rule to each declared key or sub-key of a
//! submitted value, reading previous values from the store and defaults from
//! the defaults provider. The dispatcher never writes; committing its output
//! is the caller's job.

use crate::defaults::DefaultsProvider;
use crate::registry::{Binding, Registry};
use crate::store::SettingsStore;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One dispatch context: registry, store and defaults, all borrowed
#[derive(Clone, Copy)]
pub struct Sanitizer<'a> {
    registry: &'a Registry,
    store: &'a dyn SettingsStore,
    defaults: &'a dyn DefaultsProvider,
}

impl<'a> Sanitizer<'a> {
    /// Create a dispatcher over the given collaborators
    #[must_use]
    pub fn new(
        registry: &'a Registry,
        store: &'a dyn SettingsStore,
        defaults: &'a dyn DefaultsProvider,
    ) -> Self {
        Self {
            registry,
            store,
            defaults,
        }
    }

    /// Validate `candidate` for `bundle_key`.
    ///
    /// Unregistered keys are returned unchanged. Compound keys always come
    /// back with every registered sub-key present; submitted sub-keys the
    /// registry does not know are left as submitted.
    #[must_use]
    pub fn sanitize(&self, bundle_key: &str, candidate: &Value) -> Value {
        if self.registry.lookup(bundle_key).is_none() {
            return candidate.clone();
        }
        let stored = self.store.get_stored(bundle_key);
        self.sanitize_against(bundle_key, candidate, stored.as_ref())
    }

    /// Like [`sanitize`](Self::sanitize), with the stored value already read
    #[must_use]
    pub fn sanitize_against(&self, bundle_key: &str, candidate: &Value, stored: Option<&Value>) -> Value {
        match self.registry.lookup(bundle_key) {
            None => candidate.clone(),
            Some(Binding::Scalar(rule_name)) => self.sanitize_scalar(bundle_key, rule_name, candidate, stored),
            Some(Binding::Compound(subs)) => self.sanitize_compound(bundle_key, subs, candidate, stored),
        }
    }

    /// Validate every key of a submitted bundle
    #[must_use]
    pub fn sanitize_all(&self, bundle: &Map<String, Value>) -> Map<String, Value> {
        bundle
            .iter()
            .map(|(key, value)| (key.clone(), self.sanitize(key, value)))
            .collect()
    }

    fn sanitize_scalar(
        &self,
        bundle_key: &str,
        rule_name: &str,
        candidate: &Value,
        stored: Option<&Value>,
    ) -> Value {
        let Some(rule) = self.registry.rule(rule_name) else {
            log::debug!("Rule '{rule_name}' for '{bundle_key}' is not defined, passing through");
            return candidate.clone();
        };

        let previous = stored.cloned().unwrap_or_else(empty);
        let default = self.defaults.default_for(bundle_key, None);
        rule.validate(candidate, &previous, default.as_ref())
    }

    fn sanitize_compound(
        &self,
        bundle_key: &str,
        subs: &BTreeMap<String, String>,
        candidate: &Value,
        stored: Option<&Value>,
    ) -> Value {
        let empty_map = Map::new();
        let previous = match stored {
            Some(Value::Object(map)) => map,
            _ => &empty_map,
        };
        let mut output = match candidate {
            Value::Object(map) => map.clone(),
            other => {
                if !other.is_null() {
                    log::debug!("Non-map value submitted for compound key '{bundle_key}'");
                }
                Map::new()
            }
        };

        for (sub_key, rule_name) in subs {
            let submitted = output.get(sub_key).cloned().unwrap_or_else(empty);

            let accepted = match self.registry.rule(rule_name) {
                Some(rule) => {
                    let prev = previous.get(sub_key).cloned().unwrap_or_else(empty);
                    let default = self.defaults.default_for(bundle_key, Some(sub_key));
                    rule.validate(&submitted, &prev, default.as_ref())
                }
                None => submitted,
            };
            output.insert(sub_key.clone(), accepted);
        }

        Value::Object(output)
    }
}

fn empty() -> Value {
    Value::String(String::new())
}
