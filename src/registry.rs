//! Rule registry
//!
//! Maps every governed bundle key (and, for compound keys, every sub-key)
//! to a rule name, and rule names to [`Rule`] definitions.
//!
//! # Example
//!
//! ```rust
//! use rcsan::{Binding, Registry, Rule};
//!
//! let mut registry = Registry::new();
//! registry.define_rule("boolean", Rule::Boolean).unwrap();
//! registry.register("boolean", "site", ["noindex", "nofollow"]);
//!
//! match registry.lookup("site") {
//!     Some(Binding::Compound(subs)) => assert_eq!(subs.len(), 2),
//!     _ => unreachable!(),
//! }
//! ```

use crate::error::{Error, Result};
use crate::rules::Rule;
use std::collections::{BTreeMap, HashMap};

/// What a bundle key is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// The whole value is validated by one rule
    Scalar(String),
    /// Each registered sub-key has its own rule
    Compound(BTreeMap<String, String>),
}

impl Binding {
    /// Rule name for a sub-key (or for the value itself when scalar)
    #[must_use]
    pub fn rule_for(&self, sub_key: Option<&str>) -> Option<&str> {
        match (self, sub_key) {
            (Binding::Scalar(rule), None) => Some(rule),
            (Binding::Compound(subs), Some(sub)) => subs.get(sub).map(String::as_str),
            _ => None,
        }
    }
}

/// Sub-key argument of [`Registry::register`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubKeys {
    /// Bind the bundle key itself
    #[default]
    None,
    /// Bind one `(key, sub_key)` pair
    One(String),
    /// Bind every `(key, sub_key)` pair
    Many(Vec<String>),
}

impl From<()> for SubKeys {
    fn from((): ()) -> Self {
        SubKeys::None
    }
}

impl From<&str> for SubKeys {
    fn from(sub: &str) -> Self {
        SubKeys::One(sub.to_string())
    }
}

impl From<String> for SubKeys {
    fn from(sub: String) -> Self {
        SubKeys::One(sub)
    }
}

impl From<Vec<String>> for SubKeys {
    fn from(subs: Vec<String>) -> Self {
        SubKeys::Many(subs)
    }
}

impl From<&[&str]> for SubKeys {
    fn from(subs: &[&str]) -> Self {
        SubKeys::Many(subs.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SubKeys {
    fn from(subs: [&str; N]) -> Self {
        SubKeys::Many(subs.iter().map(ToString::to_string).collect())
    }
}

/// Key → rule bindings plus the named rule table
#[derive(Debug, Clone, Default)]
pub struct Registry {
    bindings: HashMap<String, Binding>,
    rules: HashMap<String, Rule>,
    initialized: bool,
}

impl PartialEq for Registry {
    fn eq(&self, other: &Self) -> bool {
        self.bindings == other.bindings && self.rules == other.rules
    }
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a named rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] if the definition is inconsistent
    /// (empty set, inverted bounds, ...). The table is left unchanged.
    pub fn define_rule(&mut self, name: impl Into<String>, rule: Rule) -> Result<()> {
        let name = name.into();
        rule.check().map_err(|reason| Error::InvalidRule {
            rule: name.clone(),
            reason,
        })?;

        if self.rules.insert(name.clone(), rule).is_some() {
            log::debug!("Rule '{name}' redefined");
        }
        Ok(())
    }

    /// Bind a key, one sub-key, or several sub-keys to `rule_name`.
    ///
    /// Later registrations for the same pair win. Binding a scalar over a
    /// compound key (or the reverse) replaces the old binding entirely.
    pub fn register(
        &mut self,
        rule_name: impl Into<String>,
        bundle_key: impl Into<String>,
        sub_keys: impl Into<SubKeys>,
    ) {
        let rule_name = rule_name.into();
        let bundle_key = bundle_key.into();

        let subs = match sub_keys.into() {
            SubKeys::None => {
                self.bindings.insert(bundle_key, Binding::Scalar(rule_name));
                return;
            }
            SubKeys::One(sub) => vec![sub],
            SubKeys::Many(subs) => subs,
        };

        let binding = self
            .bindings
            .entry(bundle_key)
            .or_insert_with(|| Binding::Compound(BTreeMap::new()));

        if let Binding::Scalar(_) = binding {
            *binding = Binding::Compound(BTreeMap::new());
        }
        if let Binding::Compound(map) = binding {
            for sub in subs {
                map.insert(sub, rule_name.clone());
            }
        }
    }

    /// Run a full registration pass once.
    ///
    /// Returns `true` if `pass` ran, `false` if the registry was already
    /// initialized.
    ///
    /// # Errors
    ///
    /// Propagates the first error from `pass`. The registry is not marked
    /// initialized in that case.
    pub fn initialize_with<F>(&mut self, pass: F) -> Result<bool>
    where
        F: FnOnce(&mut Registry) -> Result<()>,
    {
        if self.initialized {
            return Ok(false);
        }
        pass(self)?;
        self.initialized = true;
        log::debug!(
            "Registry initialized: {} keys, {} rules",
            self.bindings.len(),
            self.rules.len()
        );
        Ok(true)
    }

    /// Whether a registration pass has completed
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Binding for a bundle key
    #[must_use]
    pub fn lookup(&self, bundle_key: &str) -> Option<&Binding> {
        self.bindings.get(bundle_key)
    }

    /// Named rule definition
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Resolve the rule for `(bundle_key, sub_key)` in one step
    #[must_use]
    pub fn resolve(&self, bundle_key: &str, sub_key: Option<&str>) -> Option<&Rule> {
        self.lookup(bundle_key)
            .and_then(|binding| binding.rule_for(sub_key))
            .and_then(|name| self.rule(name))
    }

    /// All governed bundle keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}
