// src/attribute/mod.rs
//! Configurable attribute values
//!
//! An [`Attribute`] holds one value per (axis, key) pair plus a base value
//! filed under [`ConfigurationAxis::NoConfig`]. Resolvers populate it once per
//! configuration view of a module, derivation passes rewrite it in place and
//! the reducer in [`crate::reduce`] consumes it.
//!
//! Payloads:
//! - [`LabelListAttribute`] for sources and dependencies
//! - [`StringListAttribute`] for flags, includes and features
//! - [`BoolAttribute`], [`StringAttribute`] and [`LabelAttribute`] for scalars

mod label;

pub use label::{Label, LabelList};

use crate::axis::{CONDITIONS_DEFAULT, ConfigurationAxis, Os, ANDROID_IN_APEX, os_arch_key};
use std::collections::BTreeMap;
use std::fmt;
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("attribute could not be collapsed as it has two or more unrelated axes: {0}")]
    UnrelatedAxes(String),
}

/// A payload an [`Attribute`] can hold
pub trait AttrValue: Clone + Default + PartialEq + fmt::Debug {
    /// Whether the value means "no override"
    fn is_nil(&self) -> bool;
}

/// List payloads, which merge by concatenation
pub trait ListValue: AttrValue {
    fn append(&mut self, other: &Self);
    fn subtract(&self, other: &Self) -> Self;
    fn first_unique(&self) -> Self;
    fn is_empty(&self) -> bool;
    /// Record removed items as pending excludes, where the payload supports it
    fn mark_excluded(&mut self, _removed: &Self) {}
}

impl AttrValue for LabelList {
    fn is_nil(&self) -> bool {
        LabelList::is_nil(self)
    }
}

impl ListValue for LabelList {
    fn append(&mut self, other: &Self) {
        LabelList::append(self, other)
    }

    fn subtract(&self, other: &Self) -> Self {
        LabelList::subtract(self, other)
    }

    fn first_unique(&self) -> Self {
        LabelList::first_unique(self)
    }

    fn is_empty(&self) -> bool {
        LabelList::is_empty(self)
    }

    fn mark_excluded(&mut self, removed: &Self) {
        self.excludes.extend(removed.includes.iter().cloned());
    }
}

impl AttrValue for Vec<String> {
    fn is_nil(&self) -> bool {
        self.is_empty()
    }
}

impl ListValue for Vec<String> {
    fn append(&mut self, other: &Self) {
        self.extend(other.iter().cloned());
    }

    fn subtract(&self, other: &Self) -> Self {
        self.iter().filter(|s| !other.contains(s)).cloned().collect()
    }

    fn first_unique(&self) -> Self {
        first_unique_strings(self)
    }

    fn is_empty(&self) -> bool {
        <[String]>::is_empty(self)
    }
}

impl<T: Clone + PartialEq + fmt::Debug> AttrValue for Option<T> {
    fn is_nil(&self) -> bool {
        self.is_none()
    }
}

/// Keep the first occurrence of each string
pub fn first_unique_strings(items: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.iter().filter(|s| seen.insert(s.as_str())).cloned().collect()
}

/// A value that may differ per configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attribute<V> {
    value: V,
    configurable: BTreeMap<ConfigurationAxis, BTreeMap<String, V>>,
    /// Emit per-key branches even when they are empty
    pub emit_empty_list: bool,
    /// Render an explicit empty list instead of omitting the attribute
    pub force_specify_empty_list: bool,
    /// Per-axis contributions go before the base value
    pub prepend: bool,
}

pub type LabelListAttribute = Attribute<LabelList>;
pub type StringListAttribute = Attribute<Vec<String>>;
pub type BoolAttribute = Attribute<Option<bool>>;
pub type StringAttribute = Attribute<Option<String>>;
pub type LabelAttribute = Attribute<Option<Label>>;

impl<V: AttrValue> Attribute<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: V) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// The base value
    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn set_value(&mut self, value: V) {
        self.value = value;
    }

    /// Set the value for one (axis, key) pair
    ///
    /// A nil value removes the override. Panics on a key the axis does not
    /// recognize.
    pub fn set_select_value(&mut self, axis: &ConfigurationAxis, key: &str, value: V) {
        axis.validate_key(key);
        if *axis == ConfigurationAxis::NoConfig {
            self.value = value;
            return;
        }
        if value.is_nil() {
            if let Some(values) = self.configurable.get_mut(axis) {
                values.remove(key);
                if values.is_empty() {
                    self.configurable.remove(axis);
                }
            }
            return;
        }
        self.configurable
            .entry(axis.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// The value for one (axis, key) pair, or the nil value when unset
    pub fn select_value(&self, axis: &ConfigurationAxis, key: &str) -> V {
        axis.validate_key(key);
        if *axis == ConfigurationAxis::NoConfig {
            return self.value.clone();
        }
        self.get(axis, key).cloned().unwrap_or_default()
    }

    /// Borrow a configured value without falling back to the nil value
    pub fn get(&self, axis: &ConfigurationAxis, key: &str) -> Option<&V> {
        self.configurable.get(axis).and_then(|values| values.get(key))
    }

    pub fn has_configurable_values(&self) -> bool {
        !self.configurable.is_empty()
    }

    pub fn has_axis_specific_values(&self, axis: &ConfigurationAxis) -> bool {
        self.configurable.get(axis).is_some_and(|values| !values.is_empty())
    }

    /// Configured axes in precedence order
    pub fn axes(&self) -> impl Iterator<Item = &ConfigurationAxis> {
        self.configurable.keys()
    }

    /// Keys and values of one axis, sorted by key
    pub fn configurable_values(&self, axis: &ConfigurationAxis) -> Option<&BTreeMap<String, V>> {
        self.configurable.get(axis)
    }

    /// Every (axis, key, value) triple in precedence then key order
    pub fn entries(&self) -> impl Iterator<Item = (&ConfigurationAxis, &str, &V)> {
        self.configurable.iter().flat_map(|(axis, values)| {
            values.iter().map(move |(key, value)| (axis, key.as_str(), value))
        })
    }

    pub fn is_nil(&self) -> bool {
        self.value.is_nil() && self.configurable.is_empty()
    }

    fn remove_axis(&mut self, axis: &ConfigurationAxis) {
        self.configurable.remove(axis);
    }
}

impl<V: ListValue> Attribute<V> {
    /// Concatenate `other` into this attribute, key by key
    pub fn append(&mut self, other: &Attribute<V>) -> &mut Self {
        self.value.append(&other.value);
        for (axis, key, value) in other.entries() {
            let mut merged = self.select_value(axis, key);
            merged.append(value);
            self.set_select_value(axis, key, merged);
        }
        self.emit_empty_list |= other.emit_empty_list;
        self.force_specify_empty_list |= other.force_specify_empty_list;
        self
    }

    /// Remove `to_remove` from one (axis, key) value and record it as a
    /// pending exclude for [`Attribute::resolve_excludes`]
    pub fn exclude(&mut self, axis: &ConfigurationAxis, key: &str, to_remove: &V) {
        let mut value = self.select_value(axis, key).subtract(to_remove);
        value.mark_excluded(to_remove);
        self.set_select_value(axis, key, value);
    }

    /// Drop per-key items already present in the base value
    pub fn deduplicate_axes_from_base(&mut self) {
        let base = self.value.clone();
        for values in self.configurable.values_mut() {
            values.retain(|_, value| {
                *value = value.subtract(&base);
                !value.is_empty()
            });
        }
        self.configurable.retain(|_, values| !values.is_empty());
    }

    /// Apply first-unique to one (axis, key) value
    pub fn first_unique_at(&mut self, axis: &ConfigurationAxis, key: &str) {
        let value = self.select_value(axis, key).first_unique();
        self.set_select_value(axis, key, value);
    }

    /// Whether no configuration carries any item
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.configurable.values().flat_map(|v| v.values()).all(|v| v.is_empty())
    }
}

impl Attribute<LabelList> {
    /// Apply pending excludes across all axes
    ///
    /// Labels excluded by one key are removed from the base and re-added to
    /// every other key of that axis through its default branch, so each
    /// configuration still sees exactly the labels it saw before. Calling
    /// this again on a resolved attribute changes nothing.
    pub fn resolve_excludes(&mut self) {
        self.copy_os_excludes_into_apex_axis();

        let axes: Vec<ConfigurationAxis> = self.configurable.keys().cloned().collect();
        for axis in axes {
            let base_snapshot = self.value.clone();
            let Some(values) = self.configurable.get_mut(&axis) else {
                continue;
            };

            for labels in values.values_mut() {
                self.value = self.value.subtract(&LabelList::from_labels(labels.excludes.clone()));

                let mut all = base_snapshot.clone();
                all.append(labels);
                let mut resolved = all.subtract(&LabelList::from_labels(all.excludes.clone()));
                resolved.excludes.clear();
                *labels = resolved;
            }

            for labels in values.values_mut() {
                *labels = labels.subtract(&self.value);
            }

            let mut difference = base_snapshot.subtract(&self.value);
            difference.excludes.clear();
            let defaults = values.entry(CONDITIONS_DEFAULT.to_string()).or_default();
            defaults.append(&difference);
            *defaults = defaults.first_unique();
            if defaults.includes.is_empty() {
                values.remove(CONDITIONS_DEFAULT);
            }
            if values.is_empty() {
                self.configurable.remove(&axis);
            }
        }

        self.value.excludes.clear();
    }

    /// Non-android OS keys that exclude labels also need those excludes on
    /// the OS×APEX axis, starting from its default includes
    fn copy_os_excludes_into_apex_axis(&mut self) {
        let Some(apex_values) = self.configurable.get(&ConfigurationAxis::OsAndInApex) else {
            return;
        };
        let apex_defaults = apex_values
            .get(CONDITIONS_DEFAULT)
            .map(|l| l.includes.clone())
            .unwrap_or_default();

        let copies: Vec<(String, LabelList)> = self
            .configurable
            .get(&ConfigurationAxis::Os)
            .into_iter()
            .flatten()
            .filter(|(key, labels)| {
                key.as_str() != Os::Android.to_string()
                    && key.as_str() != CONDITIONS_DEFAULT
                    && !labels.excludes.is_empty()
            })
            .map(|(key, labels)| {
                let mut copy = LabelList::from_labels(apex_defaults.clone()).specified();
                copy.excludes = labels.excludes.clone();
                (key.clone(), copy)
            })
            .collect();

        if let Some(apex_values) = self.configurable.get_mut(&ConfigurationAxis::OsAndInApex) {
            apex_values.extend(copies);
        }
    }

    /// Split every value into labels matching `predicate` and the rest
    pub fn partition(&self, predicate: impl Fn(&Label) -> bool) -> (Self, Self) {
        let split = |list: &LabelList| {
            let (matched, rest): (Vec<Label>, Vec<Label>) =
                list.includes.iter().cloned().partition(|l| predicate(l));
            (LabelList::from_labels(matched), LabelList::from_labels(rest))
        };

        let mut matched = Self::new();
        let mut rest = Self::new();
        let (m, r) = split(&self.value);
        matched.value = m;
        rest.value = r;
        for (axis, key, list) in self.entries() {
            let (m, r) = split(list);
            matched.set_select_value(axis, key, m);
            rest.set_select_value(axis, key, r);
        }
        (matched, rest)
    }

    /// Append a single label wherever `label` has a value
    pub fn add_label(&mut self, label: &LabelAttribute) {
        if let Some(base) = label.value() {
            self.value.add(base.clone());
        }
        for (axis, key, value) in label.entries() {
            if let Some(l) = value {
                let mut list = self.select_value(axis, key);
                list.add(l.clone());
                self.set_select_value(axis, key, list);
            }
        }
    }
}

impl<T: Clone + PartialEq + fmt::Debug> Attribute<Option<T>> {
    /// Merge OS and arch values into OS×arch values
    ///
    /// A scalar can only be expressed with a single `select()`, so values
    /// spread over the OS and arch axes are rewritten onto the combined axis.
    /// Arch values win over OS values for the same OS×arch key. A product
    /// variable cannot be merged with any other axis.
    pub fn collapse(&mut self) -> Result<(), AttributeError> {
        let has = |axis: &ConfigurationAxis| self.configurable.contains_key(axis);
        let contains_os = has(&ConfigurationAxis::Os);
        let contains_arch = has(&ConfigurationAxis::Arch);
        let contains_os_arch = has(&ConfigurationAxis::OsArch);
        let contains_product_variable = self
            .configurable
            .keys()
            .any(|axis| matches!(axis, ConfigurationAxis::ProductVariable(_)));

        if contains_product_variable && (contains_os || contains_arch || contains_os_arch) {
            let axes: Vec<String> = self.configurable.keys().map(|a| a.to_string()).collect();
            return Err(AttributeError::UnrelatedAxes(axes.join(", ")));
        }

        let needs_merge =
            (contains_os && contains_arch) || (contains_os_arch && (contains_os || contains_arch));
        if !needs_merge {
            return Ok(());
        }

        for os in Os::iter() {
            for arch in os.arches() {
                let key = os_arch_key(os, *arch);
                if self.get(&ConfigurationAxis::OsArch, &key).is_some() {
                    continue;
                }
                let arch_value = self.get(&ConfigurationAxis::Arch, &arch.to_string()).cloned();
                let os_value = self.get(&ConfigurationAxis::Os, &os.to_string()).cloned();
                if let Some(value) = arch_value.or(os_value) {
                    self.set_select_value(&ConfigurationAxis::OsArch, &key, value);
                }
            }
        }
        self.remove_axis(&ConfigurationAxis::Arch);
        self.remove_axis(&ConfigurationAxis::Os);
        Ok(())
    }

    /// Convert to a string list, mapping every scalar through `convert`
    ///
    /// Without configured values the result is just the converted base.
    /// Otherwise each axis gets the converted values that differ from the
    /// converted base, and its default branch carries the converted base.
    pub fn to_string_list(
        &self,
        convert: impl Fn(Option<&T>, &ConfigurationAxis, &str) -> Vec<String>,
    ) -> Result<StringListAttribute, AttributeError> {
        let main = convert(self.value.as_ref(), &ConfigurationAxis::NoConfig, "");
        if !self.has_configurable_values() {
            return Ok(StringListAttribute::with_value(main));
        }

        let mut collapsed = self.clone();
        collapsed.collapse()?;

        let mut result = StringListAttribute::new();
        for (axis, values) in &collapsed.configurable {
            for (key, value) in values {
                let converted = convert(value.as_ref(), axis, key);
                if converted != main {
                    result.set_select_value(axis, key, converted);
                }
            }
            result.set_select_value(axis, CONDITIONS_DEFAULT, main.clone());
        }
        Ok(result)
    }
}

/// Whether a key on the OS×APEX axis belongs to the in-APEX android branch
pub fn is_android_in_apex(axis: &ConfigurationAxis, key: &str) -> bool {
    *axis == ConfigurationAxis::OsAndInApex && key == ANDROID_IN_APEX
}
