// src/attribute/label.rs

//! Labels and label lists
//!
//! A label is the rendered reference (`:foo`, `//a/b:foo`, `src/x.c`). It may
//! remember the module name it was resolved from so later passes can ask the
//! sibling lookup about that module without holding on to it.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Label {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_module_name: Option<String>,
}

impl Label {
    /// A plain label, such as a source file path
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original_module_name: None,
        }
    }

    /// A label that refers to another module
    pub fn for_module(label: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original_module_name: Some(module.into()),
        }
    }

    /// Module name to use for sibling lookups
    ///
    /// Falls back to the label text with any leading `:` removed.
    pub fn module_name(&self) -> &str {
        match &self.original_module_name {
            Some(name) => name,
            None => self.label.trim_start_matches(':'),
        }
    }

    /// Same label with a suffix appended to the rendered text
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self {
            label: format!("{}{}", self.label, suffix),
            original_module_name: self.original_module_name.clone(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Included labels plus pending excludes
///
/// An unset list (`nil`) and an explicitly empty list are different values:
/// `system_shared_libs = []` means "link against nothing", while leaving it
/// out means "use the platform defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelList {
    pub includes: Vec<Label>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<Label>,
    #[serde(skip)]
    explicit: bool,
}

impl LabelList {
    /// The unset list
    pub fn nil() -> Self {
        Self::default()
    }

    /// An explicitly empty list
    pub fn empty() -> Self {
        Self {
            explicit: true,
            ..Self::default()
        }
    }

    /// A list of included labels; an empty input gives the unset list
    pub fn from_labels(includes: Vec<Label>) -> Self {
        Self {
            explicit: !includes.is_empty(),
            includes,
            excludes: Vec::new(),
        }
    }

    /// A list carrying only pending excludes
    pub fn excluding(excludes: Vec<Label>) -> Self {
        Self {
            explicit: !excludes.is_empty(),
            includes: Vec::new(),
            excludes,
        }
    }

    /// Mark an empty list as explicitly specified
    pub fn specified(mut self) -> Self {
        self.explicit = true;
        self
    }

    pub fn is_nil(&self) -> bool {
        !self.explicit && self.includes.is_empty() && self.excludes.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    pub fn add(&mut self, label: Label) {
        self.includes.push(label);
        self.explicit = true;
    }

    pub fn append(&mut self, other: &LabelList) {
        self.includes.extend(other.includes.iter().cloned());
        self.excludes.extend(other.excludes.iter().cloned());
        self.explicit |= other.explicit;
    }

    /// Remove `other`'s includes from this list's includes
    ///
    /// Pending excludes are carried over untouched. The result stays
    /// specified when this list was, so an emptied override is not mistaken
    /// for "no override".
    pub fn subtract(&self, other: &LabelList) -> LabelList {
        let needles: HashSet<&str> = other.includes.iter().map(|l| l.label.as_str()).collect();
        LabelList {
            includes: self
                .includes
                .iter()
                .filter(|l| !needles.contains(l.label.as_str()))
                .cloned()
                .collect(),
            excludes: self.excludes.clone(),
            explicit: !self.is_nil(),
        }
    }

    /// Keep the first occurrence of each label
    pub fn first_unique(&self) -> LabelList {
        LabelList {
            includes: first_unique_labels(&self.includes),
            excludes: first_unique_labels(&self.excludes),
            explicit: self.explicit,
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.includes.iter().any(|l| l.label == label)
    }

    /// Rendered include labels
    pub fn label_strings(&self) -> Vec<String> {
        self.includes.iter().map(|l| l.label.clone()).collect()
    }
}

impl FromIterator<Label> for LabelList {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        LabelList::from_labels(iter.into_iter().collect())
    }
}

fn first_unique_labels(labels: &[Label]) -> Vec<Label> {
    let mut seen = HashSet::new();
    labels
        .iter()
        .filter(|l| seen.insert(l.label.clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(names: &[&str]) -> LabelList {
        names.iter().map(|n| Label::new(*n)).collect()
    }

    #[test]
    fn test_nil_vs_empty() {
        assert!(LabelList::nil().is_nil());
        assert!(!LabelList::empty().is_nil());
        assert!(LabelList::empty().is_empty());
        assert!(LabelList::from_labels(vec![]).is_nil());
    }

    #[test]
    fn test_subtract_keeps_order_and_excludes() {
        let mut haystack = list(&[":a", ":b", ":c", ":b"]);
        haystack.excludes.push(Label::new(":x"));
        let result = haystack.subtract(&list(&[":b"]));
        assert_eq!(result.label_strings(), vec![":a", ":c"]);
        assert_eq!(result.excludes, vec![Label::new(":x")]);
    }

    #[test]
    fn test_subtract_to_empty_stays_specified() {
        let result = list(&[":a"]).subtract(&list(&[":a"]));
        assert!(result.is_empty());
        assert!(!result.is_nil());
        assert!(LabelList::nil().subtract(&list(&[":a"])).is_nil());
    }

    #[test]
    fn test_first_unique() {
        let result = list(&[":a", ":b", ":a", ":c", ":b"]).first_unique();
        assert_eq!(result.label_strings(), vec![":a", ":b", ":c"]);
    }

    #[test]
    fn test_append_preserves_explicitness() {
        let mut nil = LabelList::nil();
        nil.append(&LabelList::empty());
        assert!(!nil.is_nil());
    }

    #[test]
    fn test_module_name_fallback() {
        assert_eq!(Label::new(":libfoo").module_name(), "libfoo");
        assert_eq!(Label::for_module("//a:libfoo", "libfoo").module_name(), "libfoo");
        assert_eq!(
            Label::for_module(":fg", "fg").with_suffix("_c_srcs").module_name(),
            "fg"
        );
    }
}
