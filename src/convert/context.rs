// src/convert/context.rs

//! Per-module conversion context
//!
//! Holds the module being converted, the sibling lookup and the converter
//! options, and collects module errors and unresolved references while the
//! resolvers run. Every name-to-label resolution goes through here.

use super::{ConversionError, ConversionOptions};
use crate::attribute::{Label, LabelList};
use crate::lookup::SiblingLookup;
use crate::module::ModuleDef;
use std::collections::BTreeSet;

/// Appended to references that could not be resolved
pub const MISSING_DEP_SUFFIX: &str = "__BP2BUILD__MISSING__DEP";

/// Name of a full library's static flavor, relative to the shared one
pub const STATIC_VARIANT_SUFFIX: &str = "_bp2build_cc_library_static";

/// Appended to whole-archive references to prebuilt static archives
pub const ALWAYSLINK_SUFFIX: &str = "_alwayslink";

/// How a dependency is linked, which decides the label it resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepFlavor {
    /// Shared and header dependencies, and references to arbitrary modules
    Plain,
    Static,
    WholeStatic,
}

pub struct ModuleContext<'a> {
    pub def: &'a ModuleDef,
    pub lookup: &'a dyn SiblingLookup,
    pub options: &'a ConversionOptions,
    errors: Vec<ConversionError>,
    missing_deps: BTreeSet<String>,
}

impl<'a> ModuleContext<'a> {
    pub fn new(def: &'a ModuleDef, lookup: &'a dyn SiblingLookup, options: &'a ConversionOptions) -> Self {
        Self {
            def,
            lookup,
            options,
            errors: Vec::new(),
            missing_deps: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn is_binary(&self) -> bool {
        self.def.kind.is_binary()
    }

    pub fn exports_deps(&self) -> bool {
        self.def.kind.exports_deps()
    }

    /// Record a module error; conversion keeps going so all errors surface
    pub fn module_error(&mut self, error: ConversionError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Label of a target this module emits itself
    pub fn local_label(&self, suffix: &str) -> Label {
        Label::new(format!(":{}{}", self.def.name, suffix))
    }

    fn resolve(&mut self, name: &str, flavor: DepFlavor, record_missing: bool) -> Label {
        let Some(info) = self.lookup.module_from_name(name) else {
            if record_missing {
                self.missing_deps.insert(name.to_string());
            }
            return Label::for_module(format!(":{}{}", name, MISSING_DEP_SUFFIX), name);
        };

        let mut label = if info.dir == self.def.dir {
            format!(":{}", info.name)
        } else {
            format!("//{}:{}", info.dir, info.name)
        };
        if flavor != DepFlavor::Plain && info.is_full_library() {
            label.push_str(STATIC_VARIANT_SUFFIX);
        }
        if flavor == DepFlavor::WholeStatic && info.is_prebuilt() {
            label.push_str(ALWAYSLINK_SUFFIX);
        }
        Label::for_module(label, name)
    }

    /// Label of one referenced module
    pub fn dep_label(&mut self, name: &str, flavor: DepFlavor) -> Label {
        self.resolve(name, flavor, true)
    }

    pub fn dep_labels(&mut self, names: &[String], flavor: DepFlavor) -> LabelList {
        names.iter().map(|name| self.dep_label(name, flavor)).collect()
    }

    /// Labels for `names` minus `excludes`, with the excludes kept pending
    pub fn dep_labels_excludes(&mut self, names: &[String], excludes: &[String], flavor: DepFlavor) -> LabelList {
        let kept: Vec<String> = names.iter().filter(|n| !excludes.contains(n)).cloned().collect();
        let mut labels = self.dep_labels(&kept, flavor);
        labels.excludes = excludes
            .iter()
            .map(|name| self.resolve(name, flavor, false))
            .collect();
        labels
    }

    /// Label of a source path or `:module` reference
    pub fn src_label(&mut self, src: &str) -> Label {
        match src.strip_prefix(':') {
            Some(module) => self.dep_label(module, DepFlavor::Plain),
            None => Label::new(src),
        }
    }

    /// Labels for sources minus excluded sources, with the excludes kept
    /// pending so they also apply to sources listed in other configurations
    pub fn src_labels(&mut self, srcs: &[String], excludes: &[String]) -> LabelList {
        let mut labels: LabelList = srcs
            .iter()
            .filter(|s| !excludes.contains(s))
            .map(|s| self.src_label(s))
            .collect();
        labels.excludes = excludes
            .iter()
            .map(|s| match s.strip_prefix(':') {
                Some(module) => self.resolve(module, DepFlavor::Plain, false),
                None => Label::new(s.as_str()),
            })
            .collect();
        labels
    }

    pub fn into_parts(self) -> (Vec<ConversionError>, BTreeSet<String>) {
        (self.errors, self.missing_deps)
    }
}
