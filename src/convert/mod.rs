// src/convert/mod.rs

//! Module-to-rule conversion
//!
//! [`convert_module`] turns one legacy module into the rules that replace
//! it. [`Converter`] runs it over a whole graph, in parallel unless
//! `fail_fast` is set, and gathers the rules, the per-module errors and the
//! unresolved references into a [`ConversionReport`].
//!
//! Conversion of one module never touches another module's state: the only
//! shared input is the read-only [`SiblingLookup`].

mod base;
mod binary;
mod compiler;
mod context;
mod features;
mod filegroup;
mod generated;
mod library;
mod linker;
mod options;
mod prebuilt;
mod rules;

pub use context::{ALWAYSLINK_SUFFIX, DepFlavor, MISSING_DEP_SUFFIX, ModuleContext, STATIC_VARIANT_SUFFIX};
pub use options::ConversionOptions;
pub use rules::{Rule, RuleBuilder, RuleKind};

use crate::attribute::AttributeError;
use crate::lookup::{ModuleIndex, SiblingLookup};
use crate::module::{ModuleDef, ModuleGraph, ModuleKind};
use crate::reduce::ReduceError;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// A problem with one module's properties
///
/// Module errors never abort the batch; the module is reported as failed
/// and its rules are dropped.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("unknown value for instruction_set: {0}")]
    UnknownInstructionSet(String),

    #[error("lto.thin and lto.never are both set for {axis} {key}")]
    LtoConflict { axis: String, key: String },

    #[error("expected at most one source file for {axis} {key}")]
    MultipleSources { axis: String, key: String },

    #[error("conflicting stl values {first} and {second}")]
    StlMismatch { first: String, second: String },

    #[error("static_executable is only supported unconfigured, found on {axis} {key}")]
    VariantStaticExecutable { axis: String, key: String },

    #[error("static and shared blocks may not contain proto sources")]
    StaticOrSharedProtoSrcs,

    #[error("cannot reduce attribute {attribute}: {source}")]
    Reduce {
        attribute: String,
        #[source]
        source: ReduceError,
    },

    #[error("cannot convert LTO properties: {0}")]
    Lto(#[source] AttributeError),
}

/// All errors of one failed module
#[derive(Debug)]
pub struct ModuleError {
    pub module: String,
    pub errors: Vec<ConversionError>,
}

/// Output of one successfully converted module
#[derive(Debug, Clone, Default)]
pub struct ModuleConversion {
    pub rules: Vec<Rule>,
    /// Referenced module names absent from the graph
    pub missing_deps: BTreeSet<String>,
}

/// Convert one module into its rules
pub fn convert_module(
    def: &ModuleDef,
    lookup: &dyn SiblingLookup,
    options: &ConversionOptions,
) -> Result<ModuleConversion, Vec<ConversionError>> {
    let mut ctx = ModuleContext::new(def, lookup, options);
    let rules = match def.kind {
        ModuleKind::CcLibrary | ModuleKind::CcLibraryStatic | ModuleKind::CcLibraryShared => {
            library::library_rules(&mut ctx)
        }
        ModuleKind::CcLibraryHeaders => library::headers_rule(&mut ctx),
        ModuleKind::CcBinary => binary::binary_rules(&mut ctx),
        ModuleKind::CcPrebuiltLibraryStatic
        | ModuleKind::CcPrebuiltLibraryShared
        | ModuleKind::CcPrebuiltBinary => prebuilt::prebuilt_rules(&mut ctx),
        ModuleKind::Filegroup => filegroup::filegroup_rules(&mut ctx),
    };

    let (errors, missing_deps) = ctx.into_parts();
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ModuleConversion { rules, missing_deps })
}

/// Result of converting a graph
#[derive(Debug, Default, Serialize)]
pub struct ConversionReport {
    pub rules: Vec<Rule>,
    #[serde(skip)]
    pub errors: Vec<ModuleError>,
    /// Missing module name to the modules referencing it
    pub missing_deps: BTreeMap<String, BTreeSet<String>>,
    /// Modules marked `convert = false`
    pub skipped: Vec<String>,
    pub converted: usize,
}

impl ConversionReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn missing_dep_count(&self) -> usize {
        self.missing_deps.len()
    }

    fn record(&mut self, module: &str, result: Result<ModuleConversion, Vec<ConversionError>>) {
        match result {
            Ok(conversion) => {
                self.converted += 1;
                for dep in conversion.missing_deps {
                    self.missing_deps
                        .entry(dep)
                        .or_default()
                        .insert(module.to_string());
                }
                self.rules.extend(conversion.rules);
            }
            Err(errors) => self.errors.push(ModuleError {
                module: module.to_string(),
                errors,
            }),
        }
    }
}

pub struct Converter {
    options: ConversionOptions,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert every module of a graph
    ///
    /// Rules come out in graph order whether or not modules ran in parallel.
    /// With `fail_fast`, conversion stops at the first failing module.
    pub fn convert_graph(&self, graph: &ModuleGraph) -> ConversionReport {
        let index = ModuleIndex::from_graph(graph);
        let mut report = ConversionReport::default();

        let (modules, skipped): (Vec<&ModuleDef>, Vec<&ModuleDef>) =
            graph.modules.iter().partition(|def| def.convert);
        for def in skipped {
            debug!("Skipping {}: conversion disabled", def.name);
            report.skipped.push(def.name.clone());
        }

        info!("Converting {} modules", modules.len());
        if self.options.fail_fast {
            for def in modules {
                debug!("Converting {} ({})", def.name, def.kind);
                let result = convert_module(def, &index, &self.options);
                let failed = result.is_err();
                report.record(&def.name, result);
                if failed {
                    warn!("Stopping after first failure in {}", def.name);
                    break;
                }
            }
        } else {
            let results: Vec<_> = modules
                .par_iter()
                .map(|def| {
                    debug!("Converting {} ({})", def.name, def.kind);
                    convert_module(def, &index, &self.options)
                })
                .collect();
            for (def, result) in modules.iter().zip(results) {
                report.record(&def.name, result);
            }
        }

        for (dep, referrers) in &report.missing_deps {
            let referrers: Vec<&str> = referrers.iter().map(String::as_str).collect();
            warn!("Missing dependency {} referenced by {}", dep, referrers.join(", "));
        }
        info!(
            "Converted {} modules into {} rules ({} failed, {} missing dependencies)",
            report.converted,
            report.rules.len(),
            report.errors.len(),
            report.missing_dep_count()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(toml: &str) -> ModuleGraph {
        ModuleGraph::from_toml_str(toml).unwrap()
    }

    #[test]
    fn test_convert_graph_collects_rules_in_order() {
        let graph = graph(
            r#"
            [[module]]
            name = "libfoo"
            kind = "cc_library_static"
            srcs = ["foo.cpp"]

            [[module]]
            name = "tool"
            kind = "cc_binary"
            srcs = ["main.cpp"]
            static_libs = ["libfoo"]
            "#,
        );
        let report = Converter::new(ConversionOptions::default()).convert_graph(&graph);
        assert!(report.is_success());
        let names: Vec<&str> = report.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["libfoo", "tool"]);
        assert!(report.missing_deps.is_empty());
    }

    #[test]
    fn test_missing_deps_recorded_per_referrer() {
        let graph = graph(
            r#"
            [[module]]
            name = "tool"
            kind = "cc_binary"
            shared_libs = ["libgone"]
            "#,
        );
        let report = Converter::new(ConversionOptions::default()).convert_graph(&graph);
        assert!(report.is_success());
        assert_eq!(report.missing_dep_count(), 1);
        assert!(report.missing_deps["libgone"].contains("tool"));
    }

    #[test]
    fn test_skipped_and_failed_modules() {
        let graph = graph(
            r#"
            [[module]]
            name = "libskip"
            convert = false

            [[module]]
            name = "libbad"
            kind = "cc_library_static"
            lto = { thin = true, never = true }

            [[module]]
            name = "libgood"
            kind = "cc_library_static"
            "#,
        );
        let report = Converter::new(ConversionOptions::default()).convert_graph(&graph);
        assert_eq!(report.skipped, vec!["libskip".to_string()]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].module, "libbad");
        assert!(report.rules.iter().any(|r| r.name == "libgood"));
        assert!(report.rules.iter().all(|r| r.name != "libbad"));
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let graph = graph(
            r#"
            [[module]]
            name = "libbad"
            kind = "cc_library_static"
            lto = { thin = true, never = true }

            [[module]]
            name = "libgood"
            kind = "cc_library_static"
            "#,
        );
        let options = ConversionOptions {
            fail_fast: true,
            ..ConversionOptions::default()
        };
        let report = Converter::new(options).convert_graph(&graph);
        assert_eq!(report.errors.len(), 1);
        assert!(report.rules.is_empty());
    }
}
