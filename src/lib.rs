// src/lib.rs

//! ruleport
//!
//! Converts a graph of legacy build modules into build rules whose
//! configurable attributes are `select()` expressions over platform,
//! packaging and product-variable axes.
//!
//! # Architecture
//!
//! - Modules: typed module definitions loaded from TOML or JSON
//! - Axes: the configuration axes a value can vary on, and their select keys
//! - Attributes: one value per (axis, key) plus a base value
//! - Partitioning: sources split by language, dependencies by export
//! - Conversion: per-kind resolvers build attributes, then rules
//! - Reduction: attributes become a literal or a sum of selects

pub mod attribute;
pub mod axis;
pub mod convert;
pub mod deps;
mod error;
pub mod lookup;
pub mod module;
pub mod partition;
pub mod reduce;

pub use attribute::{
    Attribute, AttributeError, BoolAttribute, Label, LabelAttribute, LabelList,
    LabelListAttribute, StringAttribute, StringListAttribute,
};
pub use axis::{Configuration, ConfigurationAxis};
pub use convert::{
    ConversionError, ConversionOptions, ConversionReport, Converter, ModuleError, Rule, RuleKind,
    convert_module,
};
pub use error::{Error, Result};
pub use lookup::{ModuleIndex, ModuleInfo, SiblingLookup};
pub use module::{ModuleDef, ModuleGraph, ModuleKind};
pub use reduce::{ReduceError, Reduced, Value};
