// src/module/views.rs

//! Per-configuration property views
//!
//! Resolvers never read the raw blocks. They receive one merged property
//! set per (axis, key) pair, in axis precedence then key order:
//!
//! - the top level, on the unconfigured axis
//! - `target.<os>_<arch>` blocks
//! - OS family blocks expanded to their member OSes, then OS-specific blocks
//! - `arch` blocks, then `multilib` blocks expanded to their architectures
//!
//! Product variables are kept apart because their axes are applied after
//! the other views have been resolved.

use super::{ModuleDef, VariantProps};
use crate::axis::{ConfigurationAxis, OS_FAMILIES, Os, multilib_arches, os_family, parse_os_arch};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Names excluded from dependency lists when building for an APEX
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApexExcludes {
    pub shared_libs: Vec<String>,
    pub static_libs: Vec<String>,
}

impl ApexExcludes {
    pub fn is_empty(&self) -> bool {
        self.shared_libs.is_empty() && self.static_libs.is_empty()
    }
}

/// Merged properties for one (axis, key) pair
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguredProps {
    pub axis: ConfigurationAxis,
    pub key: String,
    pub props: VariantProps,
    /// Only set on the unconfigured view
    pub apex: ApexExcludes,
}

impl ConfiguredProps {
    fn new(axis: ConfigurationAxis, key: impl Into<String>, props: VariantProps) -> Self {
        Self {
            axis,
            key: key.into(),
            props,
            apex: ApexExcludes::default(),
        }
    }

    pub fn is_unconfigured(&self) -> bool {
        self.axis == ConfigurationAxis::NoConfig
    }
}

/// All non-product-variable views of a module
pub fn configured_props(def: &ModuleDef) -> Vec<ConfiguredProps> {
    let mut base = ConfiguredProps::new(ConfigurationAxis::NoConfig, "", def.props.clone());
    base.apex = def.apex_excludes();
    let mut views = vec![base];

    let mut os_arch: BTreeMap<String, VariantProps> = BTreeMap::new();
    let mut os: BTreeMap<String, VariantProps> = BTreeMap::new();
    let mut arch: BTreeMap<String, VariantProps> = BTreeMap::new();

    for (key, props) in &def.target {
        if parse_os_arch(key).is_some() {
            os_arch.entry(key.clone()).or_default().merge(props);
        }
    }

    for family in OS_FAMILIES {
        let (Some(props), Some(members)) = (def.target.get(*family), os_family(family)) else {
            continue;
        };
        for member in members {
            os.entry(member.to_string()).or_default().merge(props);
        }
    }
    for (key, props) in &def.target {
        if Os::from_str(key).is_ok() {
            os.entry(key.clone()).or_default().merge(props);
        }
    }

    for (key, props) in &def.arch {
        arch.entry(key.clone()).or_default().merge(props);
    }
    for (name, props) in &def.multilib {
        for member in multilib_arches(name).unwrap_or_default() {
            arch.entry(member.to_string()).or_default().merge(props);
        }
    }

    for (axis, values) in [
        (ConfigurationAxis::OsArch, os_arch),
        (ConfigurationAxis::Os, os),
        (ConfigurationAxis::Arch, arch),
    ] {
        views.extend(
            values
                .into_iter()
                .map(|(key, props)| ConfiguredProps::new(axis.clone(), key, props)),
        );
    }
    views
}

/// One view per product variable, keyed by the variable name
pub fn product_variable_props(def: &ModuleDef) -> Vec<ConfiguredProps> {
    def.product_variables
        .iter()
        .map(|(name, props)| {
            ConfiguredProps::new(ConfigurationAxis::product_variable(name), name.clone(), props.clone())
        })
        .collect()
}
