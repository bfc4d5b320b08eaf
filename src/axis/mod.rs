// src/axis/mod.rs
//! Configuration axes and select keys
//!
//! Every configurable attribute value is filed under an (axis, key) pair.
//! The axis decides which family of `select()` conditions the key belongs
//! to; the key is one concrete configuration within that family.
//!
//! Axis ordering is the emission precedence: unconfigured values first, then
//! OS×arch, OS, arch, product variables, OS×APEX and finally APEX membership.

mod platform;

pub use platform::{
    Arch, OS_FAMILIES, Os, multilib_arches, os_arch_key, os_arch_keys, os_family, parse_os_arch,
};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Fallback key present on every configurable axis
pub const CONDITIONS_DEFAULT: &str = "conditions_default";

/// Condition label the fallback key renders to
pub const CONDITIONS_DEFAULT_LABEL: &str = "//conditions:default";

pub const IN_APEX: &str = "in_apex";
pub const NON_APEX: &str = "non_apex";
pub const ANDROID_IN_APEX: &str = "android-in_apex";
pub const ANDROID_NON_APEX: &str = "android-non_apex";

const ARCH_PREFIX: &str = "//build/bazel/platforms/arch:";
const OS_PREFIX: &str = "//build/bazel/platforms/os:";
const OS_ARCH_PREFIX: &str = "//build/bazel/platforms/os_arch:";
const PRODUCT_VARIABLE_PREFIX: &str = "//build/bazel/product_variables:";
const APEX_PREFIX: &str = "//build/bazel/rules/apex:";

/// A dimension along which an attribute value may vary
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationAxis {
    /// The base value, no condition
    NoConfig,
    OsArch,
    Os,
    Arch,
    /// One product variable; each variable is its own axis because several
    /// can be true in the same configuration
    ProductVariable(String),
    OsAndInApex,
    InApex,
}

impl ConfigurationAxis {
    pub fn product_variable(name: impl Into<String>) -> Self {
        Self::ProductVariable(name.into())
    }

    /// Whether `key` is a legal configuration key on this axis
    pub fn is_legal_key(&self, key: &str) -> bool {
        match self {
            Self::NoConfig => key.is_empty(),
            _ if key == CONDITIONS_DEFAULT => true,
            Self::Arch => Arch::from_str(key).is_ok(),
            Self::Os => Os::from_str(key).is_ok(),
            Self::OsArch => parse_os_arch(key).is_some(),
            Self::ProductVariable(name) => key == name,
            Self::OsAndInApex => {
                key == ANDROID_IN_APEX || key == ANDROID_NON_APEX || Os::from_str(key).is_ok()
            }
            Self::InApex => key == IN_APEX || key == NON_APEX,
        }
    }

    /// Check a key against this axis
    ///
    /// # Panics
    ///
    /// Panics when the key is not legal for the axis. Keys are produced by
    /// the converter itself, never by user input.
    pub fn validate_key(&self, key: &str) {
        if !self.is_legal_key(key) {
            panic!("invalid configuration key {:?} for axis {}", key, self);
        }
    }

    /// Render the `select()` condition label for a key on this axis
    pub fn select_key(&self, key: &str) -> String {
        self.validate_key(key);
        if key == CONDITIONS_DEFAULT {
            return CONDITIONS_DEFAULT_LABEL.to_string();
        }
        match self {
            Self::NoConfig => String::new(),
            Self::Arch => format!("{ARCH_PREFIX}{key}"),
            Self::Os => format!("{OS_PREFIX}{key}"),
            Self::OsArch => format!("{OS_ARCH_PREFIX}{key}"),
            Self::ProductVariable(_) => format!("{PRODUCT_VARIABLE_PREFIX}{key}"),
            Self::OsAndInApex if key == ANDROID_IN_APEX || key == ANDROID_NON_APEX => {
                format!("{APEX_PREFIX}{key}")
            }
            Self::OsAndInApex => format!("{OS_PREFIX}{key}"),
            Self::InApex => format!("{APEX_PREFIX}{key}"),
        }
    }

    /// Which key of this axis a concrete configuration selects, if any
    pub fn key_for(&self, config: &Configuration) -> Option<String> {
        match self {
            Self::NoConfig => Some(String::new()),
            Self::Arch => Some(config.arch.to_string()),
            Self::Os => Some(config.os.to_string()),
            Self::OsArch => Some(os_arch_key(config.os, config.arch)),
            Self::ProductVariable(name) => {
                config.product_variables.iter().any(|v| v == name).then(|| name.clone())
            }
            Self::OsAndInApex => Some(match (config.os, config.in_apex) {
                (Os::Android, true) => ANDROID_IN_APEX.to_string(),
                (Os::Android, false) => ANDROID_NON_APEX.to_string(),
                (os, _) => os.to_string(),
            }),
            Self::InApex => Some((if config.in_apex { IN_APEX } else { NON_APEX }).to_string()),
        }
    }
}

impl fmt::Display for ConfigurationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConfig => write!(f, "no_config"),
            Self::OsArch => write!(f, "os_arch"),
            Self::Os => write!(f, "os"),
            Self::Arch => write!(f, "arch"),
            Self::ProductVariable(name) => write!(f, "product_variable:{}", name),
            Self::OsAndInApex => write!(f, "os_and_in_apex"),
            Self::InApex => write!(f, "in_apex"),
        }
    }
}

/// One concrete build configuration, used to evaluate reduced expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub os: Os,
    pub arch: Arch,
    pub in_apex: bool,
    pub product_variables: Vec<String>,
}

impl Configuration {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self {
            os,
            arch,
            in_apex: false,
            product_variables: Vec::new(),
        }
    }

    pub fn in_apex(mut self) -> Self {
        self.in_apex = true;
        self
    }

    pub fn with_product_variable(mut self, name: impl Into<String>) -> Self {
        self.product_variables.push(name.into());
        self
    }

    /// Every OS/arch pair, inside and outside an APEX
    pub fn all() -> Vec<Configuration> {
        use strum::IntoEnumIterator;
        Os::iter()
            .flat_map(|os| os.arches().iter().map(move |arch| (os, *arch)))
            .flat_map(|(os, arch)| {
                [Configuration::new(os, arch), Configuration::new(os, arch).in_apex()]
            })
            .collect()
    }
}
