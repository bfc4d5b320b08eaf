// src/module/mod.rs

//! Legacy module definitions
//!
//! A module graph is a TOML or JSON document listing `[[module]]` entries.
//! Each module has a kind, a directory, top-level properties and optional
//! per-configuration blocks:
//!
//! ```toml
//! [[module]]
//! name = "libfoo"
//! kind = "cc_library"
//! srcs = ["foo.cpp"]
//!
//! [module.arch.arm]
//! srcs = ["foo_arm.S"]
//!
//! [module.target.linux_glibc]
//! shared_libs = ["libhost"]
//!
//! [module.target.apex]
//! exclude_shared_libs = ["libhost"]
//! ```

mod props;
mod views;

pub use props::{
    LexProps, LtoProps, SanitizeProps, StaticOrSharedProps, StripProps, VariantProps,
};
pub use views::{ApexExcludes, ConfiguredProps, configured_props, product_variable_props};

use crate::axis::{Arch, Os, multilib_arches, os_family, parse_os_arch};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Key of the `target` block that carries APEX-only excludes
pub const APEX_TARGET: &str = "apex";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    #[default]
    CcLibrary,
    CcLibraryStatic,
    CcLibraryShared,
    CcLibraryHeaders,
    CcBinary,
    CcPrebuiltLibraryStatic,
    CcPrebuiltLibraryShared,
    CcPrebuiltBinary,
    Filegroup,
}

impl ModuleKind {
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::CcBinary | Self::CcPrebuiltBinary)
    }

    pub fn is_prebuilt(&self) -> bool {
        matches!(
            self,
            Self::CcPrebuiltLibraryStatic | Self::CcPrebuiltLibraryShared | Self::CcPrebuiltBinary
        )
    }

    /// Compiled library kinds, which carry static/shared blocks and stubs
    pub fn is_library(&self) -> bool {
        matches!(
            self,
            Self::CcLibrary | Self::CcLibraryStatic | Self::CcLibraryShared
        )
    }

    /// Libraries re-export dependencies; executables never do
    pub fn exports_deps(&self) -> bool {
        !self.is_binary()
    }
}

/// Typed library a file group converts into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GroupLibrary {
    Proto,
    Aidl,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StubsProps {
    pub symbol_file: Option<String>,
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtoProps {
    /// Re-export generated proto headers to consumers
    pub export_proto_headers: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AidlProps {
    /// Re-export generated AIDL headers to consumers
    pub export_aidl_headers: Option<bool>,
}

/// One module of the legacy graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleDef {
    pub name: String,
    pub kind: ModuleKind,
    /// Package directory, relative to the source root
    pub dir: String,
    /// Set to false to leave the module unconverted
    pub convert: bool,
    pub apex_available: Vec<String>,
    pub min_sdk_version: Option<String>,
    pub stubs: Option<StubsProps>,
    /// For file groups: the typed library the group is converted into
    pub library: Option<GroupLibrary>,
    /// For file groups: import path prefix to strip
    pub path: Option<String>,
    pub proto: ProtoProps,
    pub aidl: AidlProps,

    #[serde(flatten)]
    pub props: VariantProps,

    pub arch: BTreeMap<String, VariantProps>,
    pub multilib: BTreeMap<String, VariantProps>,
    /// OS, OS family, `<os>_<arch>` and `apex` blocks
    pub target: BTreeMap<String, VariantProps>,
    pub product_variables: BTreeMap<String, VariantProps>,
}

impl Default for ModuleDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: ModuleKind::default(),
            dir: String::new(),
            convert: true,
            apex_available: Vec::new(),
            min_sdk_version: None,
            stubs: None,
            library: None,
            path: None,
            proto: ProtoProps::default(),
            aidl: AidlProps::default(),
            props: VariantProps::default(),
            arch: BTreeMap::new(),
            multilib: BTreeMap::new(),
            target: BTreeMap::new(),
            product_variables: BTreeMap::new(),
        }
    }
}

impl ModuleDef {
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// Check block keys so later passes only see legal configuration keys
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidGraph("module without a name".to_string()));
        }
        let invalid = |block: &str, key: &str| {
            Error::InvalidGraph(format!(
                "module {}: unknown {} key {:?}",
                self.name, block, key
            ))
        };
        for key in self.arch.keys() {
            if Arch::from_str(key).is_err() {
                return Err(invalid("arch", key));
            }
        }
        for key in self.multilib.keys() {
            if multilib_arches(key).is_none() {
                return Err(invalid("multilib", key));
            }
        }
        for key in self.target.keys() {
            let known = key == APEX_TARGET
                || Os::from_str(key).is_ok()
                || os_family(key).is_some()
                || parse_os_arch(key).is_some();
            if !known {
                return Err(invalid("target", key));
            }
        }
        for key in self.product_variables.keys() {
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(invalid("product_variables", key));
            }
        }
        Ok(())
    }

    /// Excludes that apply only when building for an APEX
    pub fn apex_excludes(&self) -> ApexExcludes {
        self.target
            .get(APEX_TARGET)
            .map(|apex| ApexExcludes {
                shared_libs: apex.exclude_shared_libs.clone(),
                static_libs: apex.exclude_static_libs.clone(),
            })
            .unwrap_or_default()
    }
}

/// A whole module graph as read from disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleGraph {
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDef>,
}

impl ModuleGraph {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let graph: ModuleGraph = toml::from_str(content)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let graph: ModuleGraph = serde_json::from_str(content)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Load a graph, picking the format from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(Error::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            module.validate()?;
            if !seen.insert(module.name.as_str()) {
                return Err(Error::InvalidGraph(format!(
                    "duplicate module name {:?}",
                    module.name
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDef> {
        self.modules.iter().find(|m| m.name == name)
    }
}
