// src/convert/options.rs
//! Converter options
//!
//! Loaded from an optional TOML file. Every field has a default, so an empty
//! file (or no file at all) gives the stock behavior:
//!
//! ```toml
//! api_surface_prefix = "@api_surfaces//module-libapi/current:"
//! version_lib = "libbuildversion"
//! system_shared_libs = ["libc", "libm", "libdl"]
//! fail_fast = false
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Label prefix of API-surface stub libraries
    #[serde(default = "default_api_surface_prefix")]
    pub api_surface_prefix: String,

    /// Library linked in by `use_version_lib`
    #[serde(default = "default_version_lib")]
    pub version_lib: String,

    /// Baseline shared libraries every bionic module links by default
    #[serde(default = "default_system_shared_libs")]
    pub system_shared_libs: Vec<String>,

    /// System libraries musl hosts get when only bionic OSes override them
    #[serde(default = "default_musl_system_shared_libs")]
    pub musl_system_shared_libs: Vec<String>,

    /// Compiler flags clang does not understand, dropped from flag lists
    #[serde(default = "default_clang_unknown_cflags")]
    pub clang_unknown_cflags: Vec<String>,

    /// Whether relocation packing is on when a module does not say
    #[serde(default = "default_true")]
    pub pack_relocations_default: bool,

    /// Runtime library linked into generated lite proto libraries
    #[serde(default = "default_proto_runtime_lib")]
    pub proto_runtime_lib: String,

    /// Stop at the first module that fails instead of collecting every error
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_api_surface_prefix() -> String {
    "@api_surfaces//module-libapi/current:".to_string()
}

fn default_version_lib() -> String {
    "libbuildversion".to_string()
}

fn default_system_shared_libs() -> Vec<String> {
    vec!["libc".to_string(), "libm".to_string(), "libdl".to_string()]
}

fn default_musl_system_shared_libs() -> Vec<String> {
    vec!["libc_musl".to_string()]
}

fn default_clang_unknown_cflags() -> Vec<String> {
    [
        "-finline-functions",
        "-finline-limit=64",
        "-fno-canonical-system-headers",
        "-fno-tree-sra",
        "-fprefetch-loop-arrays",
        "-funswitch-loops",
        "-Werror=unused-but-set-parameter",
        "-Werror=unused-but-set-variable",
        "-Wmaybe-uninitialized",
        "-Wno-error=clobbered",
        "-Wno-error=maybe-uninitialized",
        "-Wno-extended-offsetof",
        "-Wno-free-nonheap-object",
        "-Wno-literal-suffix",
        "-Wno-maybe-uninitialized",
        "-Wno-old-style-declaration",
        "-Wno-unused-but-set-parameter",
        "-Wno-unused-but-set-variable",
        "-Wno-unused-local-typedefs",
        "-Wunused-but-set-parameter",
        "-Wunused-but-set-variable",
        "-fdiagnostics-color",
        "-mthumb-interwork",
        "-fgcse-after-reload",
        "-frerun-cse-after-loop",
        "-frename-registers",
        "-fno-strict-volatile-bitfields",
        "-fno-align-jumps",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_proto_runtime_lib() -> String {
    "libprotobuf-cpp-lite".to_string()
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            api_surface_prefix: default_api_surface_prefix(),
            version_lib: default_version_lib(),
            system_shared_libs: default_system_shared_libs(),
            musl_system_shared_libs: default_musl_system_shared_libs(),
            clang_unknown_cflags: default_clang_unknown_cflags(),
            pack_relocations_default: true,
            proto_runtime_lib: default_proto_runtime_lib(),
            fail_fast: false,
        }
    }
}

impl ConversionOptions {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a file, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?),
            None => Ok(Self::default()),
        }
    }

    pub fn is_system_shared_lib(&self, name: &str) -> bool {
        self.system_shared_libs.iter().any(|lib| lib == name)
    }
}
