// src/module/props.rs

//! Variant property blocks
//!
//! The same property set appears at the top level of a module and inside
//! every `arch`, `multilib`, `target` and `product_variables` block. A
//! missing property deserializes to its empty value, so blocks can be
//! merged field by field.

use serde::{Deserialize, Serialize};

/// Append lists, replace scalars that `other` sets
macro_rules! merge_fields {
    ($dst:expr, $src:expr; lists: [$($list:ident),* $(,)?]; scalars: [$($scalar:ident),* $(,)?]) => {
        $( $dst.$list.extend($src.$list.iter().cloned()); )*
        $( if $src.$scalar.is_some() { $dst.$scalar = $src.$scalar.clone(); } )*
    };
}

/// Properties that may vary per configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantProps {
    // Sources
    pub srcs: Vec<String>,
    pub exclude_srcs: Vec<String>,
    /// Modules producing sources, referenced by name
    pub generated_sources: Vec<String>,
    pub exclude_generated_sources: Vec<String>,
    /// Modules producing headers, referenced by name
    pub generated_headers: Vec<String>,
    pub export_generated_headers: Vec<String>,

    // Compiler
    pub cflags: Vec<String>,
    pub asflags: Vec<String>,
    pub conlyflags: Vec<String>,
    pub cppflags: Vec<String>,
    pub local_include_dirs: Vec<String>,
    pub include_dirs: Vec<String>,
    pub export_include_dirs: Vec<String>,
    pub export_system_include_dirs: Vec<String>,
    pub c_std: Option<String>,
    pub cpp_std: Option<String>,
    pub gnu_extensions: Option<bool>,
    pub include_build_directory: Option<bool>,
    pub instruction_set: Option<String>,
    pub rtti: Option<bool>,
    pub stl: Option<String>,
    pub lex: LexProps,

    // Linker
    pub whole_static_libs: Vec<String>,
    pub static_libs: Vec<String>,
    pub shared_libs: Vec<String>,
    pub header_libs: Vec<String>,
    pub runtime_libs: Vec<String>,
    pub exclude_static_libs: Vec<String>,
    pub exclude_shared_libs: Vec<String>,
    pub exclude_runtime_libs: Vec<String>,
    pub export_static_lib_headers: Vec<String>,
    pub export_shared_lib_headers: Vec<String>,
    pub export_header_lib_headers: Vec<String>,
    /// Unset means the platform defaults; an empty list means none
    pub system_shared_libs: Option<Vec<String>>,
    pub ldflags: Vec<String>,
    pub version_script: Option<String>,
    pub dynamic_list: Option<String>,
    pub use_version_lib: Option<bool>,
    pub pack_relocations: Option<bool>,
    pub allow_undefined_symbols: Option<bool>,
    pub nocrt: Option<bool>,
    pub no_libcrt: Option<bool>,
    pub static_executable: Option<bool>,
    pub strip: StripProps,

    // Features
    pub sanitize: SanitizeProps,
    pub lto: LtoProps,
    pub whole_program_vtables: Option<bool>,

    // Library
    pub enabled: Option<bool>,
    pub suffix: Option<String>,
    #[serde(rename = "static")]
    pub static_props: StaticOrSharedProps,
    pub shared: StaticOrSharedProps,
}

impl VariantProps {
    /// Merge a more specific block on top of this one
    pub fn merge(&mut self, other: &VariantProps) {
        merge_fields!(self, other;
            lists: [
                srcs, exclude_srcs, generated_sources, exclude_generated_sources,
                generated_headers, export_generated_headers,
                cflags, asflags, conlyflags, cppflags,
                local_include_dirs, include_dirs, export_include_dirs, export_system_include_dirs,
                whole_static_libs, static_libs, shared_libs, header_libs, runtime_libs,
                exclude_static_libs, exclude_shared_libs, exclude_runtime_libs,
                export_static_lib_headers, export_shared_lib_headers, export_header_lib_headers,
                ldflags,
            ];
            scalars: [
                c_std, cpp_std, gnu_extensions, include_build_directory, instruction_set, rtti, stl,
                version_script, dynamic_list, use_version_lib, pack_relocations,
                allow_undefined_symbols, nocrt, no_libcrt, static_executable,
                whole_program_vtables, enabled, suffix,
            ]
        );
        if let Some(libs) = &other.system_shared_libs {
            self.system_shared_libs
                .get_or_insert_with(Vec::new)
                .extend(libs.iter().cloned());
        }
        self.lex.flags.extend(other.lex.flags.iter().cloned());
        self.strip.merge(&other.strip);
        self.sanitize.merge(&other.sanitize);
        self.lto.merge(&other.lto);
        self.static_props.merge(&other.static_props);
        self.shared.merge(&other.shared);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexProps {
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripProps {
    pub keep_symbols: Option<bool>,
    pub keep_symbols_and_debug_frame: Option<bool>,
    pub keep_symbols_list: Vec<String>,
    pub all: Option<bool>,
    pub none: Option<bool>,
}

impl StripProps {
    fn merge(&mut self, other: &StripProps) {
        merge_fields!(self, other;
            lists: [keep_symbols_list];
            scalars: [keep_symbols, keep_symbols_and_debug_frame, all, none]
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeProps {
    pub integer_overflow: Option<bool>,
    pub misc_undefined: Vec<String>,
}

impl SanitizeProps {
    fn merge(&mut self, other: &SanitizeProps) {
        merge_fields!(self, other; lists: [misc_undefined]; scalars: [integer_overflow]);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LtoProps {
    pub thin: Option<bool>,
    pub never: Option<bool>,
}

impl LtoProps {
    fn merge(&mut self, other: &LtoProps) {
        merge_fields!(self, other; lists: []; scalars: [thin, never]);
    }
}

/// Properties that apply to only the static or only the shared flavor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticOrSharedProps {
    pub srcs: Vec<String>,
    pub cflags: Vec<String>,
    pub static_libs: Vec<String>,
    pub shared_libs: Vec<String>,
    pub whole_static_libs: Vec<String>,
    pub export_static_lib_headers: Vec<String>,
    pub export_shared_lib_headers: Vec<String>,
    pub system_shared_libs: Option<Vec<String>>,
    pub enabled: Option<bool>,
    pub apex_available: Vec<String>,
}

impl StaticOrSharedProps {
    fn merge(&mut self, other: &StaticOrSharedProps) {
        merge_fields!(self, other;
            lists: [
                srcs, cflags, static_libs, shared_libs, whole_static_libs,
                export_static_lib_headers, export_shared_lib_headers, apex_available,
            ];
            scalars: [enabled]
        );
        if let Some(libs) = &other.system_shared_libs {
            self.system_shared_libs
                .get_or_insert_with(Vec::new)
                .extend(libs.iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_appends_lists_and_overrides_scalars() {
        let mut base = VariantProps {
            srcs: strings(&["a.c"]),
            stl: Some("none".to_string()),
            rtti: Some(false),
            ..VariantProps::default()
        };
        let specific = VariantProps {
            srcs: strings(&["b.c"]),
            rtti: Some(true),
            ..VariantProps::default()
        };
        base.merge(&specific);
        assert_eq!(base.srcs, strings(&["a.c", "b.c"]));
        assert_eq!(base.rtti, Some(true));
        assert_eq!(base.stl.as_deref(), Some("none"));
    }

    #[test]
    fn test_merge_keeps_explicit_empty_system_libs() {
        let mut base = VariantProps::default();
        base.merge(&VariantProps {
            system_shared_libs: Some(Vec::new()),
            ..VariantProps::default()
        });
        assert_eq!(base.system_shared_libs, Some(Vec::new()));

        let mut unset = VariantProps::default();
        unset.merge(&VariantProps::default());
        assert_eq!(unset.system_shared_libs, None);
    }

    #[test]
    fn test_nested_blocks_merge() {
        let mut base: VariantProps = toml::from_str(
            r#"
            static = { cflags = ["-DSTATIC"] }
            lto = { thin = true }
            "#,
        )
        .unwrap();
        let other: VariantProps = toml::from_str(
            r#"
            static = { cflags = ["-DARM"] }
            lto = { never = true }
            "#,
        )
        .unwrap();
        base.merge(&other);
        assert_eq!(base.static_props.cflags, strings(&["-DSTATIC", "-DARM"]));
        assert_eq!(base.lto.thin, Some(true));
        assert_eq!(base.lto.never, Some(true));
    }
}
