// src/convert/compiler.rs

//! Compiler attribute resolution
//!
//! Sources, flags, include paths, language standards, RTTI, STL and stub
//! declarations. Populated once per configuration view, then finalized:
//! source excludes are resolved and sources are partitioned by category.

use super::context::{DepFlavor, ModuleContext};
use super::ConversionError;
use crate::attribute::{
    BoolAttribute, LabelList, LabelListAttribute, StringAttribute, StringListAttribute,
    first_unique_strings,
};
use crate::axis::ConfigurationAxis;
use crate::module::{ConfiguredProps, VariantProps};
use crate::partition::{SrcCategory, partition_srcs};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static PRODUCT_VARIABLE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(d|s)").expect("static pattern"));

/// Include paths a library exports to its consumers
#[derive(Debug, Clone, Default)]
pub struct ExportedIncludes {
    pub absolute_includes: StringListAttribute,
    pub includes: StringListAttribute,
    pub system_includes: StringListAttribute,
}

#[derive(Debug, Clone, Default)]
pub struct CompilerAttributes {
    pub copts: StringListAttribute,
    pub as_flags: StringListAttribute,
    pub conly_flags: StringListAttribute,
    pub cpp_flags: StringListAttribute,
    pub lexopts: StringListAttribute,

    /// C++ sources, and everything no other category claims
    pub srcs: LabelListAttribute,
    pub c_srcs: LabelListAttribute,
    pub as_srcs: LabelListAttribute,
    pub asm_srcs: LabelListAttribute,
    pub l_srcs: LabelListAttribute,
    pub ll_srcs: LabelListAttribute,
    pub sysprop_srcs: LabelListAttribute,
    pub proto_srcs: LabelListAttribute,
    pub aidl_srcs: LabelListAttribute,
    pub hdrs: LabelListAttribute,

    pub rtti: BoolAttribute,

    // Not configurable
    pub stl: Option<String>,
    pub c_std: Option<String>,
    pub cpp_std: Option<String>,

    pub local_includes: StringListAttribute,
    pub absolute_includes: StringListAttribute,
    pub includes: ExportedIncludes,

    pub stubs_symbol_file: Option<String>,
    pub stubs_versions: StringListAttribute,

    pub features: StringListAttribute,
    pub suffix: StringAttribute,
}

/// Tokenize flag strings, dropping flags any filter rejects
///
/// A single flag string may hold several flags, such as
/// `-include header.h`.
pub fn parse_command_line_flags(flags: &[String], filters: &[&dyn Fn(&str) -> bool]) -> Vec<String> {
    flags
        .iter()
        .filter(|flag| !filters.iter().any(|filter| filter(flag)))
        .flat_map(|flag| flag.split(' '))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_std_flag(flag: &str) -> bool {
    flag.starts_with("-std=")
}

/// Language standard value, or `None` when the toolchain default applies
pub fn std_value(std: Option<&str>, prefix: &str, use_gnu: bool) -> Option<String> {
    let default = format!("{prefix}_std_default");
    let mut value = std.unwrap_or(&default).to_string();
    if value == "experimental" || value == default {
        if value == "experimental" {
            value = format!("{prefix}_std_experimental");
        }
        if !use_gnu {
            value.push_str("_no_gnu");
        }
    } else if !use_gnu {
        value = value.replace("gnu", "c");
    }
    (value != default).then_some(value)
}

/// C and C++ standard values for a module
pub fn resolve_std_values(
    c_std: Option<&str>,
    cpp_std: Option<&str>,
    gnu_extensions: Option<bool>,
) -> (Option<String>, Option<String>) {
    let use_gnu = gnu_extensions.unwrap_or(true);
    (std_value(c_std, "c", use_gnu), std_value(cpp_std, "cpp", use_gnu))
}

/// Package of a label and whether the label is fully qualified
///
/// `//a/b:foo` gives `a/b`; `:bar` gives `.`.
pub fn package_from_label(label: &str) -> Option<(String, bool)> {
    let (package, _) = label.split_once(':')?;
    if package.is_empty() {
        return Some((".".to_string(), false));
    }
    Some((package.trim_start_matches("//").to_string(), true))
}

/// Relative and absolute include directories for header labels
pub fn includes_from_label_list(labels: &LabelList) -> (Vec<String>, Vec<String>) {
    let mut relative = Vec::new();
    let mut absolute = Vec::new();
    for header in &labels.includes {
        match package_from_label(&header.label) {
            Some((package, true)) => absolute.push(package),
            Some((package, false)) => relative.push(package),
            None => {}
        }
    }
    (relative, absolute)
}

/// Replace `%s`/`%d` placeholders with a reference to the product variable
pub fn substitute_product_variable(flags: &[String], variable: &str) -> Vec<String> {
    let replacement = format!("$({variable})");
    flags
        .iter()
        .map(|flag| {
            PRODUCT_VARIABLE_PLACEHOLDER
                .replace_all(flag, NoExpand(&replacement))
                .into_owned()
        })
        .collect()
}

fn dedupe_stl(stl: &str) -> String {
    match stl {
        "c++_static" => "libc++_static",
        "c++_shared" => "libc++",
        "" => "none",
        other => other,
    }
    .to_string()
}

fn version_for_codename(version: &str) -> &str {
    match version {
        "R" => "30",
        "S" => "31",
        "Sv2" => "32",
        "Tiramisu" => "33",
        "UpsideDownCake" => "34",
        "VanillaIceCream" => "35",
        other => other,
    }
}

/// Stub versions with codenames resolved and `current` appended if absent
pub fn normalize_stub_versions(versions: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = versions
        .iter()
        .map(|v| version_for_codename(v).to_string())
        .collect();
    if !normalized.iter().any(|v| v == "current") {
        normalized.push("current".to_string());
    }
    normalized
}

impl CompilerAttributes {
    /// Resolve one configuration view
    pub fn convert_view(&mut self, ctx: &mut ModuleContext<'_>, view: &ConfiguredProps) {
        let (axis, key, props) = (&view.axis, view.key.as_str(), &view.props);

        if let Some(srcs) = parse_srcs(ctx, props) {
            self.srcs.set_select_value(axis, key, srcs);
        }

        let mut local_include_dirs = props.local_include_dirs.clone();
        if view.is_unconfigured() {
            (self.c_std, self.cpp_std) = resolve_std_values(
                props.c_std.as_deref(),
                props.cpp_std.as_deref(),
                props.gnu_extensions,
            );
            if props.include_build_directory.unwrap_or(true) {
                local_include_dirs.push(".".to_string());
            }
        }
        self.absolute_includes
            .set_select_value(axis, key, props.include_dirs.clone());
        self.local_includes.set_select_value(axis, key, local_include_dirs);

        match props.instruction_set.as_deref() {
            Some("arm") => self.features.set_select_value(
                axis,
                key,
                vec!["arm_isa_arm".to_string(), "-arm_isa_thumb".to_string()],
            ),
            None | Some("") | Some("thumb") => {}
            Some(other) => ctx.module_error(ConversionError::UnknownInstructionSet(other.to_string())),
        }

        let options = ctx.options;
        let unknown = |flag: &str| options.clang_unknown_cflags.iter().any(|f| f == flag);
        self.copts.set_select_value(
            axis,
            key,
            parse_command_line_flags(&props.cflags, &[&is_std_flag, &unknown]),
        );
        self.as_flags
            .set_select_value(axis, key, parse_command_line_flags(&props.asflags, &[]));
        self.conly_flags
            .set_select_value(axis, key, parse_command_line_flags(&props.conlyflags, &[&unknown]));
        self.cpp_flags
            .set_select_value(axis, key, parse_command_line_flags(&props.cppflags, &[&unknown]));
        self.rtti.set_select_value(axis, key, props.rtti);
        self.lexopts.set_select_value(axis, key, props.lex.flags.clone());

        if ctx.def.kind.is_library() {
            if view.is_unconfigured() {
                if let Some(stubs) = ctx.def.stubs.as_ref().filter(|s| s.symbol_file.is_some()) {
                    self.stubs_symbol_file = stubs.symbol_file.clone();
                    self.stubs_versions
                        .set_select_value(axis, key, normalize_stub_versions(&stubs.versions));
                }
            }
            self.suffix.set_select_value(axis, key, props.suffix.clone());
        }
    }

    /// Merge generated header dependencies of one view into headers and
    /// include paths
    pub fn add_generated_headers(
        &mut self,
        axis: &ConfigurationAxis,
        key: &str,
        export: &LabelList,
        implementation: &LabelList,
    ) {
        self.hdrs.set_select_value(axis, key, export.clone());

        let (export_relative, export_absolute) = includes_from_label_list(export);
        self.includes.includes.set_select_value(axis, key, export_relative);
        self.includes
            .absolute_includes
            .set_select_value(axis, key, export_absolute);

        let (relative, absolute) = includes_from_label_list(implementation);
        let mut current = self.absolute_includes.select_value(axis, key);
        current.extend(absolute);
        self.absolute_includes
            .set_select_value(axis, key, first_unique_strings(&current));

        let mut current = self.local_includes.select_value(axis, key);
        current.extend(relative);
        self.local_includes
            .set_select_value(axis, key, first_unique_strings(&current));
    }

    /// The first view that sets an STL wins; a different value elsewhere is
    /// an error
    pub fn convert_stl(&mut self, ctx: &mut ModuleContext<'_>, views: &[ConfiguredProps]) {
        for view in views {
            let Some(stl) = view.props.stl.as_deref() else {
                continue;
            };
            let stl = dedupe_stl(stl);
            match &self.stl {
                None => self.stl = Some(stl),
                Some(current) if *current != stl => {
                    ctx.module_error(ConversionError::StlMismatch {
                        first: current.clone(),
                        second: stl,
                    });
                }
                Some(_) => {}
            }
        }
    }

    /// Add exported include directories on top of generated-header includes
    pub fn convert_exported_includes(&mut self, views: &[ConfiguredProps]) {
        self.includes.includes.prepend = true;
        self.includes.system_includes.prepend = true;

        for view in views {
            let (axis, key, props) = (&view.axis, view.key.as_str(), &view.props);
            if !props.export_include_dirs.is_empty() {
                let mut dirs = self.includes.includes.select_value(axis, key);
                dirs.extend(props.export_include_dirs.iter().cloned());
                self.includes
                    .includes
                    .set_select_value(axis, key, first_unique_strings(&dirs));
            }
            if !props.export_system_include_dirs.is_empty() {
                let mut dirs = self.includes.system_includes.select_value(axis, key);
                dirs.extend(props.export_system_include_dirs.iter().cloned());
                self.includes
                    .system_includes
                    .set_select_value(axis, key, first_unique_strings(&dirs));
            }
        }
        self.includes.absolute_includes.deduplicate_axes_from_base();
        self.includes.includes.deduplicate_axes_from_base();
        self.includes.system_includes.deduplicate_axes_from_base();
    }

    pub fn convert_product_variables(&mut self, views: &[ConfiguredProps]) {
        for view in views {
            let ConfigurationAxis::ProductVariable(name) = &view.axis else {
                continue;
            };
            let props = &view.props;
            for (flags, attr) in [
                (&props.cflags, &mut self.copts),
                (&props.asflags, &mut self.as_flags),
                (&props.cppflags, &mut self.cpp_flags),
            ] {
                if !flags.is_empty() {
                    attr.set_select_value(&view.axis, &view.key, substitute_product_variable(flags, name));
                }
            }
        }
    }

    /// Resolve source excludes and split sources by category
    pub fn finalize(&mut self, ctx: &ModuleContext<'_>, implementation_hdrs: &LabelListAttribute) {
        self.srcs.resolve_excludes();
        let mut partitions = partition_srcs(ctx.lookup, &self.srcs);

        let mut take = |category: SrcCategory| partitions.remove(&category).unwrap_or_default();
        self.proto_srcs = take(SrcCategory::Proto);
        self.aidl_srcs = take(SrcCategory::Aidl);

        let mut with_headers = |category: SrcCategory| {
            let mut attr = take(category);
            if !attr.is_empty() {
                attr.append(implementation_hdrs);
            }
            attr
        };
        self.srcs = with_headers(SrcCategory::Cpp);
        self.c_srcs = with_headers(SrcCategory::C);
        self.as_srcs = with_headers(SrcCategory::As);
        self.asm_srcs = with_headers(SrcCategory::Asm);
        self.l_srcs = with_headers(SrcCategory::L);
        self.ll_srcs = with_headers(SrcCategory::Ll);
        self.sysprop_srcs = with_headers(SrcCategory::Sysprop);

        self.absolute_includes.deduplicate_axes_from_base();
        self.local_includes.deduplicate_axes_from_base();
    }
}

/// Sources of one view, or `None` when the view lists none
fn parse_srcs(ctx: &mut ModuleContext<'_>, props: &VariantProps) -> Option<LabelList> {
    let any_generated = !props.generated_sources.is_empty() || !props.exclude_generated_sources.is_empty();
    let any_srcs = !props.srcs.is_empty() || !props.exclude_srcs.is_empty();
    if !any_generated && !any_srcs {
        return None;
    }
    let mut srcs = ctx.src_labels(&props.srcs, &props.exclude_srcs);
    let generated = ctx.dep_labels_excludes(
        &props.generated_sources,
        &props.exclude_generated_sources,
        DepFlavor::Plain,
    );
    srcs.append(&generated);
    Some(srcs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags_splits_and_filters() {
        let flags = strings(&["-include header.h", "-std=c99", "-Wall"]);
        assert_eq!(
            parse_command_line_flags(&flags, &[&is_std_flag]),
            strings(&["-include", "header.h", "-Wall"])
        );
        assert_eq!(parse_command_line_flags(&flags, &[]).len(), 4);
    }

    #[test]
    fn test_std_values() {
        assert_eq!(resolve_std_values(None, None, None), (None, None));
        assert_eq!(
            resolve_std_values(None, None, Some(false)),
            (Some("c_std_default_no_gnu".to_string()), Some("cpp_std_default_no_gnu".to_string()))
        );
        assert_eq!(
            resolve_std_values(Some("gnu11"), Some("gnu++17"), Some(false)),
            (Some("c11".to_string()), Some("c++17".to_string()))
        );
        assert_eq!(
            std_value(Some("experimental"), "cpp", true),
            Some("cpp_std_experimental".to_string())
        );
        assert_eq!(std_value(Some("c++17"), "cpp", true), Some("c++17".to_string()));
    }

    #[test]
    fn test_includes_from_labels() {
        let labels = LabelList::from_labels(vec![
            crate::attribute::Label::new(":gen_hdr"),
            crate::attribute::Label::new("//other/pkg:gen"),
            crate::attribute::Label::new("plain.h"),
        ]);
        let (relative, absolute) = includes_from_label_list(&labels);
        assert_eq!(relative, strings(&["."]));
        assert_eq!(absolute, strings(&["other/pkg"]));
    }

    #[test]
    fn test_product_variable_substitution() {
        assert_eq!(
            substitute_product_variable(&strings(&["-DPLATFORM_SDK_VERSION=%d", "-Wall"]), "platform_sdk_version"),
            strings(&["-DPLATFORM_SDK_VERSION=$(platform_sdk_version)", "-Wall"])
        );
    }

    #[test]
    fn test_stub_versions() {
        assert_eq!(
            normalize_stub_versions(&strings(&["29", "R"])),
            strings(&["29", "30", "current"])
        );
        assert_eq!(
            normalize_stub_versions(&strings(&["current"])),
            strings(&["current"])
        );
    }

    #[test]
    fn test_dedupe_stl() {
        assert_eq!(dedupe_stl("c++_static"), "libc++_static");
        assert_eq!(dedupe_stl("none"), "none");
    }
}
