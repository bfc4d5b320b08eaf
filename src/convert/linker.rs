// src/convert/linker.rs

//! Linker and library attribute resolution
//!
//! Dependencies are resolved per configuration view: whole-archive, static,
//! shared, header, system and runtime libraries, each split into the part a
//! library re-exports and the part only it sees. Shared dependencies that
//! ship stubs are swapped for their API-surface stubs when building into an
//! APEX the dependency is not available to.

use super::compiler::parse_command_line_flags;
use super::context::{DepFlavor, ModuleContext};
use crate::attribute::{
    BoolAttribute, Label, LabelList, LabelListAttribute, StringListAttribute, first_unique_strings,
};
use crate::axis::{
    ANDROID_IN_APEX, ANDROID_NON_APEX, CONDITIONS_DEFAULT, ConfigurationAxis, IN_APEX, Os,
};
use crate::deps::{DepsPartition, partition_exported, partition_exported_excludes};
use crate::module::{ApexExcludes, ConfiguredProps};
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct StripAttributes {
    pub keep_symbols: BoolAttribute,
    pub keep_symbols_and_debug_frame: BoolAttribute,
    pub keep_symbols_list: StringListAttribute,
    pub all: BoolAttribute,
    pub none: BoolAttribute,
}

#[derive(Debug, Clone, Default)]
pub struct LinkerAttributes {
    pub deps: LabelListAttribute,
    pub implementation_deps: LabelListAttribute,
    pub dynamic_deps: LabelListAttribute,
    pub implementation_dynamic_deps: LabelListAttribute,
    pub runtime_deps: LabelListAttribute,
    pub whole_archive_deps: LabelListAttribute,
    pub implementation_whole_archive_deps: LabelListAttribute,
    pub system_dynamic_deps: LabelListAttribute,

    /// System libraries also listed as ordinary shared libraries
    used_system_dynamic_deps: BTreeSet<String>,

    pub linkopts: StringListAttribute,
    pub additional_linker_inputs: LabelListAttribute,
    pub use_version_lib: BoolAttribute,
    pub features: StringListAttribute,
    pub strip: StripAttributes,
}

fn escape_ninja(flag: &str) -> String {
    flag.replace('$', "$$")
}

/// Whether two availability lists name the same APEXes
pub fn available_to_same_apexes(a: &[String], b: &[String]) -> bool {
    if a.is_empty() && b.is_empty() {
        return true;
    }
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a == b
}

/// `system_shared_libs`: unset is nil, an explicit empty list stays empty
pub(super) fn system_libs_labels(ctx: &mut ModuleContext<'_>, libs: Option<&[String]>) -> LabelList {
    match libs {
        Some([]) => LabelList::empty(),
        Some(libs) => ctx.dep_labels(&first_unique_strings(libs), DepFlavor::Plain),
        None => LabelList::nil(),
    }
}

pub(super) fn log_ignored_exports(ctx: &ModuleContext<'_>, property: &str, partition: &DepsPartition) {
    for name in &partition.ignored_exports {
        warn!(
            "Module {}: {} lists {} which is not a dependency, ignoring",
            ctx.name(),
            property,
            name
        );
    }
}

impl LinkerAttributes {
    /// Resolve one configuration view
    pub fn convert_view(&mut self, ctx: &mut ModuleContext<'_>, view: &ConfiguredProps) {
        let (axis, key, props) = (&view.axis, view.key.as_str(), &view.props);
        let options = ctx.options;
        let exports_deps = ctx.exports_deps();

        let whole = first_unique_strings(&props.whole_static_libs);
        let mut static_libs: Vec<String> = first_unique_strings(&props.static_libs)
            .into_iter()
            .filter(|lib| !whole.contains(lib))
            .collect();

        if view.is_unconfigured() {
            self.use_version_lib.set_select_value(axis, key, props.use_version_lib);
            if props.use_version_lib == Some(true) {
                let version_lib = &options.version_lib;
                static_libs.retain(|lib| lib != version_lib);
                if !whole.contains(version_lib) {
                    if ctx.is_binary() {
                        static_libs.push(version_lib.clone());
                    } else {
                        let labels = ctx.dep_labels_excludes(
                            std::slice::from_ref(version_lib),
                            &props.exclude_static_libs,
                            DepFlavor::WholeStatic,
                        );
                        self.implementation_whole_archive_deps
                            .set_select_value(axis, key, labels);
                    }
                }
            }
        }

        let whole_labels = ctx.dep_labels_excludes(&whole, &props.exclude_static_libs, DepFlavor::WholeStatic);
        self.whole_archive_deps.set_select_value(axis, key, whole_labels);

        let static_deps = partition_exported_excludes(
            exports_deps,
            &static_libs,
            &props.exclude_static_libs,
            &props.export_static_lib_headers,
            |names, excludes| ctx.dep_labels_excludes(names, excludes, DepFlavor::Static),
        );
        log_ignored_exports(ctx, "export_static_lib_headers", &static_deps);

        let header_deps = partition_exported(
            exports_deps,
            &first_unique_strings(&props.header_libs),
            &props.export_header_lib_headers,
            |names| ctx.dep_labels(names, DepFlavor::Plain),
        );
        log_ignored_exports(ctx, "export_header_lib_headers", &header_deps);

        let mut deps = header_deps.export;
        deps.append(&static_deps.export);
        self.deps.set_select_value(axis, key, deps);
        let mut implementation_deps = header_deps.implementation;
        implementation_deps.append(&static_deps.implementation);
        self.implementation_deps.set_select_value(axis, key, implementation_deps);

        let system = system_libs_labels(ctx, props.system_shared_libs.as_deref());
        self.system_dynamic_deps.set_select_value(axis, key, system);

        let shared_libs = first_unique_strings(&props.shared_libs);
        self.used_system_dynamic_deps.extend(
            shared_libs
                .iter()
                .filter(|lib| options.is_system_shared_lib(lib) && !props.exclude_shared_libs.contains(*lib))
                .cloned(),
        );
        let shared_deps = partition_exported_excludes(
            exports_deps,
            &shared_libs,
            &props.exclude_shared_libs,
            &props.export_shared_lib_headers,
            |names, excludes| ctx.dep_labels_excludes(names, excludes, DepFlavor::Plain),
        );
        log_ignored_exports(ctx, "export_shared_lib_headers", &shared_deps);
        self.dynamic_deps.set_select_value(axis, key, shared_deps.export.clone());
        self.implementation_dynamic_deps
            .set_select_value(axis, key, shared_deps.implementation.clone());

        self.resolve_target_apex(ctx, &view.apex);

        let android: &str = Os::Android.into();
        if view.is_unconfigured() || (*axis == ConfigurationAxis::Os && key == android) {
            set_stubs(ctx, axis, key, &shared_deps.export, &mut self.dynamic_deps);
            set_stubs(ctx, axis, key, &shared_deps.implementation, &mut self.implementation_dynamic_deps);
        }

        let mut features = Vec::new();
        if !props.pack_relocations.unwrap_or(options.pack_relocations_default) {
            features.push("disable_pack_relocations".to_string());
        }
        if props.allow_undefined_symbols == Some(true) {
            features.push("-no_undefined_symbols".to_string());
        }

        let escaped: Vec<String> = props.ldflags.iter().map(|f| escape_ninja(f)).collect();
        let unknown = |flag: &str| options.clang_unknown_cflags.iter().any(|f| f == flag);
        // Matched against whole entries, before they are split on spaces
        if ctx.is_binary() && escaped.iter().any(|f| f == "-shared") {
            features.push("-static_flag".to_string());
        }
        let mut linkopts = parse_command_line_flags(&escaped, &[&unknown]);
        if props.no_libcrt == Some(true) {
            features.push("-use_libcrt".to_string());
        }
        if props.nocrt == Some(true) {
            features.push("-link_crt".to_string());
        }

        let mut linker_inputs = LabelList::nil();
        for (file, option) in [
            (&props.version_script, "--version-script"),
            (&props.dynamic_list, "--dynamic-list"),
        ] {
            if let Some(file) = file {
                let label = ctx.src_label(file);
                linkopts.push(format!("-Wl,{},$(location {})", option, label));
                linker_inputs.add(label);
            }
        }
        self.additional_linker_inputs.set_select_value(axis, key, linker_inputs);
        self.linkopts.set_select_value(axis, key, linkopts);

        if !features.is_empty() {
            self.features.set_select_value(axis, key, features);
        }

        let runtime = ctx.dep_labels_excludes(&props.runtime_libs, &props.exclude_runtime_libs, DepFlavor::Plain);
        if !runtime.includes.is_empty() {
            self.runtime_deps.set_select_value(axis, key, runtime);
        }
    }

    /// Dependencies dropped when building into an APEX
    fn resolve_target_apex(&mut self, ctx: &mut ModuleContext<'_>, apex: &ApexExcludes) {
        if apex.is_empty() {
            return;
        }
        let in_apex = ConfigurationAxis::InApex;
        if !apex.shared_libs.is_empty() {
            let excluded = ctx.dep_labels_excludes(&[], &apex.shared_libs, DepFlavor::Plain);
            for attr in [&mut self.dynamic_deps, &mut self.implementation_dynamic_deps] {
                let mut value = attr.select_value(&in_apex, IN_APEX);
                value.append(&excluded);
                attr.set_select_value(&in_apex, IN_APEX, value);
            }
        }
        if !apex.static_libs.is_empty() {
            let excluded = ctx.dep_labels_excludes(&[], &apex.static_libs, DepFlavor::Static);
            for attr in [&mut self.deps, &mut self.implementation_deps] {
                let mut value = attr.select_value(&in_apex, IN_APEX);
                value.append(&excluded);
                attr.set_select_value(&in_apex, IN_APEX, value);
            }
        }
    }

    pub fn convert_strip(&mut self, views: &[ConfiguredProps]) {
        for view in views {
            let (axis, key, strip) = (&view.axis, view.key.as_str(), &view.props.strip);
            self.strip.keep_symbols.set_select_value(axis, key, strip.keep_symbols);
            self.strip
                .keep_symbols_and_debug_frame
                .set_select_value(axis, key, strip.keep_symbols_and_debug_frame);
            self.strip
                .keep_symbols_list
                .set_select_value(axis, key, strip.keep_symbols_list.clone());
            self.strip.all.set_select_value(axis, key, strip.all);
            self.strip.none.set_select_value(axis, key, strip.none);
        }
    }

    /// Dependency lists toggled by product variables
    ///
    /// Header libraries land in the implementation dependencies after the
    /// static libraries so neither overwrites the other.
    pub fn convert_product_variables(&mut self, ctx: &mut ModuleContext<'_>, views: &[ConfiguredProps]) {
        let mut header_deps = LabelListAttribute::new();
        for view in views {
            let (axis, key, props) = (&view.axis, view.key.as_str(), &view.props);
            let no_excludes: &[String] = &[];
            let targets = [
                (&props.shared_libs, no_excludes, DepFlavor::Plain, &mut self.implementation_dynamic_deps),
                (&props.static_libs, &props.exclude_static_libs[..], DepFlavor::Static, &mut self.implementation_deps),
                (&props.whole_static_libs, &props.exclude_static_libs[..], DepFlavor::WholeStatic, &mut self.whole_archive_deps),
                (&props.header_libs, no_excludes, DepFlavor::Plain, &mut header_deps),
            ];
            for (includes, excludes, flavor, attr) in targets {
                if includes.is_empty() && excludes.is_empty() {
                    continue;
                }
                let labels = ctx.dep_labels_excludes(&first_unique_strings(includes), excludes, flavor);
                attr.emit_empty_list = true;
                attr.set_select_value(axis, key, labels);
            }
        }
        self.implementation_deps.append(&header_deps);
    }

    /// Drop system libraries listed as shared libraries where the platform
    /// already links them, then apply pending excludes
    pub fn finalize(&mut self, ctx: &mut ModuleContext<'_>) {
        if self.system_dynamic_deps.is_nil() && !self.used_system_dynamic_deps.is_empty() {
            let names: Vec<String> = self.used_system_dynamic_deps.iter().cloned().collect();
            let to_remove = ctx.dep_labels(&names, DepFlavor::Plain);
            let no_config = ConfigurationAxis::NoConfig;
            let os = ConfigurationAxis::Os;
            let android: &str = Os::Android.into();
            let linux_bionic: &str = Os::LinuxBionic.into();

            for attr in [&mut self.dynamic_deps, &mut self.implementation_dynamic_deps] {
                attr.exclude(&no_config, "", &to_remove);
                attr.exclude(&os, android, &to_remove);
                attr.exclude(&os, linux_bionic, &to_remove);
            }

            let os_apex = ConfigurationAxis::OsAndInApex;
            self.implementation_dynamic_deps
                .exclude(&os_apex, CONDITIONS_DEFAULT, &to_remove);
            self.implementation_dynamic_deps
                .exclude(&os_apex, ANDROID_NON_APEX, &to_remove);
            let stubs: LabelList = names
                .iter()
                .map(|name| Label::new(format!("{}{}", ctx.options.api_surface_prefix, name)))
                .collect();
            self.implementation_dynamic_deps
                .exclude(&os_apex, ANDROID_IN_APEX, &stubs);
        }

        self.deps.resolve_excludes();
        self.implementation_deps.resolve_excludes();
        self.dynamic_deps.resolve_excludes();
        self.implementation_dynamic_deps.resolve_excludes();
        self.whole_archive_deps.resolve_excludes();
        self.implementation_whole_archive_deps.resolve_excludes();
        self.system_dynamic_deps.force_specify_empty_list = true;
    }

    /// Give musl hosts their own system libraries when only other OSes
    /// override them
    pub fn add_musl_system_dynamic_deps(&mut self, ctx: &mut ModuleContext<'_>) {
        let os = ConfigurationAxis::Os;
        let musl: &str = Os::LinuxMusl.into();
        if !self.system_dynamic_deps.has_axis_specific_values(&os) || self.system_dynamic_deps.get(&os, musl).is_some() {
            return;
        }
        let libs = ctx.options.musl_system_shared_libs.clone();
        let labels = ctx.dep_labels(&libs, DepFlavor::Plain);
        self.system_dynamic_deps.set_select_value(&os, musl, labels);
    }
}

/// Replace shared dependencies that ship stubs with their stub libraries
/// on the in-APEX android branch
///
/// A dependency qualifies when its APEX availability differs from the
/// consumer's. Outside APEXes, and for the unconfigured view on every other
/// OS, the implementation library stays.
pub fn set_stubs(
    ctx: &ModuleContext<'_>,
    axis: &ConfigurationAxis,
    key: &str,
    dynamic_libs: &LabelList,
    target: &mut LabelListAttribute,
) {
    let consumer_apexes = &ctx.def.apex_available;
    let with_stubs: Vec<Label> = dynamic_libs
        .includes
        .iter()
        .filter(|label| {
            ctx.lookup
                .module_from_name(label.module_name())
                .is_some_and(|dep| {
                    dep.has_stub_variants()
                        && !available_to_same_apexes(consumer_apexes, dep.packaging_availability())
                })
        })
        .cloned()
        .collect();
    if with_stubs.is_empty() {
        return;
    }

    let with_stubs = LabelList::from_labels(with_stubs);
    target.set_select_value(axis, key, dynamic_libs.subtract(&with_stubs));

    let stub_labels: LabelList = with_stubs
        .includes
        .iter()
        .map(|label| Label::new(format!("{}{}", ctx.options.api_surface_prefix, label.module_name())))
        .collect();

    let os_apex = ConfigurationAxis::OsAndInApex;
    let mut keys = vec![(ANDROID_IN_APEX, &stub_labels), (ANDROID_NON_APEX, &with_stubs)];
    if *axis == ConfigurationAxis::NoConfig {
        keys.push((CONDITIONS_DEFAULT, &with_stubs));
    }
    for (apex_key, labels) in keys {
        let mut value = target.select_value(&os_apex, apex_key);
        value.append(labels);
        target.set_select_value(&os_apex, apex_key, value.first_unique());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConversionOptions;
    use crate::lookup::{ModuleIndex, ModuleInfo};
    use crate::module::{ModuleDef, ModuleGraph, ModuleKind, configured_props};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn convert(def: &ModuleDef, index: &ModuleIndex) -> LinkerAttributes {
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(def, index, &options);
        let mut linker = LinkerAttributes::default();
        for view in configured_props(def) {
            linker.convert_view(&mut ctx, &view);
        }
        linker.finalize(&mut ctx);
        linker
    }

    #[test]
    fn test_whole_archive_wins_tie() {
        let mut def = ModuleDef::new("libfoo", ModuleKind::CcLibraryStatic);
        def.props.whole_static_libs = strings(&["libx"]);
        def.props.static_libs = strings(&["libx", "liby"]);
        let linker = convert(&def, &ModuleIndex::new());

        assert_eq!(
            linker.whole_archive_deps.value().label_strings(),
            vec![":libx__BP2BUILD__MISSING__DEP"]
        );
        assert_eq!(
            linker.implementation_deps.value().label_strings(),
            vec![":liby__BP2BUILD__MISSING__DEP"]
        );
    }

    #[test]
    fn test_exported_static_libs() {
        let index: ModuleIndex = [
            ModuleInfo::new("liba", ModuleKind::CcLibraryStatic),
            ModuleInfo::new("libb", ModuleKind::CcLibraryStatic),
        ]
        .into_iter()
        .collect();
        let mut def = ModuleDef::new("libfoo", ModuleKind::CcLibraryShared);
        def.props.static_libs = strings(&["liba", "libb"]);
        def.props.export_static_lib_headers = strings(&["libb", "libmissing"]);
        let linker = convert(&def, &index);

        assert_eq!(linker.deps.value().label_strings(), vec![":libb"]);
        assert_eq!(linker.implementation_deps.value().label_strings(), vec![":liba"]);
    }

    #[test]
    fn test_binary_never_exports() {
        let index: ModuleIndex = [ModuleInfo::new("liba", ModuleKind::CcLibraryStatic)]
            .into_iter()
            .collect();
        let mut def = ModuleDef::new("app", ModuleKind::CcBinary);
        def.props.static_libs = strings(&["liba"]);
        def.props.export_static_lib_headers = strings(&["liba"]);
        let linker = convert(&def, &index);

        assert!(linker.deps.value().is_empty());
        assert_eq!(linker.implementation_deps.value().label_strings(), vec![":liba"]);
    }

    #[test]
    fn test_version_lib() {
        let index: ModuleIndex = [ModuleInfo::new("libbuildversion", ModuleKind::CcLibraryStatic)]
            .into_iter()
            .collect();
        let mut def = ModuleDef::new("libfoo", ModuleKind::CcLibraryShared);
        def.props.use_version_lib = Some(true);
        def.props.static_libs = strings(&["libbuildversion"]);
        let linker = convert(&def, &index);
        assert!(linker.implementation_deps.value().is_empty());
        assert_eq!(
            linker.implementation_whole_archive_deps.value().label_strings(),
            vec![":libbuildversion"]
        );

        let mut def = ModuleDef::new("app", ModuleKind::CcBinary);
        def.props.use_version_lib = Some(true);
        let linker = convert(&def, &index);
        assert_eq!(
            linker.implementation_deps.value().label_strings(),
            vec![":libbuildversion"]
        );
        assert!(linker.implementation_whole_archive_deps.is_empty());
    }

    #[test]
    fn test_system_shared_libs_nil_vs_empty() {
        let def = ModuleDef::new("libfoo", ModuleKind::CcLibraryShared);
        let linker = convert(&def, &ModuleIndex::new());
        assert!(linker.system_dynamic_deps.is_nil());
        assert!(linker.system_dynamic_deps.force_specify_empty_list);

        let mut def = ModuleDef::new("libfoo", ModuleKind::CcLibraryShared);
        def.props.system_shared_libs = Some(Vec::new());
        let linker = convert(&def, &ModuleIndex::new());
        assert!(!linker.system_dynamic_deps.is_nil());
        assert!(linker.system_dynamic_deps.value().is_empty());
    }

    #[test]
    fn test_used_system_libs_excluded_on_bionic() {
        let index: ModuleIndex = [ModuleInfo::new("libc", ModuleKind::CcLibrary)]
            .into_iter()
            .collect();
        let mut def = ModuleDef::new("libfoo", ModuleKind::CcLibraryShared);
        def.props.shared_libs = strings(&["libc"]);
        let linker = convert(&def, &index);

        let deps = &linker.implementation_dynamic_deps;
        assert!(deps.value().is_empty());
        assert!(deps.entries().all(|(_, _, labels)| !labels.contains(":libc")));
    }

    #[test]
    fn test_stubs_swapped_in_apex() {
        let index: ModuleIndex = [ModuleInfo::new("libbar", ModuleKind::CcLibraryShared)
            .with_stubs()
            .available_to(&["com.android.bar"])]
        .into_iter()
        .collect();
        let mut def = ModuleDef::new("libfoo", ModuleKind::CcLibraryShared);
        def.apex_available = strings(&["com.android.foo"]);
        def.props.shared_libs = strings(&["libbar"]);
        let linker = convert(&def, &index);

        let deps = &linker.implementation_dynamic_deps;
        let os_apex = ConfigurationAxis::OsAndInApex;
        assert!(deps.value().is_empty());
        assert_eq!(
            deps.get(&os_apex, ANDROID_IN_APEX).map(|l| l.label_strings()),
            Some(vec!["@api_surfaces//module-libapi/current:libbar".to_string()])
        );
        assert_eq!(
            deps.get(&os_apex, ANDROID_NON_APEX).map(|l| l.label_strings()),
            Some(vec![":libbar".to_string()])
        );
        assert_eq!(
            deps.get(&os_apex, CONDITIONS_DEFAULT).map(|l| l.label_strings()),
            Some(vec![":libbar".to_string()])
        );
    }

    #[test]
    fn test_same_apexes_keep_implementation() {
        let index: ModuleIndex = [ModuleInfo::new("libbar", ModuleKind::CcLibraryShared)
            .with_stubs()
            .available_to(&["com.android.foo"])]
        .into_iter()
        .collect();
        let mut def = ModuleDef::new("libfoo", ModuleKind::CcLibraryShared);
        def.apex_available = strings(&["com.android.foo"]);
        def.props.shared_libs = strings(&["libbar"]);
        let linker = convert(&def, &index);

        assert_eq!(
            linker.implementation_dynamic_deps.value().label_strings(),
            vec![":libbar"]
        );
        assert!(!linker
            .implementation_dynamic_deps
            .has_axis_specific_values(&ConfigurationAxis::OsAndInApex));
    }

    #[test]
    fn test_available_to_same_apexes() {
        assert!(available_to_same_apexes(&[], &[]));
        assert!(available_to_same_apexes(&strings(&["a", "b"]), &strings(&["b", "a"])));
        assert!(!available_to_same_apexes(&strings(&["a"]), &[]));
        assert!(!available_to_same_apexes(&strings(&["a"]), &strings(&["b"])));
    }

    #[test]
    fn test_linker_flags_and_features() {
        let graph = ModuleGraph::from_toml_str(
            r#"
            [[module]]
            name = "app"
            kind = "cc_binary"
            ldflags = ["-Wl,--gc-sections -shared", "-Wl,-rpath,$ORIGIN"]
            version_script = "app.map"
            pack_relocations = false
            nocrt = true
            "#,
        )
        .unwrap();
        let linker = convert(&graph.modules[0], &ModuleIndex::new());

        assert_eq!(
            linker.linkopts.value(),
            &strings(&[
                "-Wl,--gc-sections",
                "-shared",
                "-Wl,-rpath,$$ORIGIN",
                "-Wl,--version-script,$(location app.map)",
            ])
        );
        assert_eq!(
            linker.additional_linker_inputs.value().label_strings(),
            vec!["app.map"]
        );
        assert_eq!(
            linker.features.value(),
            &strings(&["disable_pack_relocations", "-link_crt"])
        );
    }

    #[test]
    fn test_static_flag_needs_standalone_shared_entry() {
        let graph = ModuleGraph::from_toml_str(
            r#"
            [[module]]
            name = "app"
            kind = "cc_binary"
            ldflags = ["-shared", "-Wl,--gc-sections"]

            [[module]]
            name = "libapp"
            kind = "cc_library_static"
            ldflags = ["-shared"]
            "#,
        )
        .unwrap();
        let index = ModuleIndex::new();

        let app = convert(&graph.modules[0], &index);
        assert_eq!(app.features.value(), &strings(&["-static_flag"]));
        assert_eq!(app.linkopts.value(), &strings(&["-shared", "-Wl,--gc-sections"]));

        let lib = convert(&graph.modules[1], &index);
        assert!(!lib.features.value().contains(&"-static_flag".to_string()));
    }

    #[test]
    fn test_musl_gets_own_system_libs() {
        let graph = ModuleGraph::from_toml_str(
            r#"
            [[module]]
            name = "libfoo"
            kind = "cc_library_shared"
            [module.target.linux_glibc]
            system_shared_libs = ["libc"]
            "#,
        )
        .unwrap();
        let def = &graph.modules[0];
        let index = ModuleIndex::new();
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(def, &index, &options);
        let mut linker = LinkerAttributes::default();
        for view in configured_props(def) {
            linker.convert_view(&mut ctx, &view);
        }
        linker.add_musl_system_dynamic_deps(&mut ctx);

        let musl = linker
            .system_dynamic_deps
            .get(&ConfigurationAxis::Os, "linux_musl")
            .map(|l| l.label_strings());
        assert_eq!(musl, Some(vec![":libc_musl__BP2BUILD__MISSING__DEP".to_string()]));
    }

    #[test]
    fn test_apex_excludes() {
        let index: ModuleIndex = [
            ModuleInfo::new("libbar", ModuleKind::CcLibraryShared),
            ModuleInfo::new("libbaz", ModuleKind::CcLibraryStatic),
        ]
        .into_iter()
        .collect();
        let graph = ModuleGraph::from_toml_str(
            r#"
            [[module]]
            name = "libfoo"
            kind = "cc_library_shared"
            shared_libs = ["libbar"]
            static_libs = ["libbaz"]
            [module.target.apex]
            exclude_shared_libs = ["libbar"]
            exclude_static_libs = ["libbaz"]
            "#,
        )
        .unwrap();
        let linker = convert(&graph.modules[0], &index);
        let in_apex = ConfigurationAxis::InApex;

        assert!(linker.implementation_dynamic_deps.value().is_empty());
        assert_eq!(
            linker
                .implementation_dynamic_deps
                .get(&in_apex, CONDITIONS_DEFAULT)
                .map(|l| l.label_strings()),
            Some(vec![":libbar".to_string()])
        );
        assert!(linker.implementation_deps.value().is_empty());
        assert_eq!(
            linker
                .implementation_deps
                .get(&in_apex, CONDITIONS_DEFAULT)
                .map(|l| l.label_strings()),
            Some(vec![":libbaz".to_string()])
        );
    }
}
