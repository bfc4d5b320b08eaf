// src/convert/library.rs

//! Library rules
//!
//! A full library becomes a static and a shared rule; the static one is
//! named with [`STATIC_VARIANT_SUFFIX`] so dependents can address either.
//! Each flavor merges the shared base attributes with its own `static` or
//! `shared` block.

use super::ConversionError;
use super::base::{BaseAttributes, parse_base};
use super::compiler::parse_command_line_flags;
use super::context::{DepFlavor, ModuleContext, STATIC_VARIANT_SUFFIX};
use super::generated::add_label;
use super::linker::system_libs_labels;
use super::rules::{Rule, RuleBuilder, RuleKind};
use crate::attribute::{
    Attribute, BoolAttribute, LabelListAttribute, ListValue, StringListAttribute,
};
use crate::deps::partition_exported;
use crate::module::{ConfiguredProps, ModuleKind, StaticOrSharedProps, VariantProps, configured_props};
use crate::partition::{SrcCategory, partition_srcs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Static,
    Shared,
}

impl Flavor {
    fn block(self, props: &VariantProps) -> &StaticOrSharedProps {
        match self {
            Self::Static => &props.static_props,
            Self::Shared => &props.shared,
        }
    }
}

/// Attributes from a `static` or `shared` block
#[derive(Debug, Clone, Default)]
pub struct StaticOrSharedAttributes {
    pub srcs: LabelListAttribute,
    pub srcs_c: LabelListAttribute,
    pub srcs_as: LabelListAttribute,
    pub copts: StringListAttribute,
    pub deps: LabelListAttribute,
    pub implementation_deps: LabelListAttribute,
    pub dynamic_deps: LabelListAttribute,
    pub implementation_dynamic_deps: LabelListAttribute,
    pub whole_archive_deps: LabelListAttribute,
    pub system_dynamic_deps: LabelListAttribute,
    pub enabled: BoolAttribute,
    pub apex_available: Vec<String>,
}

fn is_std_flag(flag: &str) -> bool {
    flag.starts_with("-std=")
}

pub fn parse_static_or_shared(
    ctx: &mut ModuleContext<'_>,
    views: &[ConfiguredProps],
    flavor: Flavor,
) -> StaticOrSharedAttributes {
    let mut attrs = StaticOrSharedAttributes::default();
    let mut srcs = LabelListAttribute::new();

    for view in views {
        let (axis, key) = (&view.axis, view.key.as_str());
        let block = flavor.block(&view.props);

        attrs
            .copts
            .set_select_value(axis, key, parse_command_line_flags(&block.cflags, &[&is_std_flag]));
        srcs.set_select_value(axis, key, ctx.src_labels(&block.srcs, &[]));
        let system = system_libs_labels(ctx, block.system_shared_libs.as_deref());
        attrs.system_dynamic_deps.set_select_value(axis, key, system);

        let static_deps = partition_exported(
            true,
            &block.static_libs,
            &block.export_static_lib_headers,
            |names| ctx.dep_labels(names, DepFlavor::Static),
        );
        attrs.deps.set_select_value(axis, key, static_deps.export);
        attrs
            .implementation_deps
            .set_select_value(axis, key, static_deps.implementation);

        let shared_deps = partition_exported(
            true,
            &block.shared_libs,
            &block.export_shared_lib_headers,
            |names| ctx.dep_labels(names, DepFlavor::Plain),
        );
        attrs.dynamic_deps.set_select_value(axis, key, shared_deps.export);
        attrs
            .implementation_dynamic_deps
            .set_select_value(axis, key, shared_deps.implementation);

        let whole = ctx.dep_labels(&block.whole_static_libs, DepFlavor::WholeStatic);
        attrs.whole_archive_deps.set_select_value(axis, key, whole);
        attrs.enabled.set_select_value(axis, key, block.enabled);

        if view.is_unconfigured() {
            attrs.apex_available = block.apex_available.clone();
        }
    }
    attrs.system_dynamic_deps.force_specify_empty_list = true;

    let mut partitions = partition_srcs(ctx.lookup, &srcs);
    let mut take = |category: SrcCategory| partitions.remove(&category).unwrap_or_default();
    if !take(SrcCategory::Proto).is_empty() {
        ctx.module_error(ConversionError::StaticOrSharedProtoSrcs);
    }
    attrs.srcs = take(SrcCategory::Cpp);
    attrs.srcs_c = take(SrcCategory::C);
    attrs.srcs_as = take(SrcCategory::As);
    attrs
}

fn merged<V: ListValue>(a: &Attribute<V>, b: &Attribute<V>) -> Attribute<V> {
    let mut merged = a.clone();
    merged.append(b);
    merged
}

fn library_rule(
    ctx: &mut ModuleContext<'_>,
    name: String,
    flavor: Flavor,
    base: &BaseAttributes,
    block: &StaticOrSharedAttributes,
) -> Rule {
    let def = ctx.def;
    let (compiler, linker) = (&base.compiler, &base.linker);

    let mut deps = merged(&linker.deps, &block.deps);
    let mut implementation_deps = merged(&linker.implementation_deps, &block.implementation_deps);
    let mut dynamic_deps = merged(&linker.dynamic_deps, &block.dynamic_deps);
    let mut implementation_dynamic_deps =
        merged(&linker.implementation_dynamic_deps, &block.implementation_dynamic_deps);

    let proto_exported = base.proto.whole_archive.is_some();
    let runtime = base.proto.runtime.clone();
    match (flavor, proto_exported) {
        (Flavor::Static, true) => add_label(&mut deps, runtime),
        (Flavor::Static, false) => add_label(&mut implementation_deps, runtime),
        (Flavor::Shared, true) => add_label(&mut dynamic_deps, runtime),
        (Flavor::Shared, false) => add_label(&mut implementation_dynamic_deps, runtime),
    }

    let kind = match flavor {
        Flavor::Static => RuleKind::CcLibraryStatic,
        Flavor::Shared => RuleKind::CcLibraryShared,
    };
    let tags = if block.apex_available.is_empty() {
        &def.apex_available
    } else {
        &block.apex_available
    };

    let mut builder = RuleBuilder::new(kind, name)
        .attr("srcs", &merged(&compiler.srcs, &block.srcs))
        .attr("srcs_c", &merged(&compiler.c_srcs, &block.srcs_c))
        .attr("srcs_as", &merged(&compiler.as_srcs, &block.srcs_as))
        .attr("copts", &merged(&compiler.copts, &block.copts))
        .attr("conlyflags", &compiler.conly_flags)
        .attr("cppflags", &compiler.cpp_flags)
        .attr("asflags", &compiler.as_flags)
        .attr("hdrs", &compiler.hdrs)
        .attr("local_includes", &compiler.local_includes)
        .attr("absolute_includes", &compiler.absolute_includes)
        .attr("export_includes", &compiler.includes.includes)
        .attr("export_absolute_includes", &compiler.includes.absolute_includes)
        .attr("export_system_includes", &compiler.includes.system_includes)
        .attr("deps", &deps)
        .attr("implementation_deps", &implementation_deps)
        .attr("dynamic_deps", &dynamic_deps)
        .attr("implementation_dynamic_deps", &implementation_dynamic_deps)
        .attr("whole_archive_deps", &merged(&linker.whole_archive_deps, &block.whole_archive_deps))
        .attr("implementation_whole_archive_deps", &linker.implementation_whole_archive_deps)
        .attr("system_dynamic_deps", &merged(&linker.system_dynamic_deps, &block.system_dynamic_deps))
        .attr("runtime_deps", &linker.runtime_deps)
        .attr("rtti", &compiler.rtti)
        .string("stl", compiler.stl.as_deref())
        .string("c_std", compiler.c_std.as_deref())
        .string("cpp_std", compiler.cpp_std.as_deref())
        .attr("features", &base.features)
        .attr("use_version_lib", &linker.use_version_lib)
        .attr("enabled", &block.enabled);

    if flavor == Flavor::Shared {
        let strip = &linker.strip;
        builder = builder
            .attr("linkopts", &linker.linkopts)
            .attr("additional_linker_inputs", &linker.additional_linker_inputs)
            .attr("strip_keep_symbols", &strip.keep_symbols)
            .attr("strip_keep_symbols_and_debug_frame", &strip.keep_symbols_and_debug_frame)
            .attr("strip_keep_symbols_list", &strip.keep_symbols_list)
            .attr("strip_all", &strip.all)
            .attr("strip_none", &strip.none)
            .string("stubs_symbol_file", compiler.stubs_symbol_file.as_deref())
            .attr("stubs_versions", &compiler.stubs_versions)
            .attr("suffix", &compiler.suffix);
    }

    builder
        .string("min_sdk_version", def.min_sdk_version.as_deref())
        .tags(tags)
        .build(ctx)
}

/// Rules for a compiled library kind
pub fn library_rules(ctx: &mut ModuleContext<'_>) -> Vec<Rule> {
    let def = ctx.def;
    let mut rules = Vec::new();
    let base = parse_base(ctx, &mut rules);
    let views = configured_props(def);

    let flavors = match def.kind {
        ModuleKind::CcLibraryStatic => vec![(Flavor::Static, def.name.clone())],
        ModuleKind::CcLibraryShared => vec![(Flavor::Shared, def.name.clone())],
        _ => vec![
            (Flavor::Static, format!("{}{}", def.name, STATIC_VARIANT_SUFFIX)),
            (Flavor::Shared, def.name.clone()),
        ],
    };
    for (flavor, name) in flavors {
        let block = parse_static_or_shared(ctx, &views, flavor);
        let rule = library_rule(ctx, name, flavor, &base, &block);
        rules.push(rule);
    }
    rules
}

/// Rule for a header-only library
pub fn headers_rule(ctx: &mut ModuleContext<'_>) -> Vec<Rule> {
    let def = ctx.def;
    let mut rules = Vec::new();
    let base = parse_base(ctx, &mut rules);
    let (compiler, linker) = (&base.compiler, &base.linker);

    let rule = RuleBuilder::new(RuleKind::CcLibraryHeaders, def.name.clone())
        .attr("export_includes", &compiler.includes.includes)
        .attr("export_absolute_includes", &compiler.includes.absolute_includes)
        .attr("export_system_includes", &compiler.includes.system_includes)
        .attr("deps", &linker.deps)
        .attr("system_dynamic_deps", &linker.system_dynamic_deps)
        .attr("hdrs", &compiler.hdrs)
        .string("min_sdk_version", def.min_sdk_version.as_deref())
        .tags(&def.apex_available)
        .build(ctx);
    rules.push(rule);
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConversionOptions;
    use crate::lookup::{ModuleIndex, ModuleInfo};
    use crate::module::ModuleGraph;

    fn convert(toml: &str, index: &ModuleIndex) -> (Vec<Rule>, bool) {
        let graph = ModuleGraph::from_toml_str(toml).unwrap();
        let def = &graph.modules[0];
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(def, index, &options);
        let rules = library_rules(&mut ctx);
        (rules, ctx.has_errors())
    }

    #[test]
    fn test_full_library_emits_both_flavors() {
        let (rules, errors) = convert(
            r#"
            [[module]]
            name = "libfoo"
            srcs = ["foo.cpp"]
            [module.static]
            srcs = ["static_only.c"]
            [module.shared]
            cflags = ["-DSHARED", "-std=c++17"]
            "#,
            &ModuleIndex::new(),
        );
        assert!(!errors);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "libfoo_bp2build_cc_library_static");
        assert_eq!(rules[0].kind, RuleKind::CcLibraryStatic);
        assert_eq!(
            rules[0].attr("srcs_c").map(|r| r.to_string()),
            Some(r#"["static_only.c"]"#.to_string())
        );
        assert!(rules[1].attr("srcs_c").is_none());
        assert_eq!(rules[1].name, "libfoo");
        assert_eq!(
            rules[1].attr("copts").map(|r| r.to_string()),
            Some(r#"["-DSHARED"]"#.to_string())
        );
    }

    #[test]
    fn test_block_proto_sources_rejected() {
        let (_, errors) = convert(
            r#"
            [[module]]
            name = "libfoo"
            [module.static]
            srcs = ["foo.proto"]
            "#,
            &ModuleIndex::new(),
        );
        assert!(errors);
    }

    #[test]
    fn test_block_exports() {
        let index: ModuleIndex = [
            ModuleInfo::new("liba", ModuleKind::CcLibraryStatic),
            ModuleInfo::new("libb", ModuleKind::CcLibraryShared),
        ]
        .into_iter()
        .collect();
        let (rules, _) = convert(
            r#"
            [[module]]
            name = "libfoo"
            kind = "cc_library_shared"
            [module.shared]
            static_libs = ["liba"]
            export_static_lib_headers = ["liba"]
            shared_libs = ["libb"]
            "#,
            &index,
        );
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].attr("deps").map(|r| r.to_string()), Some(r#"[":liba"]"#.to_string()));
        assert_eq!(
            rules[0].attr("implementation_dynamic_deps").map(|r| r.to_string()),
            Some(r#"[":libb"]"#.to_string())
        );
    }

    #[test]
    fn test_block_apex_available_overrides_tags() {
        let (rules, _) = convert(
            r#"
            [[module]]
            name = "libfoo"
            apex_available = ["com.android.foo"]
            [module.static]
            apex_available = ["//apex_available:platform"]
            "#,
            &ModuleIndex::new(),
        );
        assert_eq!(
            rules[0].attr("tags").map(|r| r.to_string()),
            Some(r#"["apex_available=//apex_available:platform"]"#.to_string())
        );
        assert_eq!(
            rules[1].attr("tags").map(|r| r.to_string()),
            Some(r#"["apex_available=com.android.foo"]"#.to_string())
        );
    }

    #[test]
    fn test_headers_library() {
        let graph = ModuleGraph::from_toml_str(
            r#"
            [[module]]
            name = "libfoo_headers"
            kind = "cc_library_headers"
            export_include_dirs = ["include"]
            export_system_include_dirs = ["sys"]
            "#,
        )
        .unwrap();
        let def = &graph.modules[0];
        let index = ModuleIndex::new();
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(def, &index, &options);
        let rules = headers_rule(&mut ctx);

        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].attr("export_includes").map(|r| r.to_string()),
            Some(r#"["include"]"#.to_string())
        );
        assert_eq!(
            rules[0].attr("export_system_includes").map(|r| r.to_string()),
            Some(r#"["sys"]"#.to_string())
        );
    }
}
