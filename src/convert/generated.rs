// src/convert/generated.rs

//! Sub-targets generated from special source categories
//!
//! Assembly, lex, protocol buffer, AIDL and sysprop sources are not
//! compiled by the module's own rule. Each category becomes one or two
//! helper rules, and the module depends on the last of them instead.

use super::compiler::CompilerAttributes;
use super::context::{DepFlavor, ModuleContext};
use super::linker::LinkerAttributes;
use super::rules::{Rule, RuleBuilder, RuleKind};
use crate::attribute::{Label, LabelAttribute, LabelListAttribute, StringListAttribute};
use crate::module::ConfiguredProps;
use crate::partition::SrcCategory;
use crate::reduce::Value;

/// Where the generated proto library lands in the module's dependencies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtoDeps {
    /// Protobuf runtime the module links against
    pub runtime: Option<Label>,
    pub whole_archive: Option<Label>,
    pub implementation_whole_archive: Option<Label>,
}

fn single(label: Label) -> LabelAttribute {
    LabelAttribute::with_value(Some(label))
}

/// Assemble `.asm` sources with yasm
///
/// The returned label is unconditional when the base has asm sources;
/// otherwise it is present only on the keys that do.
pub fn yasm(
    ctx: &mut ModuleContext<'_>,
    compiler: &CompilerAttributes,
    views: &[ConfiguredProps],
    rules: &mut Vec<Rule>,
) -> LabelAttribute {
    let asm_srcs = &compiler.asm_srcs;
    if asm_srcs.is_empty() {
        return LabelAttribute::new();
    }

    let mut include_dirs = compiler.local_includes.clone();
    for view in views {
        if view.props.export_include_dirs.is_empty() {
            continue;
        }
        let mut exported = StringListAttribute::new();
        exported.set_select_value(&view.axis, &view.key, view.props.export_include_dirs.clone());
        include_dirs.append(&exported);
    }

    let name = format!("{}_yasm", ctx.name());
    let rule = RuleBuilder::new(RuleKind::Yasm, name)
        .attr("srcs", asm_srcs)
        .attr("flags", &compiler.as_flags)
        .attr("include_dirs", &include_dirs)
        .build(ctx);
    rules.push(rule);

    let label = ctx.local_label("_yasm");
    if !asm_srcs.value().includes.is_empty() {
        return single(label);
    }
    let mut configured = LabelAttribute::new();
    for (axis, key, srcs) in asm_srcs.entries() {
        if !srcs.includes.is_empty() {
            configured.set_select_value(axis, key, Some(label.clone()));
        }
    }
    configured
}

/// Generated lex sources: the C one, then the C++ one
pub fn lex(
    ctx: &mut ModuleContext<'_>,
    compiler: &CompilerAttributes,
    rules: &mut Vec<Rule>,
) -> (LabelAttribute, LabelAttribute) {
    let mut generate = |srcs: &LabelListAttribute, suffix: &str| {
        if srcs.is_empty() {
            return LabelAttribute::new();
        }
        let rule = RuleBuilder::new(RuleKind::Genlex, format!("{}{}", ctx.name(), suffix))
            .attr("srcs", srcs)
            .attr("lexopts", &compiler.lexopts)
            .build(ctx);
        rules.push(rule);
        single(ctx.local_label(suffix))
    };
    let c = generate(&compiler.l_srcs, "_genlex_l");
    let cpp = generate(&compiler.ll_srcs, "_genlex_ll");
    (c, cpp)
}

fn is_converted_group(ctx: &ModuleContext<'_>, label: &Label, category: SrcCategory) -> bool {
    label.original_module_name.as_deref().is_some_and(|name| {
        ctx.lookup
            .module_from_name(name)
            .is_some_and(|info| info.converted_category() == Some(category))
    })
}

/// Lite C++ protobuf library over the module's proto sources
pub fn proto(ctx: &mut ModuleContext<'_>, proto_srcs: &LabelListAttribute, rules: &mut Vec<Rule>) -> ProtoDeps {
    if proto_srcs.is_empty() {
        return ProtoDeps::default();
    }
    let (converted, raw) = proto_srcs.partition(|label| is_converted_group(ctx, label, SrcCategory::Proto));
    let def = ctx.def;

    let mut deps = converted.clone();
    if !raw.is_empty() {
        let rule = RuleBuilder::new(RuleKind::ProtoLibrary, format!("{}_proto", def.name))
            .attr("srcs", &raw)
            .attr("deps", &converted)
            .tags(&def.apex_available)
            .build(ctx);
        rules.push(rule);
        deps.add_label(&single(ctx.local_label("_proto")));
    }

    let rule = RuleBuilder::new(RuleKind::CcLiteProtoLibrary, format!("{}_cc_proto_lite", def.name))
        .attr("deps", &deps)
        .tags(&def.apex_available)
        .build(ctx);
    rules.push(rule);

    let label = ctx.local_label("_cc_proto_lite");
    let options = ctx.options;
    let runtime = ctx.dep_label(&options.proto_runtime_lib, DepFlavor::Plain);
    let exported = def.kind.is_library() && def.proto.export_proto_headers == Some(true);
    ProtoDeps {
        runtime: Some(runtime),
        whole_archive: exported.then(|| label.clone()),
        implementation_whole_archive: (!exported).then_some(label),
    }
}

/// C++ bindings for the module's AIDL sources
///
/// Raw `.aidl` files get their own `aidl_library` first; groups already
/// converted to AIDL libraries are used directly.
pub fn aidl(
    ctx: &mut ModuleContext<'_>,
    aidl_srcs: &LabelListAttribute,
    linker: &LinkerAttributes,
    rules: &mut Vec<Rule>,
) -> Option<Label> {
    if aidl_srcs.is_empty() {
        return None;
    }
    let (mut libs, raw) = aidl_srcs.partition(|label| is_converted_group(ctx, label, SrcCategory::Aidl));
    let def = ctx.def;

    if !raw.is_empty() {
        let rule = RuleBuilder::new(RuleKind::AidlLibrary, format!("{}_aidl_library", def.name))
            .attr("srcs", &raw)
            .tags(&def.apex_available)
            .build(ctx);
        rules.push(rule);
        libs.add_label(&single(ctx.local_label("_aidl_library")));
    }
    if libs.is_empty() {
        return None;
    }

    let mut implementation_deps = linker.deps.clone();
    implementation_deps.append(&linker.implementation_deps);
    let mut implementation_dynamic_deps = linker.dynamic_deps.clone();
    implementation_dynamic_deps.append(&linker.implementation_dynamic_deps);

    let rule = RuleBuilder::new(RuleKind::CcAidlLibrary, format!("{}_cc_aidl_library", def.name))
        .attr("deps", &libs)
        .attr("implementation_deps", &implementation_deps)
        .attr("implementation_dynamic_deps", &implementation_dynamic_deps)
        .string("min_sdk_version", def.min_sdk_version.as_deref())
        .tags(&def.apex_available)
        .build(ctx);
    rules.push(rule);
    Some(ctx.local_label("_cc_aidl_library"))
}

/// Static C++ library generated from sysprop descriptions
pub fn sysprop(ctx: &mut ModuleContext<'_>, sysprop_srcs: &LabelListAttribute, rules: &mut Vec<Rule>) -> Option<Label> {
    if sysprop_srcs.is_empty() {
        return None;
    }
    let def = ctx.def;

    let rule = RuleBuilder::new(RuleKind::SyspropLibrary, format!("{}_sysprop_library", def.name))
        .attr("srcs", sysprop_srcs)
        .tags(&def.apex_available)
        .build(ctx);
    rules.push(rule);

    let library = ctx.local_label("_sysprop_library");
    let rule = RuleBuilder::new(
        RuleKind::CcSyspropLibraryStatic,
        format!("{}_cc_sysprop_library_static", def.name),
    )
    .literal("dep", Value::Str(library.label))
    .string("min_sdk_version", def.min_sdk_version.as_deref())
    .tags(&def.apex_available)
    .build(ctx);
    rules.push(rule);

    Some(ctx.local_label("_cc_sysprop_library_static"))
}

/// Add one label to every configuration of a list attribute
pub fn add_label(attr: &mut LabelListAttribute, label: Option<Label>) {
    if let Some(label) = label {
        attr.add_label(&single(label));
    }
}
