// src/convert/binary.rs

//! Executable rules

use super::ConversionError;
use super::base::parse_base;
use super::context::ModuleContext;
use super::generated::add_label;
use super::rules::{Rule, RuleBuilder, RuleKind};
use crate::attribute::BoolAttribute;
use crate::axis::ConfigurationAxis;
use crate::module::configured_props;

/// Executables link dynamically unless `static_executable` is set
///
/// Only the unconfigured value is honored; a per-configuration override is
/// a module error.
fn linkshared(ctx: &mut ModuleContext<'_>) -> BoolAttribute {
    let mut linkshared = BoolAttribute::new();
    for view in configured_props(ctx.def) {
        if view.props.static_executable != Some(true) {
            continue;
        }
        if view.axis == ConfigurationAxis::NoConfig {
            linkshared.set_value(Some(false));
        } else {
            ctx.module_error(ConversionError::VariantStaticExecutable {
                axis: view.axis.to_string(),
                key: view.key.clone(),
            });
        }
    }
    linkshared
}

pub fn binary_rules(ctx: &mut ModuleContext<'_>) -> Vec<Rule> {
    let def = ctx.def;
    let mut rules = Vec::new();
    let base = parse_base(ctx, &mut rules);
    let (compiler, linker) = (&base.compiler, &base.linker);

    let mut deps = linker.implementation_deps.clone();
    add_label(&mut deps, base.proto.runtime.clone());
    let mut whole_archive_deps = linker.whole_archive_deps.clone();
    whole_archive_deps.append(&linker.implementation_whole_archive_deps);
    let linkshared = linkshared(ctx);

    let strip = &linker.strip;
    let rule = RuleBuilder::new(RuleKind::CcBinary, def.name.clone())
        .attr("srcs", &compiler.srcs)
        .attr("srcs_c", &compiler.c_srcs)
        .attr("srcs_as", &compiler.as_srcs)
        .attr("copts", &compiler.copts)
        .attr("conlyflags", &compiler.conly_flags)
        .attr("cppflags", &compiler.cpp_flags)
        .attr("asflags", &compiler.as_flags)
        .attr("local_includes", &compiler.local_includes)
        .attr("absolute_includes", &compiler.absolute_includes)
        .attr("deps", &deps)
        .attr("dynamic_deps", &linker.implementation_dynamic_deps)
        .attr("whole_archive_deps", &whole_archive_deps)
        .attr("system_deps", &linker.system_dynamic_deps)
        .attr("runtime_deps", &linker.runtime_deps)
        .attr("linkshared", &linkshared)
        .attr("linkopts", &linker.linkopts)
        .attr("additional_linker_inputs", &linker.additional_linker_inputs)
        .attr("strip_keep_symbols", &strip.keep_symbols)
        .attr("strip_keep_symbols_and_debug_frame", &strip.keep_symbols_and_debug_frame)
        .attr("strip_keep_symbols_list", &strip.keep_symbols_list)
        .attr("strip_all", &strip.all)
        .attr("strip_none", &strip.none)
        .attr("features", &base.features)
        .attr("suffix", &compiler.suffix)
        .attr("rtti", &compiler.rtti)
        .string("stl", compiler.stl.as_deref())
        .string("c_std", compiler.c_std.as_deref())
        .string("cpp_std", compiler.cpp_std.as_deref())
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
    use crate::module::{ModuleGraph, ModuleKind};

    fn convert(toml: &str, index: &ModuleIndex) -> (Vec<Rule>, bool) {
        let graph = ModuleGraph::from_toml_str(toml).unwrap();
        let def = &graph.modules[0];
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(def, index, &options);
        let rules = binary_rules(&mut ctx);
        (rules, ctx.has_errors())
    }

    #[test]
    fn test_binary_deps_are_private() {
        let index: ModuleIndex = [
            ModuleInfo::new("liba", ModuleKind::CcLibraryStatic),
            ModuleInfo::new("libb", ModuleKind::CcLibraryShared),
        ]
        .into_iter()
        .collect();
        let (rules, errors) = convert(
            r#"
            [[module]]
            name = "tool"
            kind = "cc_binary"
            srcs = ["main.cpp"]
            static_libs = ["liba"]
            shared_libs = ["libb"]
            export_static_lib_headers = ["liba"]
            "#,
            &index,
        );
        assert!(!errors);
        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.kind, RuleKind::CcBinary);
        assert_eq!(rule.attr("deps").map(|r| r.to_string()), Some(r#"[":liba"]"#.to_string()));
        assert_eq!(rule.attr("dynamic_deps").map(|r| r.to_string()), Some(r#"[":libb"]"#.to_string()));
        assert!(rule.attr("linkshared").is_none());
    }

    #[test]
    fn test_static_executable() {
        let (rules, errors) = convert(
            r#"
            [[module]]
            name = "tool"
            kind = "cc_binary"
            static_executable = true
            "#,
            &ModuleIndex::new(),
        );
        assert!(!errors);
        assert_eq!(rules[0].attr("linkshared").map(|r| r.to_string()), Some("False".to_string()));
    }

    #[test]
    fn test_static_executable_per_arch_is_error() {
        let (_, errors) = convert(
            r#"
            [[module]]
            name = "tool"
            kind = "cc_binary"
            [module.arch.arm]
            static_executable = true
            "#,
            &ModuleIndex::new(),
        );
        assert!(errors);
    }
}
