// src/convert/prebuilt.rs

//! Prebuilt library and executable rules
//!
//! A prebuilt names exactly one file per configuration. A prebuilt static
//! library also gets an `_alwayslink` twin that whole-archive dependents
//! reference.

use super::ConversionError;
use super::compiler::{CompilerAttributes, ExportedIncludes};
use super::context::{ALWAYSLINK_SUFFIX, ModuleContext};
use super::rules::{Rule, RuleBuilder, RuleKind};
use crate::attribute::{BoolAttribute, LabelAttribute};
use crate::module::{ConfiguredProps, ModuleKind, configured_props};
use crate::reduce::Value;

/// The single source of each configuration
fn prebuilt_src(ctx: &mut ModuleContext<'_>, views: &[ConfiguredProps]) -> LabelAttribute {
    let kind = ctx.def.kind;
    let mut src = LabelAttribute::new();
    for view in views {
        let props = &view.props;
        let mut srcs = props.srcs.clone();
        match kind {
            ModuleKind::CcPrebuiltLibraryStatic => srcs.extend(props.static_props.srcs.iter().cloned()),
            ModuleKind::CcPrebuiltLibraryShared => srcs.extend(props.shared.srcs.iter().cloned()),
            _ => {}
        }
        match srcs.as_slice() {
            [] => {}
            [file] => {
                let label = ctx.src_label(file);
                src.set_select_value(&view.axis, &view.key, Some(label));
            }
            _ => ctx.module_error(ConversionError::MultipleSources {
                axis: view.axis.to_string(),
                key: view.key.clone(),
            }),
        }
    }
    src
}

fn enabled(views: &[ConfiguredProps]) -> BoolAttribute {
    let mut enabled = BoolAttribute::new();
    for view in views {
        enabled.set_select_value(&view.axis, &view.key, view.props.enabled);
    }
    enabled
}

fn static_rule(
    ctx: &mut ModuleContext<'_>,
    name: String,
    src: &LabelAttribute,
    includes: &ExportedIncludes,
    enabled: &BoolAttribute,
    alwayslink: bool,
) -> Rule {
    let mut builder = RuleBuilder::new(RuleKind::CcPrebuiltLibraryStatic, name)
        .attr("static_library", src)
        .attr("export_includes", &includes.includes)
        .attr("export_system_includes", &includes.system_includes)
        .attr("enabled", enabled);
    if alwayslink {
        builder = builder.literal("alwayslink", Value::Bool(true));
    }
    builder.tags(&ctx.def.apex_available).build(ctx)
}

pub fn prebuilt_rules(ctx: &mut ModuleContext<'_>) -> Vec<Rule> {
    let def = ctx.def;
    let views = configured_props(def);
    let src = prebuilt_src(ctx, &views);
    let enabled = enabled(&views);

    match def.kind {
        ModuleKind::CcPrebuiltLibraryStatic => {
            let mut compiler = CompilerAttributes::default();
            compiler.convert_exported_includes(&views);
            let includes = &compiler.includes;
            let archive = static_rule(ctx, def.name.clone(), &src, includes, &enabled, false);
            let alwayslink = static_rule(
                ctx,
                format!("{}{}", def.name, ALWAYSLINK_SUFFIX),
                &src,
                includes,
                &enabled,
                true,
            );
            vec![archive, alwayslink]
        }
        ModuleKind::CcPrebuiltLibraryShared => {
            let rule = RuleBuilder::new(RuleKind::CcPrebuiltLibraryShared, def.name.clone())
                .attr("shared_library", &src)
                .attr("enabled", &enabled)
                .tags(&def.apex_available)
                .build(ctx);
            vec![rule]
        }
        _ => {
            let rule = RuleBuilder::new(RuleKind::CcPrebuiltBinary, def.name.clone())
                .attr("src", &src)
                .attr("enabled", &enabled)
                .tags(&def.apex_available)
                .build(ctx);
            vec![rule]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConversionOptions;
    use crate::lookup::ModuleIndex;
    use crate::module::ModuleGraph;

    fn convert(toml: &str) -> (Vec<Rule>, bool) {
        let graph = ModuleGraph::from_toml_str(toml).unwrap();
        let def = &graph.modules[0];
        let index = ModuleIndex::new();
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(def, &index, &options);
        let rules = prebuilt_rules(&mut ctx);
        (rules, ctx.has_errors())
    }

    #[test]
    fn test_prebuilt_static_with_alwayslink_twin() {
        let (rules, errors) = convert(
            r#"
            [[module]]
            name = "libprebuilt"
            kind = "cc_prebuilt_library_static"
            export_include_dirs = ["include"]
            [module.arch.arm]
            srcs = ["arm/libprebuilt.a"]
            [module.arch.x86]
            srcs = ["x86/libprebuilt.a"]
            "#,
        );
        assert!(!errors);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "libprebuilt");
        assert!(rules[0].attr("alwayslink").is_none());
        assert_eq!(rules[1].name, "libprebuilt_alwayslink");
        assert_eq!(rules[1].attr("alwayslink").map(|r| r.to_string()), Some("True".to_string()));
        assert_eq!(rules[0].attr("static_library"), rules[1].attr("static_library"));

        let src = rules[0].attr("static_library").map(|r| r.to_string()).unwrap_or_default();
        assert!(src.contains("arm/libprebuilt.a"));
        assert!(src.contains("x86/libprebuilt.a"));
        assert_eq!(
            rules[0].attr("export_includes").map(|r| r.to_string()),
            Some(r#"["include"]"#.to_string())
        );
    }

    #[test]
    fn test_prebuilt_shared_block_source() {
        let (rules, errors) = convert(
            r#"
            [[module]]
            name = "libprebuilt"
            kind = "cc_prebuilt_library_shared"
            [module.shared]
            srcs = ["libprebuilt.so"]
            "#,
        );
        assert!(!errors);
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].attr("shared_library").map(|r| r.to_string()),
            Some(r#""libprebuilt.so""#.to_string())
        );
    }

    #[test]
    fn test_prebuilt_multiple_sources_is_error() {
        let (_, errors) = convert(
            r#"
            [[module]]
            name = "tool"
            kind = "cc_prebuilt_binary"
            srcs = ["a", "b"]
            "#,
        );
        assert!(errors);
    }

    #[test]
    fn test_prebuilt_binary_enabled() {
        let (rules, errors) = convert(
            r#"
            [[module]]
            name = "tool"
            kind = "cc_prebuilt_binary"
            srcs = ["tool"]
            enabled = false
            [module.target.android]
            enabled = true
            "#,
        );
        assert!(!errors);
        assert_eq!(rules[0].kind, RuleKind::CcPrebuiltBinary);
        assert_eq!(rules[0].attr("src").map(|r| r.to_string()), Some(r#""tool""#.to_string()));
        let enabled = rules[0].attr("enabled").map(|r| r.to_string()).unwrap_or_default();
        assert!(enabled.contains("True"));
        assert!(enabled.contains("False"));
    }
}
