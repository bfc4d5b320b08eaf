// src/convert/filegroup.rs

//! Pass-through file group rules

use super::context::ModuleContext;
use super::rules::{Rule, RuleBuilder, RuleKind};
use crate::attribute::LabelListAttribute;
use crate::module::{GroupLibrary, configured_props};
use crate::partition::CONVERTED_PROTO_SUFFIX;
use crate::reduce::Value;

fn group_srcs(ctx: &mut ModuleContext<'_>) -> LabelListAttribute {
    let mut srcs = LabelListAttribute::new();
    for view in configured_props(ctx.def) {
        let labels = ctx.src_labels(&view.props.srcs, &view.props.exclude_srcs);
        srcs.set_select_value(&view.axis, &view.key, labels);
    }
    srcs.resolve_excludes();
    srcs
}

pub fn filegroup_rules(ctx: &mut ModuleContext<'_>) -> Vec<Rule> {
    let def = ctx.def;
    let srcs = group_srcs(ctx);

    if def.library == Some(GroupLibrary::Aidl) {
        let rule = RuleBuilder::new(RuleKind::AidlLibrary, def.name.clone())
            .attr("srcs", &srcs)
            .string("strip_import_prefix", def.path.as_deref())
            .tags(&def.apex_available)
            .build(ctx);
        return vec![rule];
    }

    let mut rules = vec![
        RuleBuilder::new(RuleKind::Filegroup, def.name.clone())
            .attr("srcs", &srcs)
            .tags(&def.apex_available)
            .build(ctx),
    ];
    if def.library == Some(GroupLibrary::Proto) {
        let name = format!("{}{}", def.name, CONVERTED_PROTO_SUFFIX);
        let rule = RuleBuilder::new(RuleKind::ProtoLibrary, name)
            .attr("srcs", &srcs)
            .string("strip_import_prefix", def.path.as_deref())
            .literal("tags", Value::List(vec!["manual".to_string()]))
            .build(ctx);
        rules.push(rule);
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConversionOptions;
    use crate::lookup::ModuleIndex;
    use crate::module::ModuleGraph;

    fn convert(toml: &str) -> Vec<Rule> {
        let graph = ModuleGraph::from_toml_str(toml).unwrap();
        let def = &graph.modules[0];
        let index = ModuleIndex::new();
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(def, &index, &options);
        let rules = filegroup_rules(&mut ctx);
        assert!(!ctx.has_errors());
        rules
    }

    #[test]
    fn test_plain_group() {
        let rules = convert(
            r#"
            [[module]]
            name = "srcs"
            kind = "filegroup"
            srcs = ["a.cpp", "b.cpp"]
            exclude_srcs = ["b.cpp"]
            "#,
        );
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].kind, RuleKind::Filegroup);
        assert_eq!(rules[0].attr("srcs").map(|r| r.to_string()), Some(r#"["a.cpp"]"#.to_string()));
    }

    #[test]
    fn test_proto_group_emits_converted_library() {
        let rules = convert(
            r#"
            [[module]]
            name = "protos"
            kind = "filegroup"
            library = "proto"
            srcs = ["foo.proto"]
            "#,
        );
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].kind, RuleKind::ProtoLibrary);
        assert_eq!(rules[1].name, "protos_bp2build_converted");
        assert_eq!(rules[1].attr("tags").map(|r| r.to_string()), Some(r#"["manual"]"#.to_string()));
    }

    #[test]
    fn test_aidl_group_replaces_filegroup() {
        let rules = convert(
            r#"
            [[module]]
            name = "aidl_srcs"
            kind = "filegroup"
            library = "aidl"
            path = "aidl"
            srcs = ["aidl/IFoo.aidl"]
            "#,
        );
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].kind, RuleKind::AidlLibrary);
        assert_eq!(
            rules[0].attr("strip_import_prefix").map(|r| r.to_string()),
            Some(r#""aidl""#.to_string())
        );
    }
}
