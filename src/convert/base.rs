// src/convert/base.rs

//! Attributes shared by every compiled module kind
//!
//! Runs the compiler and linker resolvers over each configuration view,
//! applies product variables, finalizes both, emits the generated helper
//! rules and wires their labels back into the module's own attributes.

use super::compiler::CompilerAttributes;
use super::context::{DepFlavor, ModuleContext};
use super::features::{lto_features, sanitizer_features};
use super::generated::{self, ProtoDeps, add_label};
use super::linker::{LinkerAttributes, log_ignored_exports};
use super::rules::Rule;
use crate::attribute::{LabelListAttribute, StringListAttribute};
use crate::deps::partition_exported;
use crate::module::{configured_props, product_variable_props};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct BaseAttributes {
    pub compiler: CompilerAttributes,
    pub linker: LinkerAttributes,
    pub features: StringListAttribute,
    pub proto: ProtoDeps,
}

/// Resolve the attributes every compiled kind shares
///
/// Helper rules for generated sources are pushed onto `rules`.
pub fn parse_base(ctx: &mut ModuleContext<'_>, rules: &mut Vec<Rule>) -> BaseAttributes {
    let def = ctx.def;
    let views = configured_props(def);
    let product_views = product_variable_props(def);
    debug!(
        "Module {}: {} configuration views, {} product variables",
        def.name,
        views.len(),
        product_views.len()
    );

    let mut compiler = CompilerAttributes::default();
    let mut linker = LinkerAttributes::default();
    let mut implementation_hdrs = LabelListAttribute::new();

    for view in &views {
        compiler.convert_view(ctx, view);
        linker.convert_view(ctx, view);

        let headers = partition_exported(
            ctx.exports_deps(),
            &view.props.generated_headers,
            &view.props.export_generated_headers,
            |names| ctx.dep_labels(names, DepFlavor::Plain),
        );
        log_ignored_exports(ctx, "export_generated_headers", &headers);
        implementation_hdrs.set_select_value(&view.axis, &view.key, headers.implementation.clone());
        compiler.add_generated_headers(&view.axis, &view.key, &headers.export, &headers.implementation);
    }
    compiler.convert_exported_includes(&views);

    compiler.convert_stl(ctx, &views);
    linker.convert_strip(&views);
    compiler.convert_product_variables(&product_views);
    linker.convert_product_variables(ctx, &product_views);

    compiler.finalize(ctx, &implementation_hdrs);
    linker.finalize(ctx);

    let yasm = generated::yasm(ctx, &compiler, &views, rules);
    compiler.srcs.add_label(&yasm);

    let proto = generated::proto(ctx, &compiler.proto_srcs, rules);
    add_label(&mut linker.whole_archive_deps, proto.whole_archive.clone());
    add_label(
        &mut linker.implementation_whole_archive_deps,
        proto.implementation_whole_archive.clone(),
    );

    let aidl = generated::aidl(ctx, &compiler.aidl_srcs, &linker, rules);
    if def.kind.is_library() {
        if def.aidl.export_aidl_headers == Some(true) {
            add_label(&mut linker.whole_archive_deps, aidl);
        } else {
            add_label(&mut linker.implementation_whole_archive_deps, aidl);
        }
    }

    let (lex_c, lex_cpp) = generated::lex(ctx, &compiler, rules);
    compiler.srcs.add_label(&lex_cpp);
    compiler.c_srcs.add_label(&lex_c);

    let sysprop = generated::sysprop(ctx, &compiler.sysprop_srcs, rules);
    add_label(&mut linker.whole_archive_deps, sysprop);

    linker.whole_archive_deps.prepend = true;
    linker.deps.prepend = true;
    compiler.local_includes.prepend = true;
    compiler.absolute_includes.prepend = true;
    compiler.hdrs.prepend = true;

    let mut features = compiler.features.clone();
    features
        .append(&linker.features)
        .append(&sanitizer_features(&views))
        .append(&lto_features(ctx, &views));
    features.deduplicate_axes_from_base();

    linker.add_musl_system_dynamic_deps(ctx);

    BaseAttributes {
        compiler,
        linker,
        features,
        proto,
    }
}
