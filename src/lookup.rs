// src/lookup.rs

//! Read-only sibling module metadata
//!
//! Converting one module sometimes needs facts about the modules it refers
//! to: whether a source reference is a pass-through file group, whether a
//! shared dependency ships stub variants, which APEXes it is available to.
//! Those facts come through [`SiblingLookup`], which is passed into every
//! conversion call instead of living in global state. An absent module is
//! not an error here; callers degrade to an opaque label.

use crate::module::{GroupLibrary, ModuleGraph, ModuleKind};
use crate::partition::SrcCategory;
use serde::Serialize;
use std::collections::HashMap;

/// Public metadata of one module in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub dir: String,
    pub kind: ModuleKind,
    pub apex_available: Vec<String>,
    pub has_stubs: bool,
    /// Set when the module is a file group converted into a typed library
    pub converted_category: Option<SrcCategory>,
    /// A file group whose sources are protos, converted or not
    pub carries_protos: bool,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            dir: String::new(),
            kind,
            apex_available: Vec::new(),
            has_stubs: false,
            converted_category: None,
            carries_protos: false,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_stubs(mut self) -> Self {
        self.has_stubs = true;
        self
    }

    pub fn available_to(mut self, apexes: &[&str]) -> Self {
        self.apex_available = apexes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn converted_to(mut self, category: SrcCategory) -> Self {
        self.converted_category = Some(category);
        self.carries_protos = category == SrcCategory::Proto;
        self
    }

    pub fn with_protos(mut self) -> Self {
        self.carries_protos = true;
        self
    }

    pub fn is_pass_through_group(&self) -> bool {
        self.kind == ModuleKind::Filegroup
    }

    pub fn has_stub_variants(&self) -> bool {
        self.has_stubs
    }

    pub fn packaging_availability(&self) -> &[String] {
        &self.apex_available
    }

    /// The typed category a pass-through group was converted to, if known
    pub fn converted_category(&self) -> Option<SrcCategory> {
        self.converted_category
    }

    pub fn carries_protos(&self) -> bool {
        self.carries_protos
    }

    pub fn is_prebuilt(&self) -> bool {
        self.kind.is_prebuilt()
    }

    /// A library emitting both a static and a shared rule
    pub fn is_full_library(&self) -> bool {
        self.kind == ModuleKind::CcLibrary
    }
}

/// Capability for reading sibling module metadata
pub trait SiblingLookup: Sync {
    fn module_from_name(&self, name: &str) -> Option<&ModuleInfo>;
}

/// In-memory lookup table over a whole module graph
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    modules: HashMap<String, ModuleInfo>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: &ModuleGraph) -> Self {
        let mut index = Self::new();
        for def in &graph.modules {
            let converted_category = match (def.convert, def.kind, def.library) {
                (true, ModuleKind::Filegroup, Some(GroupLibrary::Proto)) => Some(SrcCategory::Proto),
                (true, ModuleKind::Filegroup, Some(GroupLibrary::Aidl)) => Some(SrcCategory::Aidl),
                _ => None,
            };
            let srcs = &def.props.srcs;
            let carries_protos = def.kind == ModuleKind::Filegroup
                && (def.library == Some(GroupLibrary::Proto)
                    || (!srcs.is_empty() && srcs.iter().all(|src| src.ends_with(".proto"))));
            index.insert(ModuleInfo {
                name: def.name.clone(),
                dir: def.dir.clone(),
                kind: def.kind,
                apex_available: def.apex_available.clone(),
                has_stubs: def.stubs.as_ref().is_some_and(|s| s.symbol_file.is_some()),
                converted_category,
                carries_protos,
            });
        }
        index
    }

    pub fn insert(&mut self, info: ModuleInfo) {
        self.modules.insert(info.name.clone(), info);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl SiblingLookup for ModuleIndex {
    fn module_from_name(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules.get(name)
    }
}

impl FromIterator<ModuleInfo> for ModuleIndex {
    fn from_iter<I: IntoIterator<Item = ModuleInfo>>(iter: I) -> Self {
        let mut index = Self::new();
        for info in iter {
            index.insert(info);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let index: ModuleIndex = [
            ModuleInfo::new("libbar", ModuleKind::CcLibrary).with_stubs().available_to(&["com.bar"]),
            ModuleInfo::new("srcs_fg", ModuleKind::Filegroup),
        ]
        .into_iter()
        .collect();

        let bar = index.module_from_name("libbar").unwrap();
        assert!(bar.has_stub_variants());
        assert!(bar.is_full_library());
        assert_eq!(bar.packaging_availability(), &["com.bar".to_string()]);
        assert!(index.module_from_name("srcs_fg").unwrap().is_pass_through_group());
        assert!(index.module_from_name("missing").is_none());
    }

    #[test]
    fn test_from_graph_marks_converted_groups() {
        let graph = ModuleGraph::from_toml_str(
            r#"
            [[module]]
            name = "a_fg_proto"
            kind = "filegroup"
            library = "proto"
            srcs = ["a.proto"]

            [[module]]
            name = "unconverted_proto"
            kind = "filegroup"
            library = "proto"
            convert = false

            [[module]]
            name = "libfoo"
            kind = "cc_library"
            stubs = { symbol_file = "foo.map.txt", versions = ["29"] }

            [[module]]
            name = "plain_protos"
            kind = "filegroup"
            convert = false
            srcs = ["a.proto", "b.proto"]

            [[module]]
            name = "cpp_fg"
            kind = "filegroup"
            srcs = ["a.cpp", "b.proto"]
            "#,
        )
        .unwrap();
        let index = ModuleIndex::from_graph(&graph);
        assert_eq!(index.len(), 5);
        assert!(index.module_from_name("unconverted_proto").unwrap().carries_protos());
        assert!(index.module_from_name("plain_protos").unwrap().carries_protos());
        assert!(!index.module_from_name("cpp_fg").unwrap().carries_protos());
        assert!(!index.module_from_name("libfoo").unwrap().carries_protos());
        assert_eq!(
            index.module_from_name("a_fg_proto").unwrap().converted_category(),
            Some(SrcCategory::Proto)
        );
        assert_eq!(
            index.module_from_name("unconverted_proto").unwrap().converted_category(),
            None
        );
        assert!(index.module_from_name("libfoo").unwrap().has_stub_variants());
    }
}
