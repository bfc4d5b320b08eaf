// src/partition.rs

//! Source partitioning by language category
//!
//! A module's `srcs` mixes C, C++, assembly, lex, protocol buffer, AIDL and
//! sysprop inputs. Each category becomes its own attribute. File labels are
//! classified by extension. References to pass-through file groups are
//! either mapped to the group's converted typed target, or to a suffixed
//! per-language sub-target the group emits for itself. Anything left over
//! lands in the C++ category.

use crate::attribute::{Label, LabelList, LabelListAttribute};
use crate::lookup::SiblingLookup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Suffix of the typed target a converted proto group emits
pub const CONVERTED_PROTO_SUFFIX: &str = "_bp2build_converted";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SrcCategory {
    C,
    As,
    Asm,
    L,
    Ll,
    Cpp,
    Proto,
    Aidl,
    Sysprop,
}

type LabelMapper = fn(&dyn SiblingLookup, &Label) -> Option<Label>;

struct LabelPartition {
    category: SrcCategory,
    extensions: &'static [&'static str],
    mapper: Option<LabelMapper>,
}

const PARTITIONS: &[LabelPartition] = &[
    LabelPartition {
        category: SrcCategory::Proto,
        extensions: &[".proto"],
        mapper: Some(converted_proto_group),
    },
    LabelPartition {
        category: SrcCategory::C,
        extensions: &[".c"],
        mapper: Some(c_srcs_group),
    },
    LabelPartition {
        category: SrcCategory::As,
        extensions: &[".s", ".S"],
        mapper: Some(as_srcs_group),
    },
    LabelPartition {
        category: SrcCategory::Asm,
        extensions: &[".asm"],
        mapper: None,
    },
    LabelPartition {
        category: SrcCategory::Aidl,
        extensions: &[".aidl"],
        mapper: Some(converted_aidl_group),
    },
    LabelPartition {
        category: SrcCategory::L,
        extensions: &[".l"],
        mapper: None,
    },
    LabelPartition {
        category: SrcCategory::Ll,
        extensions: &[".ll"],
        mapper: None,
    },
    LabelPartition {
        category: SrcCategory::Cpp,
        extensions: &[".cpp", ".cc", ".cxx", ".mm"],
        mapper: Some(cpp_srcs_group),
    },
    LabelPartition {
        category: SrcCategory::Sysprop,
        extensions: &[".sysprop"],
        mapper: None,
    },
];

impl LabelPartition {
    fn claim(&self, lookup: &dyn SiblingLookup, label: &Label) -> Option<Label> {
        if let Some(mapped) = self.mapper.and_then(|mapper| mapper(lookup, label)) {
            return Some(mapped);
        }
        self.extensions
            .iter()
            .any(|ext| label.label.ends_with(ext))
            .then(|| label.clone())
    }
}

/// Category of a source file by extension alone
pub fn category_for_path(path: &str) -> Option<SrcCategory> {
    PARTITIONS
        .iter()
        .find(|p| p.extensions.iter().any(|ext| path.ends_with(ext)))
        .map(|p| p.category)
}

fn referenced_group<'a>(lookup: &'a dyn SiblingLookup, label: &Label) -> Option<&'a crate::lookup::ModuleInfo> {
    let name = label.original_module_name.as_deref()?;
    lookup
        .module_from_name(name)
        .filter(|info| info.is_pass_through_group())
}

fn suffixed_group(lookup: &dyn SiblingLookup, label: &Label, suffix: &str) -> Option<Label> {
    let group = referenced_group(lookup, label)?;
    // Typed groups already have their own identity
    if group.converted_category().is_some() {
        return None;
    }
    Some(label.with_suffix(suffix))
}

fn c_srcs_group(lookup: &dyn SiblingLookup, label: &Label) -> Option<Label> {
    suffixed_group(lookup, label, "_c_srcs")
}

fn as_srcs_group(lookup: &dyn SiblingLookup, label: &Label) -> Option<Label> {
    suffixed_group(lookup, label, "_as_srcs")
}

fn cpp_srcs_group(lookup: &dyn SiblingLookup, label: &Label) -> Option<Label> {
    suffixed_group(lookup, label, "_cpp_srcs")
}

fn converted_proto_group(lookup: &dyn SiblingLookup, label: &Label) -> Option<Label> {
    let group = referenced_group(lookup, label)?;
    match group.converted_category() {
        Some(SrcCategory::Proto) => Some(label.with_suffix(CONVERTED_PROTO_SUFFIX)),
        None if group.carries_protos() => Some(label.clone()),
        None => None,
        Some(_) => None,
    }
}

fn converted_aidl_group(lookup: &dyn SiblingLookup, label: &Label) -> Option<Label> {
    let group = referenced_group(lookup, label)?;
    (group.converted_category() == Some(SrcCategory::Aidl)).then(|| label.clone())
}

/// Partition one label list into categories
///
/// A file label lands in exactly one category. A reference to an
/// unconverted group fans out to every category that has a mapper for it.
pub fn partition_label_list(lookup: &dyn SiblingLookup, list: &LabelList) -> BTreeMap<SrcCategory, LabelList> {
    let mut partitioned: BTreeMap<SrcCategory, LabelList> = BTreeMap::new();
    for label in &list.includes {
        let mut claimed = false;
        for partition in PARTITIONS {
            if let Some(mapped) = partition.claim(lookup, label) {
                partitioned.entry(partition.category).or_default().add(mapped);
                claimed = true;
            }
        }
        if !claimed {
            partitioned.entry(SrcCategory::Cpp).or_default().add(label.clone());
        }
    }
    partitioned
}

/// Partition every (axis, key) value of a source attribute
///
/// The result has an entry for every category; categories without sources
/// hold an empty attribute.
pub fn partition_srcs(
    lookup: &dyn SiblingLookup,
    srcs: &LabelListAttribute,
) -> BTreeMap<SrcCategory, LabelListAttribute> {
    let mut partitions: BTreeMap<SrcCategory, LabelListAttribute> =
        SrcCategory::iter().map(|c| (c, LabelListAttribute::new())).collect();

    for (category, list) in partition_label_list(lookup, srcs.value()) {
        if let Some(attr) = partitions.get_mut(&category) {
            attr.set_value(list);
        }
    }
    for (axis, key, value) in srcs.entries() {
        for (category, list) in partition_label_list(lookup, value) {
            if let Some(attr) = partitions.get_mut(&category) {
                attr.set_select_value(axis, key, list);
            }
        }
    }
    partitions
}
