// src/deps.rs

//! Exported vs implementation-only dependency partitioning
//!
//! Libraries re-export some of their dependencies to their own consumers.
//! The declared export list names which ones; everything else stays an
//! implementation dependency. Executables never export.

use crate::attribute::LabelList;

/// Dependencies split by visibility to consumers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepsPartition {
    pub export: LabelList,
    pub implementation: LabelList,
    /// Exported names that do not appear in the dependency list
    pub ignored_exports: Vec<String>,
}

/// Split `list` into the items not in `filter` and the items in it, each in
/// the order of `list`
pub fn filter_list(list: &[String], filter: &[String]) -> (Vec<String>, Vec<String>) {
    list.iter()
        .cloned()
        .partition(|item| !filter.contains(item))
}

fn ignored_exports(all: &[String], exported: &[String]) -> Vec<String> {
    exported
        .iter()
        .filter(|name| !all.contains(name))
        .cloned()
        .collect()
}

/// Partition `all` by the declared `exported` subset
///
/// When `exports_deps` is false every dependency is implementation-only.
/// Exported names missing from `all` are ignored and reported back.
pub fn partition_exported(
    exports_deps: bool,
    all: &[String],
    exported: &[String],
    mut resolve: impl FnMut(&[String]) -> LabelList,
) -> DepsPartition {
    if !exports_deps {
        return DepsPartition {
            implementation: resolve(all),
            ..DepsPartition::default()
        };
    }
    let (implementation, export) = filter_list(all, exported);
    DepsPartition {
        export: resolve(&export),
        implementation: resolve(&implementation),
        ignored_exports: ignored_exports(all, exported),
    }
}

/// Same as [`partition_exported`], with pending excludes carried into both
/// halves
pub fn partition_exported_excludes(
    exports_deps: bool,
    all: &[String],
    excludes: &[String],
    exported: &[String],
    mut resolve: impl FnMut(&[String], &[String]) -> LabelList,
) -> DepsPartition {
    if !exports_deps {
        return DepsPartition {
            implementation: resolve(all, excludes),
            ..DepsPartition::default()
        };
    }
    let (implementation, export) = filter_list(all, exported);
    DepsPartition {
        export: resolve(&export, excludes),
        implementation: resolve(&implementation, excludes),
        ignored_exports: ignored_exports(all, exported),
    }
}
