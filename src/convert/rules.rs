// src/convert/rules.rs

//! Output rules
//!
//! A [`Rule`] is one target of the new build graph: its rule class, its
//! name and its reduced attributes. [`RuleBuilder`] reduces attributes as
//! they are added and files any reduce failure as a module error.

use super::ConversionError;
use super::context::ModuleContext;
use crate::attribute::Attribute;
use crate::reduce::{ReduceValue, Reduced, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    CcLibraryStatic,
    CcLibraryShared,
    CcLibraryHeaders,
    CcBinary,
    CcPrebuiltLibraryStatic,
    CcPrebuiltLibraryShared,
    CcPrebuiltBinary,
    Filegroup,
    ProtoLibrary,
    CcLiteProtoLibrary,
    AidlLibrary,
    CcAidlLibrary,
    Yasm,
    Genlex,
    SyspropLibrary,
    CcSyspropLibraryStatic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub name: String,
    pub attrs: BTreeMap<String, Reduced>,
}

impl Rule {
    pub fn attr(&self, name: &str) -> Option<&Reduced> {
        self.attrs.get(name)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}(", self.kind)?;
        writeln!(f, "    name = {:?},", self.name)?;
        for (name, value) in &self.attrs {
            writeln!(f, "    {} = {},", name, value)?;
        }
        write!(f, ")")
    }
}

pub struct RuleBuilder {
    kind: RuleKind,
    name: String,
    attrs: BTreeMap<String, Reduced>,
    errors: Vec<ConversionError>,
}

impl RuleBuilder {
    pub fn new(kind: RuleKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            attrs: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Reduce and add an attribute; omitted when it reduces to nothing
    pub fn attr<V: ReduceValue>(mut self, name: &str, attr: &Attribute<V>) -> Self {
        match attr.reduce() {
            Ok(Some(reduced)) => {
                self.attrs.insert(name.to_string(), reduced);
            }
            Ok(None) => {}
            Err(source) => self.errors.push(ConversionError::Reduce {
                attribute: format!("{}.{}", self.name, name),
                source,
            }),
        }
        self
    }

    pub fn literal(mut self, name: &str, value: Value) -> Self {
        self.attrs.insert(name.to_string(), Reduced::literal(value));
        self
    }

    pub fn string(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.literal(name, Value::Str(value.to_string())),
            None => self,
        }
    }

    /// `apex_available=<apex>` tags, omitted when there are none
    pub fn tags(self, apex_available: &[String]) -> Self {
        if apex_available.is_empty() {
            return self;
        }
        let tags = apex_available
            .iter()
            .map(|apex| format!("apex_available={apex}"))
            .collect();
        self.literal("tags", Value::List(tags))
    }

    pub fn build(self, ctx: &mut ModuleContext<'_>) -> Rule {
        for error in self.errors {
            ctx.module_error(error);
        }
        Rule {
            kind: self.kind,
            name: self.name,
            attrs: self.attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{BoolAttribute, StringListAttribute};
    use crate::axis::ConfigurationAxis;
    use crate::convert::ConversionOptions;
    use crate::lookup::ModuleIndex;
    use crate::module::{ModuleDef, ModuleKind};

    #[test]
    fn test_builder_omits_empty_attributes() {
        let def = ModuleDef::new("libfoo", ModuleKind::CcLibraryStatic);
        let index = ModuleIndex::new();
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(&def, &index, &options);

        let copts = StringListAttribute::with_value(vec!["-Wall".to_string()]);
        let rule = RuleBuilder::new(RuleKind::CcLibraryStatic, "libfoo")
            .attr("copts", &copts)
            .attr("hdrs", &StringListAttribute::new())
            .tags(&["com.android.foo".to_string()])
            .build(&mut ctx);

        assert_eq!(rule.attrs.len(), 2);
        assert_eq!(rule.attr("copts").map(|r| r.to_string()), Some(r#"["-Wall"]"#.to_string()));
        assert_eq!(
            rule.attr("tags").map(|r| r.to_string()),
            Some(r#"["apex_available=com.android.foo"]"#.to_string())
        );
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_reduce_failure_becomes_module_error() {
        let def = ModuleDef::new("libfoo", ModuleKind::CcLibraryStatic);
        let index = ModuleIndex::new();
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(&def, &index, &options);

        let mut rtti = BoolAttribute::new();
        rtti.set_select_value(&ConfigurationAxis::Arch, "arm", Some(true));
        rtti.set_select_value(&ConfigurationAxis::product_variable("eng"), "eng", Some(false));
        let rule = RuleBuilder::new(RuleKind::CcLibraryStatic, "libfoo")
            .attr("rtti", &rtti)
            .build(&mut ctx);

        assert!(rule.attr("rtti").is_none());
        assert!(ctx.has_errors());
    }

    #[test]
    fn test_display() {
        let def = ModuleDef::new("libfoo", ModuleKind::CcLibraryStatic);
        let index = ModuleIndex::new();
        let options = ConversionOptions::default();
        let mut ctx = ModuleContext::new(&def, &index, &options);
        let rule = RuleBuilder::new(RuleKind::CcLibraryStatic, "libfoo")
            .literal("alwayslink", Value::Bool(true))
            .build(&mut ctx);
        assert_eq!(
            rule.to_string(),
            "cc_library_static(\n    name = \"libfoo\",\n    alwayslink = True,\n)"
        );
    }
}
