// src/reduce.rs

//! Reduction of configurable attributes into select expressions
//!
//! A reduced attribute is a base value followed by at most one `select()`
//! per axis, in axis precedence order. Lists concatenate their parts; a
//! scalar is a single select whose default is the base value. Evaluating a
//! reduction under a configuration gives back exactly the value the
//! attribute held for it.

use crate::attribute::{
    Attribute, AttributeError, AttrValue, Label, LabelList, ListValue,
};
use crate::axis::{CONDITIONS_DEFAULT, Configuration, ConfigurationAxis};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    #[error(transparent)]
    Collapse(#[from] AttributeError),

    #[error("scalar attribute has values on more than one axis: {0}")]
    MultipleAxes(String),
}

/// A literal value in a reduced expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Str(String),
    List(Vec<String>),
}

impl Value {
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Self::Str(s) => write!(f, "{:?}", s),
            Self::List(items) => {
                let quoted: Vec<String> = items.iter().map(|s| format!("{:?}", s)).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
        }
    }
}

/// One `condition: value` branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub condition: String,
    #[serde(skip)]
    pub key: String,
    pub value: Value,
}

/// A `select()` over one axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Select {
    pub axis: String,
    #[serde(skip)]
    pub configuration_axis: ConfigurationAxis,
    /// Sorted by condition label
    pub branches: Vec<Branch>,
    pub default: Value,
}

impl Select {
    fn evaluate(&self, config: &Configuration) -> &Value {
        let Some(key) = self.configuration_axis.key_for(config) else {
            return &self.default;
        };
        self.branches
            .iter()
            .find(|b| b.key == key)
            .map(|b| &b.value)
            .unwrap_or(&self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Value(Value),
    Select(Select),
}

/// A reduced attribute: parts joined with `+`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reduced {
    pub parts: Vec<Part>,
}

impl Reduced {
    pub fn literal(value: Value) -> Self {
        Self {
            parts: vec![Part::Value(value)],
        }
    }

    /// Whether the expression is a plain literal
    pub fn is_literal(&self) -> bool {
        matches!(self.parts.as_slice(), [Part::Value(_)])
    }

    pub fn selects(&self) -> impl Iterator<Item = &Select> {
        self.parts.iter().filter_map(|p| match p {
            Part::Select(s) => Some(s),
            Part::Value(_) => None,
        })
    }

    /// The value this expression takes under one configuration
    pub fn evaluate(&self, config: &Configuration) -> Value {
        let values: Vec<&Value> = self
            .parts
            .iter()
            .map(|part| match part {
                Part::Value(v) => v,
                Part::Select(s) => s.evaluate(config),
            })
            .collect();

        if values.iter().all(|v| matches!(v, Value::List(_))) && !values.is_empty() {
            let items = values
                .iter()
                .filter_map(|v| v.as_list())
                .flatten()
                .cloned()
                .collect();
            return Value::List(items);
        }
        values.first().map(|v| (*v).clone()).unwrap_or(Value::None)
    }
}

impl fmt::Display for Reduced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            match part {
                Part::Value(v) => write!(f, "{}", v)?,
                Part::Select(s) => {
                    write!(f, "select({{")?;
                    for branch in &s.branches {
                        write!(f, "{:?}: {}, ", branch.condition, branch.value)?;
                    }
                    write!(f, "{:?}: {}}})", crate::axis::CONDITIONS_DEFAULT_LABEL, s.default)?;
                }
            }
        }
        Ok(())
    }
}

/// Payloads the reducer knows how to render
pub trait ReduceValue: AttrValue {
    fn to_value(&self) -> Value;

    fn reduce_attribute(attr: &Attribute<Self>) -> Result<Option<Reduced>, ReduceError>;
}

impl ReduceValue for LabelList {
    fn to_value(&self) -> Value {
        Value::List(self.label_strings())
    }

    fn reduce_attribute(attr: &Attribute<Self>) -> Result<Option<Reduced>, ReduceError> {
        Ok(reduce_list(attr))
    }
}

impl ReduceValue for Vec<String> {
    fn to_value(&self) -> Value {
        Value::List(self.clone())
    }

    fn reduce_attribute(attr: &Attribute<Self>) -> Result<Option<Reduced>, ReduceError> {
        Ok(reduce_list(attr))
    }
}

impl ReduceValue for Option<bool> {
    fn to_value(&self) -> Value {
        self.map(Value::Bool).unwrap_or(Value::None)
    }

    fn reduce_attribute(attr: &Attribute<Self>) -> Result<Option<Reduced>, ReduceError> {
        reduce_scalar(attr)
    }
}

impl ReduceValue for Option<String> {
    fn to_value(&self) -> Value {
        self.clone().map(Value::Str).unwrap_or(Value::None)
    }

    fn reduce_attribute(attr: &Attribute<Self>) -> Result<Option<Reduced>, ReduceError> {
        reduce_scalar(attr)
    }
}

impl ReduceValue for Option<Label> {
    fn to_value(&self) -> Value {
        self.as_ref()
            .map(|l| Value::Str(l.label.clone()))
            .unwrap_or(Value::None)
    }

    fn reduce_attribute(attr: &Attribute<Self>) -> Result<Option<Reduced>, ReduceError> {
        reduce_scalar(attr)
    }
}

impl<V: ReduceValue> Attribute<V> {
    /// Reduce to an expression, or `None` when the attribute is omitted
    pub fn reduce(&self) -> Result<Option<Reduced>, ReduceError> {
        V::reduce_attribute(self)
    }
}

fn list_items(value: &Value) -> Vec<String> {
    value.as_list().map(<[String]>::to_vec).unwrap_or_default()
}

fn reduce_list<V: ListValue + ReduceValue>(attr: &Attribute<V>) -> Option<Reduced> {
    let mut parts = Vec::new();
    let base = list_items(&attr.value().to_value());
    if !base.is_empty() {
        parts.push(Part::Value(Value::List(base)));
    }

    for axis in attr.axes() {
        let Some(values) = attr.configurable_values(axis) else {
            continue;
        };
        let default = values
            .get(CONDITIONS_DEFAULT)
            .map(|v| list_items(&v.to_value()))
            .unwrap_or_default();

        let mut branches: Vec<Branch> = values
            .iter()
            .filter(|(key, _)| key.as_str() != CONDITIONS_DEFAULT)
            .filter_map(|(key, value)| {
                let items = list_items(&value.to_value());
                let keep_empty = attr.emit_empty_list && items.is_empty();
                (items != default || keep_empty).then(|| Branch {
                    condition: axis.select_key(key),
                    key: key.clone(),
                    value: Value::List(items),
                })
            })
            .collect();

        let part = if branches.is_empty() {
            // Every configuration of the axis sees the default
            if default.is_empty() {
                continue;
            }
            Part::Value(Value::List(default))
        } else {
            branches.sort_by(|a, b| a.condition.cmp(&b.condition));
            Part::Select(Select {
                axis: axis.to_string(),
                configuration_axis: axis.clone(),
                branches,
                default: Value::List(default),
            })
        };

        if attr.prepend {
            parts.insert(0, part);
        } else {
            parts.push(part);
        }
    }

    if parts.is_empty() {
        let specified = !attr.value().is_nil() || attr.has_configurable_values();
        if attr.force_specify_empty_list && specified {
            return Some(Reduced::literal(Value::List(Vec::new())));
        }
        return None;
    }
    Some(Reduced { parts })
}

fn reduce_scalar<T>(attr: &Attribute<Option<T>>) -> Result<Option<Reduced>, ReduceError>
where
    T: Clone + PartialEq + fmt::Debug,
    Option<T>: ReduceValue,
{
    let mut attr = attr.clone();
    if attr.axes().count() > 1 {
        attr.collapse()?;
    }

    let axes: Vec<ConfigurationAxis> = attr.axes().cloned().collect();
    let base = attr.value().to_value();
    match axes.as_slice() {
        [] => Ok((base != Value::None).then(|| Reduced::literal(base))),
        [axis] => {
            let default = attr
                .get(axis, CONDITIONS_DEFAULT)
                .map(|v| v.to_value())
                .unwrap_or(base);
            let mut branches: Vec<Branch> = attr
                .configurable_values(axis)
                .into_iter()
                .flatten()
                .filter(|(key, _)| key.as_str() != CONDITIONS_DEFAULT)
                .map(|(key, value)| Branch {
                    condition: axis.select_key(key),
                    key: key.clone(),
                    value: value.to_value(),
                })
                .filter(|branch| branch.value != default)
                .collect();
            if branches.is_empty() {
                return Ok((default != Value::None).then(|| Reduced::literal(default)));
            }
            branches.sort_by(|a, b| a.condition.cmp(&b.condition));
            Ok(Some(Reduced {
                parts: vec![Part::Select(Select {
                    axis: axis.to_string(),
                    configuration_axis: axis.clone(),
                    branches,
                    default,
                })],
            }))
        }
        _ => {
            let names: Vec<String> = axes.iter().map(|a| a.to_string()).collect();
            Err(ReduceError::MultipleAxes(names.join(", ")))
        }
    }
}
