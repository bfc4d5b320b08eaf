// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use ruleport::axis::{Arch, Os};
use ruleport::{Configuration, ConversionOptions, ConversionReport, Converter, ModuleGraph, Rule, Value};

/// Parse a TOML module graph, panicking on invalid input
pub fn graph(toml: &str) -> ModuleGraph {
    let graph = ModuleGraph::from_toml_str(toml).unwrap();
    graph.validate().unwrap();
    graph
}

/// Convert a TOML module graph with the default options
pub fn convert(toml: &str) -> ConversionReport {
    convert_with(toml, ConversionOptions::default())
}

pub fn convert_with(toml: &str, options: ConversionOptions) -> ConversionReport {
    Converter::new(options).convert_graph(&graph(toml))
}

/// Find a rule by name
pub fn rule<'a>(report: &'a ConversionReport, name: &str) -> &'a Rule {
    report
        .rules
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no rule named {name}"))
}

/// Rendered attribute, or `None` when the rule omits it
pub fn attr(rule: &Rule, name: &str) -> Option<String> {
    rule.attr(name).map(|r| r.to_string())
}

/// Evaluate an attribute under one configuration as a string list
pub fn eval_list(rule: &Rule, name: &str, config: &Configuration) -> Vec<String> {
    match rule.attr(name).map(|r| r.evaluate(config)) {
        Some(Value::List(items)) => items,
        Some(other) => panic!("{name} is not a list: {other}"),
        None => Vec::new(),
    }
}

pub fn android_arm64() -> Configuration {
    Configuration::new(Os::Android, Arch::Arm64)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
