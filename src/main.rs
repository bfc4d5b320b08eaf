// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use ruleport::lookup::ModuleIndex;
use ruleport::{ConversionOptions, ConversionReport, Converter, ModuleGraph, convert_module};
use std::fs;
use std::path::Path;
use tracing::{error, info};

mod cli;

use cli::{Cli, Commands};

fn load_graph(path: &Path) -> Result<ModuleGraph> {
    let graph = ModuleGraph::load(path)
        .with_context(|| format!("Failed to load module graph {}", path.display()))?;
    graph
        .validate()
        .with_context(|| format!("Invalid module graph {}", path.display()))?;
    Ok(graph)
}

fn report_errors(report: &ConversionReport) {
    for failure in &report.errors {
        for err in &failure.errors {
            error!("{}: {}", failure.module, err);
        }
    }
}

fn ensure_success(report: &ConversionReport) -> Result<()> {
    if report.is_success() {
        return Ok(());
    }
    Err(ruleport::Error::ConversionFailed {
        count: report.errors.len(),
    }
    .into())
}

fn cmd_convert(options: ConversionOptions, graph: &Path, output: Option<&Path>) -> Result<()> {
    let graph = load_graph(graph)?;
    let report = Converter::new(options).convert_graph(&graph);
    report_errors(&report);

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize rules")?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} rules to {}", report.rules.len(), path.display());
        }
        None => println!("{}", json),
    }
    ensure_success(&report)
}

fn cmd_check(options: ConversionOptions, graph: &Path) -> Result<()> {
    let graph = load_graph(graph)?;
    let report = Converter::new(options).convert_graph(&graph);
    report_errors(&report);
    if report.is_success() {
        println!(
            "{} modules converted, {} skipped, {} missing dependencies",
            report.converted,
            report.skipped.len(),
            report.missing_dep_count()
        );
    }
    ensure_success(&report)
}

fn cmd_modules(options: ConversionOptions, graph: &Path) -> Result<()> {
    let graph = load_graph(graph)?;
    let index = ModuleIndex::from_graph(&graph);
    for def in &graph.modules {
        if !def.convert {
            println!("{} ({}): skipped", def.name, def.kind);
            continue;
        }
        match convert_module(def, &index, &options) {
            Ok(conversion) => {
                let rules: Vec<String> = conversion
                    .rules
                    .iter()
                    .map(|rule| format!("{}:{}", rule.kind, rule.name))
                    .collect();
                println!("{} ({}): {}", def.name, def.kind, rules.join(", "));
            }
            Err(errors) => println!("{} ({}): {} error(s)", def.name, def.kind, errors.len()),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut options = ConversionOptions::load(cli.config.as_deref()).context("Failed to load converter options")?;

    match cli.command {
        Commands::Convert {
            graph,
            output,
            fail_fast,
        } => {
            options.fail_fast |= fail_fast;
            cmd_convert(options, &graph, output.as_deref())
        }
        Commands::Check { graph } => cmd_check(options, &graph),
        Commands::Modules { graph } => cmd_modules(options, &graph),
    }
}
