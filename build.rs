// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: module graph path
fn graph_arg() -> Arg {
    Arg::new("graph")
        .required(true)
        .value_name("GRAPH")
        .help("Module graph file (.toml or .json)")
}

fn build_cli() -> Command {
    Command::new("ruleport")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Ruleport Contributors")
        .about("Convert legacy build modules into configurable build rules")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .value_name("PATH")
                .help("Converter options file (TOML)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a module graph and write the rules as JSON")
                .arg(graph_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .help("Output file (default: stdout)"),
                )
                .arg(
                    Arg::new("fail_fast")
                        .long("fail-fast")
                        .action(ArgAction::SetTrue)
                        .help("Stop at the first module that fails to convert"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Convert a module graph and report errors only")
                .arg(graph_arg()),
        )
        .subcommand(
            Command::new("modules")
                .about("List the modules of a graph and the rules each converts to")
                .arg(graph_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("ruleport.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
