use clap::{Parser, Subcommand};
use colored::*;
use std::error::Error;
use std::process;

mod config;
mod document;
mod driver;
mod library;
mod resolver;
mod rewriter;
mod workspace;

use document::{Document, PaintProperty};
use library::Library;
use workspace::Workspace;

/// A CLI for migrating design-token color bindings between documents and
/// shared libraries
#[derive(Parser)]
#[command(name = "rebind")]
#[command(
    about = "A CLI for migrating design-token color bindings",
    version = "0.3.0"
)]
struct Cli {
    /// Log diagnostics to ~/.rebind/debug.log
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Non-default path to config file (defaults to ~/.rebind/rebind.toml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<String>,

    /// Shared-library collection directory (repeatable; searched in order)
    #[arg(short = 'l', long = "library", value_name = "DIR")]
    library: Vec<String>,

    /// Node id to process instead of the document's recorded selection
    /// (repeatable; order is processing order)
    #[arg(short = 's', long = "select", value_name = "NODE_ID")]
    select: Vec<String>,

    /// Write the transformed document here instead of in place
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<String>,

    /// Resolve and report without writing the document back
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Also rewrite stroke color bindings
    #[arg(long = "strokes")]
    strokes: bool,

    /// Path to the document to migrate
    document: Option<String>,

    /// Subcommands for the CLI
    #[command(subcommand)]
    subcommand: Option<CliSubcommand>,
}

#[derive(Subcommand)]
enum CliSubcommand {
    /// List each selected node's bound variables without rewriting anything
    Vars {
        /// Path to the document to inspect
        document: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let config_path_override = args.config;
    if config_path_override.is_none() {
        config::create_config_dir_if_missing().expect("Could not create dir");
    }
    let cfg = match config::get_config(&config_path_override) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    // Command-line libraries are searched before configured ones
    let mut library_dirs = args.library.clone();
    library_dirs.extend(cfg.libraries.iter().cloned());

    if let Some(CliSubcommand::Vars { document }) = args.subcommand {
        let workspace = load_workspace(&document, &library_dirs).await?;
        let selection = choose_selection(&args.select, &workspace.document);
        list_vars(&workspace, &selection).await;
        return Ok(());
    }

    let Some(document_path) = args.document else {
        eprintln!("error: no document given");
        process::exit(1);
    };

    let mut properties = cfg.properties.clone();
    if args.strokes && !properties.contains(&PaintProperty::Strokes) {
        properties.push(PaintProperty::Strokes);
    }

    let mut workspace = load_workspace(&document_path, &library_dirs).await?;
    let selection = choose_selection(&args.select, &workspace.document);

    let options = driver::RunOptions {
        rename_table: cfg.rename,
        properties,
        debug: args.debug,
    };
    let summary = driver::run(&mut workspace, &selection, &options).await?;

    if !selection.is_empty() && !args.dry_run {
        let target = args.output.as_deref().unwrap_or(&document_path);
        workspace.document.save(target).await?;
    }

    println!("{}", summary.mk_summary_string());
    Ok(())
}

async fn load_workspace(
    document_path: &str,
    library_dirs: &[String],
) -> Result<Workspace, Box<dyn Error>> {
    let document = Document::load(document_path).await?;
    let libraries = library_dirs.iter().map(Library::new).collect();
    Ok(Workspace::new(document, libraries))
}

fn choose_selection(select: &[String], document: &Document) -> Vec<String> {
    if select.is_empty() {
        document.selection.clone()
    } else {
        select.to_vec()
    }
}

async fn list_vars(workspace: &Workspace, selection: &[String]) {
    if selection.is_empty() {
        println!("{}", "No nodes selected".yellow());
        return;
    }
    for node_id in selection {
        let Some(node) = workspace.document.node(node_id) else {
            eprintln!("error: no node with id '{}' in document", node_id);
            continue;
        };
        println!("Node: {}", node.name.bold());
        let variables = rewriter::node_variables(workspace, node_id).await;
        if variables.is_empty() {
            println!("No variables applied");
        } else {
            println!("Applied variables:");
            for variable in &variables {
                println!("- {}: {}", variable.property, variable.name);
            }
        }
        println!("---");
    }
}
