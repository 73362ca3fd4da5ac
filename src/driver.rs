use colored::*;
use indexmap::IndexMap;

use crate::config;
use crate::document::PaintProperty;
use crate::library::LibraryError;
use crate::rewriter;
use crate::workspace::Workspace;

/// Per-run configuration, resolved from the config file and command line
/// before the run starts. Passed in rather than read from globals so one
/// process can run different policies against different documents.
pub struct RunOptions {
    pub rename_table: IndexMap<String, String>,
    pub properties: Vec<PaintProperty>,
    pub debug: bool,
}

pub struct RunSummary {
    pub changes_made: usize,
    pub nodes_visited: usize,
}

impl RunSummary {
    pub fn mk_summary_string(&self) -> String {
        format!("{} changes made.", self.changes_made)
    }
}

/// Processes the selection in order, one node at a time; the outcome of one
/// node never affects another. Recoverable per-node problems are logged and
/// skipped; a store failure aborts the remaining selection.
pub async fn run(
    workspace: &mut Workspace,
    selection: &[String],
    options: &RunOptions,
) -> Result<RunSummary, LibraryError> {
    if selection.is_empty() {
        println!("{}", "No nodes selected".yellow());
        return Ok(RunSummary {
            changes_made: 0,
            nodes_visited: 0,
        });
    }

    if options.debug {
        let _ = config::write_to_debug_log(format!(
            "--- run started {}\n",
            chrono::Local::now().to_rfc3339()
        ));
    }

    let mut changes_made = 0;
    let mut nodes_visited = 0;
    for node_id in selection {
        let Some(node) = workspace.document.node(node_id) else {
            eprintln!("error: no node with id '{}' in document", node_id);
            continue;
        };
        if options.debug {
            let _ = config::write_to_debug_log(format!("Node: {}\n", node.name));
        }
        changes_made += rewriter::rewrite_node(
            workspace,
            node_id,
            &options.rename_table,
            &options.properties,
            options.debug,
        )
        .await?;
        nodes_visited += 1;
        if options.debug {
            let _ = config::write_to_debug_log("---\n".to_string());
        }
    }

    if options.debug {
        let _ = config::write_to_debug_log(format!(
            "--- run finished: {} nodes, {} changes\n",
            nodes_visited, changes_made
        ));
    }

    Ok(RunSummary {
        changes_made,
        nodes_visited,
    })
}

// --
