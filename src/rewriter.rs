use indexmap::IndexMap;

use crate::config;
use crate::document::{bind_color_on_paint, BindingSet, Paint, PaintProperty, VariableAlias};
use crate::library::LibraryError;
use crate::resolver;
use crate::workspace::Workspace;

/// One discovered binding: which property it sits on and the variable's
/// current display name. Names are read back through the store at discovery
/// time; a variable renamed since it was bound matches the rename table
/// under its current name, never a stale one.
#[derive(Debug)]
pub struct AppliedVariable {
    pub property: String,
    pub name: String,
}

/// Flattens a node's bound-variable references into (property, name) pairs
/// in document order. Single and list-shaped bindings normalize to the same
/// flat sequence; aliases whose id no longer resolves are skipped.
pub async fn node_variables(workspace: &Workspace, node_id: &str) -> Vec<AppliedVariable> {
    let Some(node) = workspace.document.node(node_id) else {
        return vec![];
    };
    let mut variables = vec![];
    for (property, bindings) in &node.bound_variables {
        for alias in bindings.aliases() {
            if let Some(variable) = workspace.variable_by_id(&alias.id).await {
                variables.push(AppliedVariable {
                    property: property.clone(),
                    name: variable.name,
                });
            }
        }
    }
    variables
}

/// Rewrites one node's color bindings per the rename table and returns the
/// number of paint entries rebound.
///
/// For each discovered binding on a rewritable property whose current name
/// is a rename-table key: resolve the replacement, then rebuild the whole
/// paint array with every solid entry rebound to it (non-solid entries pass
/// through untouched) and assign it back in a single write. Unresolvable
/// replacements and unsupported properties are logged and skipped; only
/// store failures propagate.
pub async fn rewrite_node(
    workspace: &mut Workspace,
    node_id: &str,
    rename_table: &IndexMap<String, String>,
    properties: &[PaintProperty],
    debug: bool,
) -> Result<usize, LibraryError> {
    let variables = node_variables(workspace, node_id).await;
    if variables.is_empty() {
        if debug {
            let _ = config::write_to_debug_log("No variables applied\n".to_string());
        }
        return Ok(0);
    }

    let mut changes = 0;
    for applied in &variables {
        if debug {
            let _ = config::write_to_debug_log(format!(
                "- {}: {}\n",
                applied.property, applied.name
            ));
        }
        let Some(property) = PaintProperty::from_binding_key(&applied.property) else {
            continue;
        };
        if !properties.contains(&property) {
            continue;
        }
        let Some(new_name) = rename_table.get(&applied.name) else {
            continue;
        };
        if debug {
            let _ =
                config::write_to_debug_log(format!("  Should be changed to: {}\n", new_name));
        }

        let Some(new_variable) =
            resolver::find_variable_by_name(workspace, new_name, debug).await?
        else {
            eprintln!("error: replacement variable '{}' not found", new_name);
            continue;
        };

        // node_variables found the node already; a vanishing id here would
        // mean the document changed mid-run, which nothing does.
        let Some(node) = workspace.document.node_mut(node_id) else {
            continue;
        };
        if !node.supports(property) {
            eprintln!("error: node '{}' doesn't support {}", node.name, property);
            continue;
        }
        let Some(paints) = node.paints(property) else {
            continue;
        };

        let mut next_paints = Vec::with_capacity(paints.len());
        let mut next_aliases = vec![];
        let mut rebound = 0;
        for paint in paints {
            match paint {
                Paint::Solid(solid) => {
                    next_paints.push(Paint::Solid(bind_color_on_paint(solid, &new_variable)));
                    next_aliases.push(VariableAlias::to_variable(&new_variable));
                    rebound += 1;
                }
                Paint::Other(other) => next_paints.push(Paint::Other(other.clone())),
            }
        }
        node.set_paints(property, next_paints);
        if rebound > 0 {
            // The node's bound-variable view tracks the paints it was
            // derived from; replace it wholesale for this property, never
            // in place.
            node.bound_variables.insert(
                property.as_str().to_string(),
                BindingSet::Multiple(next_aliases),
            );
        }
        changes += rebound;

        if debug {
            let _ = config::write_to_debug_log(format!(
                "  Rebound {} {} entries to: {}\n",
                rebound, property, new_name
            ));
        }
    }
    Ok(changes)
}

// --
