use crate::config;
use crate::document::Variable;
use crate::library::LibraryError;
use crate::workspace::Workspace;

/// Resolves a variable display name to a usable handle.
///
/// Locally defined variables win outright on an exact, case-sensitive name
/// match. Otherwise shared collections are scanned in enumeration order and
/// the first name match is imported into the document; later collections
/// are not consulted. `Ok(None)` means the name exists nowhere, which
/// callers log and skip rather than treat as fatal.
pub async fn find_variable_by_name(
    workspace: &mut Workspace,
    name: &str,
    debug: bool,
) -> Result<Option<Variable>, LibraryError> {
    for variable in workspace.local_variables().await {
        if variable.name == name {
            return Ok(Some(variable));
        }
    }

    for collection in workspace.available_collections().await? {
        let variables = collection.variables().await?;
        if let Some(found) = variables.iter().find(|v| v.name == name) {
            let imported = workspace.import_by_key(&found.key).await?;
            if debug {
                let _ = config::write_to_debug_log(format!(
                    "Imported '{}' from collection: {}\n",
                    imported.name, collection.name
                ));
            }
            return Ok(Some(imported));
        }
    }

    Ok(None)
}

// --

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::library::Library;
    use serde_json::json;
    use std::fs;
    use std::path::Path;

    fn document_with_local_600() -> Document {
        serde_json::from_value(json!({
            "name": "doc",
            "variables": [
                {"id": "VariableID:local-600", "key": "", "name": "Neutral/600"},
            ],
        }))
        .unwrap()
    }

    fn write_neutrals_collection(dir: &Path) {
        fs::write(
            dir.join("neutrals.json"),
            json!({
                "key": "col-neutrals",
                "name": "Neutrals",
                "variables": [
                    {"id": "VariableID:lib-600", "key": "vk-600", "name": "Neutral/600"},
                    {"id": "VariableID:lib-700", "key": "vk-700", "name": "Neutral/700"},
                ],
            })
            .to_string(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_local_scope_wins_over_library() {
        let dir = tempfile::tempdir().unwrap();
        write_neutrals_collection(dir.path());

        let mut workspace =
            Workspace::new(document_with_local_600(), vec![Library::new(dir.path())]);
        let resolved = find_variable_by_name(&mut workspace, "Neutral/600", false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, "VariableID:local-600");
        // No import happened
        assert_eq!(workspace.document.variables.len(), 1);
    }

    #[tokio::test]
    async fn test_library_fallback_imports_first_match() {
        let dir = tempfile::tempdir().unwrap();
        write_neutrals_collection(dir.path());

        let document: Document = serde_json::from_value(json!({"name": "doc"})).unwrap();
        let mut workspace = Workspace::new(document, vec![Library::new(dir.path())]);

        let resolved = find_variable_by_name(&mut workspace, "Neutral/700", false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.name, "Neutral/700");
        assert_eq!(resolved.key, "vk-700");
        assert!(resolved.remote);
        assert_eq!(workspace.document.variables.len(), 1);

        // Resolving again finds the registered import locally
        let again = find_variable_by_name(&mut workspace, "Neutral/700", false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.id, resolved.id);
        assert_eq!(workspace.document.variables.len(), 1);
    }

    #[tokio::test]
    async fn test_first_collection_wins() {
        let dir = tempfile::tempdir().unwrap();
        for (file, collection_key, variable_key) in [
            ("a.json", "col-a", "vk-a"),
            ("b.json", "col-b", "vk-b"),
        ] {
            fs::write(
                dir.path().join(file),
                json!({
                    "key": collection_key,
                    "name": collection_key,
                    "variables": [
                        {"id": format!("VariableID:{}", variable_key), "key": variable_key, "name": "Shared/tone"},
                    ],
                })
                .to_string(),
            )
            .unwrap();
        }

        let document: Document = serde_json::from_value(json!({"name": "doc"})).unwrap();
        let mut workspace = Workspace::new(document, vec![Library::new(dir.path())]);
        let resolved = find_variable_by_name(&mut workspace, "Shared/tone", false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.key, "vk-a");
    }

    #[tokio::test]
    async fn test_unresolvable_name_is_none() {
        let dir = tempfile::tempdir().unwrap();
        write_neutrals_collection(dir.path());

        let mut workspace =
            Workspace::new(document_with_local_600(), vec![Library::new(dir.path())]);
        let resolved = find_variable_by_name(&mut workspace, "Neutral/900", false)
            .await
            .unwrap();
        assert!(resolved.is_none());
        assert_eq!(workspace.document.variables.len(), 1);
    }
}
