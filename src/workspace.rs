use crate::document::{Document, Variable};
use crate::library::{CollectionHandle, Library, LibraryError};

/// The loaded document plus the shared libraries configured for one run.
/// Every store consultation goes through here as an awaited call, so each
/// lookup is an explicit suspension point and nothing caches variable
/// names across them.
pub struct Workspace {
    pub document: Document,
    libraries: Vec<Library>,
}

impl Workspace {
    pub fn new(document: Document, libraries: Vec<Library>) -> Workspace {
        Workspace {
            document,
            libraries,
        }
    }

    /// Looks up a variable by document-local id. Bindings can carry ids
    /// whose variable has since been deleted, so None is a normal outcome.
    pub async fn variable_by_id(&self, id: &str) -> Option<Variable> {
        self.document.variable_by_id(id).cloned()
    }

    pub async fn local_variables(&self) -> Vec<Variable> {
        self.document.variables.clone()
    }

    /// Collections across all configured libraries, in library order and
    /// then each library's own enumeration order.
    pub async fn available_collections(&self) -> Result<Vec<CollectionHandle>, LibraryError> {
        let mut collections = vec![];
        for library in &self.libraries {
            collections.extend(library.available_collections().await?);
        }
        Ok(collections)
    }

    /// Imports a shared variable into the document's local scope by its
    /// stable key. Idempotent: a key that is already registered returns the
    /// existing handle rather than a duplicate.
    pub async fn import_by_key(&mut self, key: &str) -> Result<Variable, LibraryError> {
        if key.is_empty() {
            return Err(LibraryError::UnknownKey(key.to_string()));
        }
        if let Some(existing) = self.document.variable_by_key(key) {
            return Ok(existing.clone());
        }
        for library in &self.libraries {
            if let Some(found) = library.find_by_key(key).await? {
                return Ok(self.document.register_import(&found));
            }
        }
        Err(LibraryError::UnknownKey(key.to_string()))
    }
}

// --
