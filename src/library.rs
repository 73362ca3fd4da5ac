use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::document::Variable;

#[derive(Debug)]
pub enum LibraryError {
    Io(std::io::Error),
    Malformed {
        path: String,
        source: serde_json::Error,
    },
    UnknownKey(String),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Io(e) => write!(f, "Library IO Error: {}", e),
            LibraryError::Malformed { path, source } => {
                write!(f, "Malformed collection '{}': {}", path, source)
            }
            LibraryError::UnknownKey(key) => {
                write!(f, "No library variable with key '{}'", key)
            }
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LibraryError::Io(e) => Some(e),
            LibraryError::Malformed { source, .. } => Some(source),
            LibraryError::UnknownKey(_) => None,
        }
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(error: std::io::Error) -> Self {
        LibraryError::Io(error)
    }
}

/// On-disk shape of one collection file.
#[derive(Debug, Deserialize, Serialize)]
struct CollectionFile {
    key: String,
    name: String,
    #[serde(default)]
    variables: Vec<Variable>,
}

/// One enumerated shared collection. Holds the backing file path so the
/// variable list can be fetched on demand rather than eagerly for every
/// collection in the library.
#[derive(Clone, Debug)]
pub struct CollectionHandle {
    pub key: String,
    pub name: String,
    path: PathBuf,
}

impl CollectionHandle {
    pub async fn variables(&self) -> Result<Vec<Variable>, LibraryError> {
        Ok(read_collection_file(&self.path).await?.variables)
    }
}

async fn read_collection_file(path: &Path) -> Result<CollectionFile, LibraryError> {
    let contents = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&contents).map_err(|e| LibraryError::Malformed {
        path: path.display().to_string(),
        source: e,
    })
}

/// A directory of shared collection files, one JSON file per collection.
pub struct Library {
    root: PathBuf,
}

impl Library {
    pub fn new<P: Into<PathBuf>>(root: P) -> Library {
        Library { root: root.into() }
    }

    /// Enumerates collections in a deterministic order: the order listed in
    /// a `collections.json` manifest when one is present, otherwise sorted
    /// file order. Scans honor this order exactly, so the manifest is how a
    /// library controls which collection wins a first-match search.
    pub async fn available_collections(&self) -> Result<Vec<CollectionHandle>, LibraryError> {
        let manifest_path = self.root.join("collections.json");
        let files = match tokio::fs::read_to_string(&manifest_path).await {
            Ok(contents) => {
                let names: Vec<String> =
                    serde_json::from_str(&contents).map_err(|e| LibraryError::Malformed {
                        path: manifest_path.display().to_string(),
                        source: e,
                    })?;
                names.into_iter().map(|name| self.root.join(name)).collect()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let mut entries = tokio::fs::read_dir(&self.root).await?;
                let mut files = vec![];
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    if path.extension().and_then(|ext| ext.to_str()) == Some("json")
                        && path.file_name().and_then(|name| name.to_str())
                            != Some("collections.json")
                    {
                        files.push(path);
                    }
                }
                files.sort();
                files
            }
            Err(e) => return Err(e.into()),
        };

        let mut collections = vec![];
        for path in files {
            let file = read_collection_file(&path).await?;
            collections.push(CollectionHandle {
                key: file.key,
                name: file.name,
                path,
            });
        }
        Ok(collections)
    }

    /// Scans collections in enumeration order for a variable with the given
    /// stable key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<Variable>, LibraryError> {
        for collection in self.available_collections().await? {
            let variables = collection.variables().await?;
            if let Some(found) = variables.into_iter().find(|v| v.key == key) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

// --
