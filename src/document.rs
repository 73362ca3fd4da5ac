use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// RGBA color with channels normalized to 0..1, matching the document's
/// own serialization of paint colors and variable values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "default_alpha")]
    pub a: f64,
}

const fn default_alpha() -> f64 {
    1.0
}

/// A named color token owned by the document or by a shared library.
///
/// `id` is only meaningful within one document; `key` is the stable
/// cross-document identity used to request library imports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    #[serde(default)]
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub remote: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Color>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Reference from a bound property to a variable, by document-local id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableAlias {
    #[serde(rename = "type", default = "variable_alias_kind")]
    pub kind: String,
    pub id: String,
}

fn variable_alias_kind() -> String {
    "VARIABLE_ALIAS".to_string()
}

impl VariableAlias {
    pub fn to_variable(variable: &Variable) -> Self {
        VariableAlias {
            kind: variable_alias_kind(),
            id: variable.id.clone(),
        }
    }
}

/// A property's bound-variable references. Paint-array properties bind one
/// alias per paint position and serialize as a list; scalar properties
/// serialize as a bare alias object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BindingSet {
    Multiple(Vec<VariableAlias>),
    Single(VariableAlias),
}

impl BindingSet {
    pub fn aliases(&self) -> &[VariableAlias] {
        match self {
            BindingSet::Multiple(aliases) => aliases,
            BindingSet::Single(alias) => std::slice::from_ref(alias),
        }
    }
}

/// The paint properties eligible for rewriting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintProperty {
    Fills,
    Strokes,
}

impl PaintProperty {
    pub fn from_binding_key(key: &str) -> Option<PaintProperty> {
        match key {
            "fills" => Some(PaintProperty::Fills),
            "strokes" => Some(PaintProperty::Strokes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaintProperty::Fills => "fills",
            PaintProperty::Strokes => "strokes",
        }
    }
}

impl fmt::Display for PaintProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker for the only paint kind that carries a color binding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SolidKind {
    #[serde(rename = "SOLID")]
    Solid,
}

/// Per-paint variable bindings. Only `color` is bindable on solid paints;
/// anything else the host may attach is carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaintBindings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<VariableAlias>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolidPaint {
    #[serde(rename = "type")]
    pub kind: SolidKind,
    pub color: Color,
    #[serde(
        rename = "boundVariables",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bound_variables: Option<PaintBindings>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One entry of a fills/strokes array. Solid entries are the only kind this
/// tool touches; every other paint kind (gradients, images, videos) is kept
/// as raw JSON so it round-trips exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paint {
    Solid(SolidPaint),
    Other(Value),
}

/// Returns a copy of `paint` with its color binding replaced by a binding
/// to `variable`. Pure; the caller assigns the rebuilt paint array back to
/// the node in a single write.
pub fn bind_color_on_paint(paint: &SolidPaint, variable: &Variable) -> SolidPaint {
    let mut next = paint.clone();
    let mut bindings = next.bound_variables.take().unwrap_or_default();
    bindings.color = Some(VariableAlias::to_variable(variable));
    next.bound_variables = Some(bindings);
    next
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(
        rename = "boundVariables",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub bound_variables: IndexMap<String, BindingSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Paint>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Node {
    /// Capability check: node types without the property at all (None) are
    /// distinct from nodes with an empty paint array (Some but empty).
    pub fn supports(&self, property: PaintProperty) -> bool {
        self.paints(property).is_some()
    }

    pub fn paints(&self, property: PaintProperty) -> Option<&Vec<Paint>> {
        match property {
            PaintProperty::Fills => self.fills.as_ref(),
            PaintProperty::Strokes => self.strokes.as_ref(),
        }
    }

    pub fn set_paints(&mut self, property: PaintProperty, paints: Vec<Paint>) {
        match property {
            PaintProperty::Fills => self.fills = Some(paints),
            PaintProperty::Strokes => self.strokes = Some(paints),
        }
    }
}

#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Malformed {
        path: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io(e) => write!(f, "Document IO Error: {}", e),
            DocumentError::Malformed { path, source } => {
                write!(f, "Malformed document '{}': {}", path, source)
            }
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DocumentError::Io(e) => Some(e),
            DocumentError::Malformed { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(error: std::io::Error) -> Self {
        DocumentError::Io(error)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    /// Node ids recorded as selected, in selection order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<String>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Document {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Document, DocumentError> {
        let contents = tokio::fs::read_to_string(&path).await?;
        serde_json::from_str(&contents).map_err(|e| DocumentError::Malformed {
            path: path.as_ref().display().to_string(),
            source: e,
        })
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        let mut contents = serde_json::to_string_pretty(self).map_err(|e| {
            DocumentError::Malformed {
                path: path.as_ref().display().to_string(),
                source: e,
            }
        })?;
        contents.push('\n');
        tokio::fs::write(&path, contents).await?;
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn variable_by_id(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == id)
    }

    pub fn variable_by_key(&self, key: &str) -> Option<&Variable> {
        if key.is_empty() {
            return None;
        }
        self.variables.iter().find(|v| v.key == key)
    }

    /// Registers a library variable in the local variable table under a
    /// fresh id and returns the usable handle. Callers must have checked
    /// that the key is not already registered.
    pub fn register_import(&mut self, library_variable: &Variable) -> Variable {
        let mut registered = library_variable.clone();
        registered.id = format!("VariableID:{}", Uuid::now_v7());
        registered.remote = true;
        self.variables.push(registered.clone());
        registered
    }
}

// --
