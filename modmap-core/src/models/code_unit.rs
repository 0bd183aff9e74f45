//! Code unit models.
//!
//! A [`CodeUnit`] is one analyzable declaration handed over by the external
//! extractor. Units are immutable inside the engine.

use serde::{Deserialize, Serialize};

use crate::ids;

/// Declaration kind of a code unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Function,
    Class,
    Method,
    Interface,
    TypeAlias,
    Variable,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Method => "method",
            Self::Interface => "interface",
            Self::TypeAlias => "type_alias",
            Self::Variable => "variable",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Reference from one unit to another unit it statically uses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitDependency {
    /// Id of the referenced unit
    pub id: String,
    pub name: String,
    pub kind: UnitKind,
    /// File owning the referenced unit
    pub path: String,
}

/// One declaration (function, class, method, interface, type alias, variable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUnit {
    /// Content-addressed id, stable for identical path + content
    pub id: String,
    pub name: String,
    pub kind: UnitKind,
    /// Owning file. Filled from the enclosing [`FileRecord`] when omitted.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub start_line: usize,
    #[serde(default)]
    pub end_line: usize,
    #[serde(default)]
    pub dependencies: Vec<UnitDependency>,
    /// Source text, if the extractor kept it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CodeUnit {
    /// Create a unit with no dependencies and no line span
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: UnitKind,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            path: path.into(),
            start_line: 0,
            end_line: 0,
            dependencies: Vec::new(),
            content: None,
        }
    }

    /// Create a unit whose id is derived from its path and source text
    pub fn from_content(
        name: impl Into<String>,
        kind: UnitKind,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let content = content.into();
        let mut unit = Self::new(Self::content_id(&path, &content), name, kind, path);
        unit.content = Some(content);
        unit
    }

    /// Stable id for a declaration: SHA-256 of path followed by content
    pub fn content_id(path: &str, content: &str) -> String {
        ids::sha256_hex(&format!("{path}{content}"))
    }

    /// Set the line span
    #[must_use]
    pub fn with_lines(mut self, start_line: usize, end_line: usize) -> Self {
        self.start_line = start_line;
        self.end_line = end_line;
        self
    }

    /// Record a static reference to `target`
    #[must_use]
    pub fn with_dependency(mut self, target: &Self) -> Self {
        self.dependencies.push(target.as_dependency());
        self
    }

    /// Describe this unit as the target of a dependency edge
    pub fn as_dependency(&self) -> UnitDependency {
        UnitDependency {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            path: self.path.clone(),
        }
    }

    /// Whether this unit statically uses the unit with `id`
    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|dep| dep.id == id)
    }

    /// Number of source lines spanned (0 when the span is unknown)
    pub const fn line_count(&self) -> usize {
        if self.end_line >= self.start_line && self.end_line > 0 {
            self.end_line - self.start_line + 1
        } else {
            0
        }
    }
}

/// Extractor output for one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default)]
    pub units: Vec<CodeUnit>,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, units: Vec<CodeUnit>) -> Self {
        Self {
            path: path.into(),
            units,
        }
    }
}
