//! Module hierarchy models.
//!
//! Discovery allocates every module in a flat arena ([`ModuleForest`]) and
//! links entries by index. [`ModuleForest::to_tree`] turns the arena into the
//! nested [`ModuleNode`] shape used for serialization.

use serde::{Deserialize, Serialize};

use super::CodeUnit;

/// A discovered module in nested (tree) form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    /// `sha256("{depth}-{name}")`; siblings with equal names share an id
    pub id: String,
    pub name: String,
    /// Top-level modules have level 1
    pub level: usize,
    /// Units directly in this community
    pub members: Vec<CodeUnit>,
    /// Empty when the community could not be split further
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submodules: Vec<ModuleNode>,
}

impl ModuleNode {
    /// Whether this module has no submodules
    pub fn is_leaf(&self) -> bool {
        self.submodules.is_empty()
    }

    /// Total number of modules in this subtree, including `self`
    pub fn module_count(&self) -> usize {
        1 + self.submodules.iter().map(Self::module_count).sum::<usize>()
    }

    /// Member names in member order
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|unit| unit.name.as_str()).collect()
    }
}

/// A discovered module in arena form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub id: String,
    pub name: String,
    pub level: usize,
    pub members: Vec<CodeUnit>,
    /// Arena index of the parent module
    pub parent: Option<usize>,
    /// Arena indices of submodules, in discovery order
    pub children: Vec<usize>,
}

/// Flat arena holding the whole module hierarchy of one discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleForest {
    entries: Vec<ModuleEntry>,
    roots: Vec<usize>,
}

impl ModuleForest {
    /// Create an empty forest
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module, linking it under `parent` (or as a root). Returns its index.
    pub fn push(
        &mut self,
        id: String,
        name: String,
        level: usize,
        members: Vec<CodeUnit>,
        parent: Option<usize>,
    ) -> usize {
        let index = self.entries.len();
        self.entries.push(ModuleEntry {
            id,
            name,
            level,
            members,
            parent,
            children: Vec::new(),
        });

        match parent.and_then(|p| self.entries.get_mut(p)) {
            Some(parent_entry) => parent_entry.children.push(index),
            None => self.roots.push(index),
        }
        index
    }

    /// Number of modules at every level
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level modules
    pub fn roots(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.roots.iter().map(move |&i| &self.entries[i])
    }

    pub fn get(&self, index: usize) -> Option<&ModuleEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ModuleEntry] {
        &self.entries
    }

    /// Submodules of the module at `index`
    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &ModuleEntry> {
        self.entries
            .get(index)
            .map(|entry| entry.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&i| &self.entries[i])
    }

    /// All modules carrying `id`. More than one result means an id collision.
    pub fn find_by_id(&self, id: &str) -> Vec<&ModuleEntry> {
        self.entries.iter().filter(|entry| entry.id == id).collect()
    }

    /// Deepest level present (0 for an empty forest)
    pub fn max_level(&self) -> usize {
        self.entries.iter().map(|entry| entry.level).max().unwrap_or(0)
    }

    /// Convert to the nested output shape
    pub fn to_tree(&self) -> Vec<ModuleNode> {
        self.roots.iter().map(|&i| self.build_node(i)).collect()
    }

    fn build_node(&self, index: usize) -> ModuleNode {
        let entry = &self.entries[index];
        ModuleNode {
            id: entry.id.clone(),
            name: entry.name.clone(),
            level: entry.level,
            members: entry.members.clone(),
            submodules: entry.children.iter().map(|&c| self.build_node(c)).collect(),
        }
    }

    /// Serialize the nested tree as pretty JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_tree())?)
    }
}
