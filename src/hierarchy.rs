//! Field-of-study hierarchy.
//!
//! Holds the topic nodes of a three-level topic hierarchy (level 0 is the broadest,
//! level 2 the most specific) and answers name, parent and similarity queries.
//!
//! # Example
//!
//! ```
//! use bibliodiv::hierarchy::{FosHierarchy, TopicNode};
//!
//! let hierarchy: FosHierarchy = vec![
//!     TopicNode::new(10, "computer science", 0),
//!     TopicNode::new(20, "human computer interaction", 1).with_level0_parents(vec![10]),
//!     TopicNode::new(21, "world wide web", 1).with_level0_parents(vec![10]),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(hierarchy.similarity(20, 20), 1.0);
//! assert_eq!(hierarchy.similarity(20, 21), 0.25);
//! ```
//!
//! # Similarity
//!
//! Similarity is a weighting kernel, not a distance. It is symmetric but does not
//! satisfy the triangle inequality:
//!
//! 1. identical ids: `1.0`
//! 2. a shared level-1 parent: `0.5`
//! 3. a shared level-0 parent: `0.25`
//! 4. otherwise: `0.125`, never zero

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::io::BufRead;

use crate::{BiblioError, Result};

/// Identifier of a field-of-study node.
pub type TopicId = u64;

/// Deepest level ingested into the hierarchy.
pub const MAX_LEVEL: u8 = 2;

pub const SAME_TOPIC_SIMILARITY: f64 = 1.0;
pub const SHARED_LEVEL1_SIMILARITY: f64 = 0.5;
pub const SHARED_LEVEL0_SIMILARITY: f64 = 0.25;
pub const BASELINE_SIMILARITY: f64 = 0.125;

/// A single field-of-study entry from the hierarchy source.
///
/// Deserializes from the JSON lines layout of the topic table:
/// `{"mag_id": 1, "level": 1, "l0_parent": [..], "l1_parent": null, "normalizedname": ".."}`.
/// Parent links may be `null`, a single id or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicNode {
    #[serde(rename = "mag_id")]
    pub id: TopicId,
    #[serde(rename = "normalizedname")]
    pub name: String,
    pub level: u8,
    #[serde(rename = "l0_parent", default, deserialize_with = "parent_ids")]
    pub level0_parents: Vec<TopicId>,
    #[serde(rename = "l1_parent", default, deserialize_with = "parent_ids")]
    pub level1_parents: Vec<TopicId>,
}

impl TopicNode {
    /// Creates a node without parent links.
    #[must_use]
    pub fn new(id: TopicId, name: &str, level: u8) -> Self {
        Self {
            id,
            name: name.to_string(),
            level,
            level0_parents: Vec::new(),
            level1_parents: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_level0_parents(mut self, parents: Vec<TopicId>) -> Self {
        self.level0_parents = parents;
        self
    }

    #[must_use]
    pub fn with_level1_parents(mut self, parents: Vec<TopicId>) -> Self {
        self.level1_parents = parents;
        self
    }
}

fn parent_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<TopicId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ParentIds {
        One(TopicId),
        Many(Vec<TopicId>),
    }

    Ok(match Option::<ParentIds>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ParentIds::One(id)) => vec![id],
        Some(ParentIds::Many(ids)) => ids,
    })
}

/// Read-only lookup over the field-of-study hierarchy.
///
/// Only nodes with a level of at most [`MAX_LEVEL`] are ingested; deeper nodes are
/// dropped on insertion. Once built, the hierarchy is shared read-only by every
/// diversity computation.
#[derive(Debug, Clone, Default)]
pub struct FosHierarchy {
    names: HashMap<TopicId, String>,
    level0_parents: HashMap<TopicId, Vec<TopicId>>,
    level1_parents: HashMap<TopicId, Vec<TopicId>>,
}

impl FosHierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, returning `false` when it is deeper than [`MAX_LEVEL`] and was skipped.
    pub fn insert(&mut self, node: TopicNode) -> bool {
        if node.level > MAX_LEVEL {
            return false;
        }
        self.level0_parents.insert(node.id, node.level0_parents);
        self.level1_parents.insert(node.id, node.level1_parents);
        self.names.insert(node.id, node.name);
        true
    }

    /// Loads a hierarchy from JSON lines, one [`TopicNode`] per line.
    ///
    /// Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BiblioError::Io`] when reading fails and [`BiblioError::MalformedInput`]
    /// for a line that is not a valid topic node.
    pub fn from_json_lines<R: BufRead>(reader: R) -> Result<Self> {
        let mut hierarchy = Self::new();
        let mut skipped = 0usize;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let node: TopicNode =
                serde_json::from_str(&line).map_err(|e| BiblioError::MalformedInput {
                    message: e.to_string(),
                    line: i + 1,
                })?;
            if !hierarchy.insert(node) {
                skipped += 1;
            }
        }

        tracing::info!(
            topics = hierarchy.len(),
            skipped_deeper = skipped,
            "loaded field-of-study hierarchy"
        );
        Ok(hierarchy)
    }

    /// Loads a hierarchy from a CSV table with the header
    /// `id,name,level,l0_parent,l1_parent`.
    ///
    /// Parent cells hold zero or more `;`-separated topic ids.
    ///
    /// # Errors
    ///
    /// Returns [`BiblioError::InvalidFormat`] for rows the CSV reader rejects and
    /// [`BiblioError::InvalidFieldValue`] for parent cells that are not ids.
    #[cfg(feature = "csv")]
    pub fn from_csv<R: std::io::Read>(reader: R) -> Result<Self> {
        #[derive(Deserialize)]
        struct TopicRow {
            id: TopicId,
            name: String,
            level: u8,
            l0_parent: Option<String>,
            l1_parent: Option<String>,
        }

        let mut hierarchy = Self::new();
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        for row in reader.deserialize() {
            let row: TopicRow = row?;
            hierarchy.insert(TopicNode {
                id: row.id,
                name: row.name,
                level: row.level,
                level0_parents: split_parent_cell("l0_parent", row.l0_parent.as_deref())?,
                level1_parents: split_parent_cell("l1_parent", row.l1_parent.as_deref())?,
            });
        }

        tracing::info!(topics = hierarchy.len(), "loaded field-of-study hierarchy");
        Ok(hierarchy)
    }

    /// Number of ingested topics.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, id: TopicId) -> bool {
        self.names.contains_key(&id)
    }

    /// Normalized name of a topic.
    pub fn name_of(&self, id: TopicId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Level-0 ancestors of a topic, `None` for an unknown id.
    pub fn level0_parents_of(&self, id: TopicId) -> Option<&[TopicId]> {
        self.level0_parents.get(&id).map(Vec::as_slice)
    }

    /// Level-1 ancestors of a topic, `None` for an unknown id.
    pub fn level1_parents_of(&self, id: TopicId) -> Option<&[TopicId]> {
        self.level1_parents.get(&id).map(Vec::as_slice)
    }

    /// Pairwise similarity of two topics, one of `1.0`, `0.5`, `0.25` or `0.125`.
    pub fn similarity(&self, a: TopicId, b: TopicId) -> f64 {
        if a == b {
            return SAME_TOPIC_SIMILARITY;
        }
        if share_parent(self.level1_parents_of(a), self.level1_parents_of(b)) {
            return SHARED_LEVEL1_SIMILARITY;
        }
        if share_parent(self.level0_parents_of(a), self.level0_parents_of(b)) {
            return SHARED_LEVEL0_SIMILARITY;
        }
        BASELINE_SIMILARITY
    }
}

impl Extend<TopicNode> for FosHierarchy {
    fn extend<I: IntoIterator<Item = TopicNode>>(&mut self, iter: I) {
        for node in iter {
            self.insert(node);
        }
    }
}

impl FromIterator<TopicNode> for FosHierarchy {
    fn from_iter<I: IntoIterator<Item = TopicNode>>(iter: I) -> Self {
        let mut hierarchy = Self::new();
        hierarchy.extend(iter);
        hierarchy
    }
}

fn share_parent(a: Option<&[TopicId]>, b: Option<&[TopicId]>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.iter().any(|id| b.contains(id)),
        _ => false,
    }
}

#[cfg(feature = "csv")]
fn split_parent_cell(field: &str, cell: Option<&str>) -> Result<Vec<TopicId>> {
    cell.unwrap_or("")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<TopicId>()
                .map_err(|e| BiblioError::InvalidFieldValue {
                    field: field.to_string(),
                    message: format!("\"{s}\" is not a topic id: {e}"),
                })
        })
        .collect()
}
