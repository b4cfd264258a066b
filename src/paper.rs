//! Paper records.
//!
//! A [`Paper`] is the canonical entity for one publication. It is built once from a
//! [`RawPaper`] during dataset load, with venue and year normalized through a
//! [`VenueNormalizer`], and is immutable afterwards.
//!
//! # Identity
//!
//! A paper may be known by up to three identifiers: a corpus id (`pid`), a DOI and a
//! content hash (`sha`). At least one is required. Two papers are equal when **any**
//! identifier present on both matches. This is a same-as relation rather than an
//! equivalence: with `A.doi == B.doi` and `B.sha == C.sha`, `A` and `C` can still differ.
//!
//! # Example
//!
//! ```
//! use bibliodiv::paper::{Paper, RawPaper};
//! use bibliodiv::venue::VenueNormalizer;
//!
//! let normalizer = VenueNormalizer::new();
//! let a = Paper::from_raw(
//!     RawPaper { pid: Some(1), doi: Some("10.1145/ABC".into()), ..Default::default() },
//!     &normalizer,
//! ).unwrap();
//! let b = Paper::from_raw(
//!     RawPaper { pid: Some(2), doi: Some("10.1145/abc".into()), ..Default::default() },
//!     &normalizer,
//! ).unwrap();
//!
//! assert_eq!(a, b);
//! ```

mod structure;

pub use structure::RawPaper;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::hierarchy::TopicId;
use crate::utils::normalize_optional_identifier;
use crate::venue::{VenueId, VenueNormalizer};
use crate::{BiblioError, Result};

/// A field-of-study annotation on a paper.
///
/// Serialized as a `[id, weight, name, level]` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(TopicId, f64, String, u8)", into = "(TopicId, f64, String, u8)")]
pub struct FosEntry {
    pub id: TopicId,
    /// Relevance of the topic to the paper
    pub weight: f64,
    pub name: String,
    /// Hierarchy level, 0 (broadest) to 2 (most specific)
    pub level: u8,
}

impl FosEntry {
    #[must_use]
    pub fn new(id: TopicId, weight: f64, name: &str, level: u8) -> Self {
        Self {
            id,
            weight,
            name: name.to_string(),
            level,
        }
    }
}

impl From<(TopicId, f64, String, u8)> for FosEntry {
    fn from((id, weight, name, level): (TopicId, f64, String, u8)) -> Self {
        Self {
            id,
            weight,
            name,
            level,
        }
    }
}

impl From<FosEntry> for (TopicId, f64, String, u8) {
    fn from(entry: FosEntry) -> Self {
        (entry.id, entry.weight, entry.name, entry.level)
    }
}

/// The identifiers a reference or citation points at.
///
/// Serialized as a `[pid, doi, sha]` array. DOI and sha are lower-cased; empty values and
/// a zero pid are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "structure::RawIdTriple",
    into = "(Option<u64>, Option<String>, Option<String>)"
)]
pub struct IdTriple {
    pub pid: Option<u64>,
    pub doi: Option<String>,
    pub sha: Option<String>,
}

impl IdTriple {
    #[must_use]
    pub fn new(pid: Option<u64>, doi: Option<&str>, sha: Option<&str>) -> Self {
        Self {
            pid: pid.filter(|&pid| pid != 0),
            doi: normalize_optional_identifier(doi),
            sha: normalize_optional_identifier(sha),
        }
    }

    /// Whether no identifier is present.
    pub fn is_empty(&self) -> bool {
        self.pid.is_none() && self.doi.is_none() && self.sha.is_none()
    }
}

impl From<IdTriple> for (Option<u64>, Option<String>, Option<String>) {
    fn from(ids: IdTriple) -> Self {
        (ids.pid, ids.doi, ids.sha)
    }
}

fn both_match<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// The canonical record for one publication.
///
/// Serializes to the full record: identifiers, venue, year, FOS entries, title and the
/// reference and citation triples.
#[derive(Debug, Clone, Serialize)]
pub struct Paper {
    pid: Option<u64>,
    doi: Option<String>,
    sha: Option<String>,
    venue: Option<VenueId>,
    year: Option<i32>,
    fos: Option<Vec<FosEntry>>,
    title: Option<String>,
    refs: Vec<IdTriple>,
    cits: Vec<IdTriple>,
}

impl Paper {
    /// Builds a paper from raw catalog fields.
    ///
    /// Venue and year are resolved through `normalizer` (DOI catalog first, then the
    /// venue string, then an explicitly supplied year). FOS entries are sorted by
    /// descending weight and DOI/sha are lower-cased.
    ///
    /// # Errors
    ///
    /// Returns [`BiblioError::MissingIdentifier`] when none of pid, DOI and sha is present.
    pub fn from_raw(raw: RawPaper, normalizer: &VenueNormalizer) -> Result<Self> {
        let ids = IdTriple::new(raw.pid, raw.doi.as_deref(), raw.sha.as_deref());
        if ids.is_empty() {
            return Err(BiblioError::MissingIdentifier);
        }

        let placement = normalizer.place(
            ids.doi.as_deref(),
            raw.venue.as_deref(),
            raw.year.as_ref().and_then(|year| year.resolve()),
        );

        let fos = raw.fos.filter(|fos| !fos.is_empty()).map(|mut fos| {
            fos.sort_by(|a, b| b.weight.total_cmp(&a.weight));
            fos
        });

        Ok(Self {
            pid: ids.pid,
            doi: ids.doi,
            sha: ids.sha,
            venue: placement.venue,
            year: placement.year,
            fos,
            title: raw.title.filter(|title| !title.is_empty()),
            refs: raw.refs.unwrap_or_default(),
            cits: raw.cits.unwrap_or_default(),
        })
    }

    pub fn pid(&self) -> Option<u64> {
        self.pid
    }

    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref()
    }

    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    /// The identifiers of this paper as a triple, as references to it would carry them.
    pub fn ids(&self) -> IdTriple {
        IdTriple {
            pid: self.pid,
            doi: self.doi.clone(),
            sha: self.sha.clone(),
        }
    }

    /// Canonical venue id.
    pub fn venue(&self) -> Option<&str> {
        self.venue.as_deref()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// FOS entries, heaviest first.
    pub fn fos(&self) -> Option<&[FosEntry]> {
        self.fos.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Papers this paper references.
    pub fn refs(&self) -> &[IdTriple] {
        &self.refs
    }

    /// Papers citing this paper.
    pub fn cits(&self) -> &[IdTriple] {
        &self.cits
    }

    /// FOS entries at one hierarchy level, `None` when the paper has no FOS at all.
    pub fn fos_at_level(&self, level: u8) -> Option<Vec<&FosEntry>> {
        self.fos
            .as_ref()
            .map(|fos| fos.iter().filter(|entry| entry.level == level).collect())
    }

    pub fn l0_fos(&self) -> Option<Vec<&FosEntry>> {
        self.fos_at_level(0)
    }

    pub fn l1_fos(&self) -> Option<Vec<&FosEntry>> {
        self.fos_at_level(1)
    }

    pub fn l2_fos(&self) -> Option<Vec<&FosEntry>> {
        self.fos_at_level(2)
    }

    /// Distinct topic ids at one level, in weight order.
    pub fn topic_ids_at_level(&self, level: u8) -> Vec<TopicId> {
        self.fos
            .iter()
            .flatten()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.id)
            .unique()
            .collect()
    }

    /// Whether any FOS entry has exactly this name.
    pub fn has_fos(&self, name: &str) -> bool {
        self.fos.iter().flatten().any(|entry| entry.name == name)
    }
}

impl PartialEq for Paper {
    /// Papers are equal when any identifier present on both matches.
    fn eq(&self, other: &Self) -> bool {
        both_match(&self.pid, &other.pid)
            || both_match(&self.doi, &other.doi)
            || both_match(&self.sha, &other.sha)
    }
}

/// Not transitive across identifier types; see the module docs. Hash-based collections
/// only treat papers as the same when the same identifiers are populated.
impl Eq for Paper {}

impl Hash for Paper {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pid.hash(state);
        self.doi.hash(state);
        self.sha.hash(state);
    }
}

impl fmt::Display for Paper {
    /// A one-line JSON summary: FOS names only and reference/citation counts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = serde_json::json!({
            "pid": self.pid,
            "doi": self.doi,
            "sha": self.sha,
            "venue": self.venue,
            "year": self.year,
            "fos": self.fos.as_ref().map(|fos| fos.iter().map(|e| e.name.as_str()).collect_vec()),
            "title": self.title,
            "references": self.refs.len(),
            "citations": self.cits.len(),
        });
        write!(f, "{summary}")
    }
}
