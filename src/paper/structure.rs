//! Raw paper field sets.
//!
//! This module defines the loosely typed records that catalogs supply, before venue
//! normalization and identity checks turn them into [`Paper`](super::Paper)s.
//!
//! Catalog dumps are inconsistent about types: corpus ids arrive as numbers or as numeric
//! strings, years as numbers or strings, and empty strings stand in for missing values.
//! The helpers here absorb those differences during deserialization.

use serde::{Deserialize, Deserializer};

use super::{FosEntry, IdTriple};
use crate::venue::RawYear;

/// Raw fields of one paper as supplied by a catalog partition.
///
/// # Examples
///
/// ```
/// use bibliodiv::paper::RawPaper;
///
/// let raw: RawPaper = serde_json::from_str(r#"{
///     "pid": "4242",
///     "doi": "10.1145/3308561.3353773",
///     "venue": "ASSETS '19",
///     "fos": [[10, 0.8, "human computer interaction", 1]],
///     "refs": [[17, null, null], [null, "10.1145/ABC", ""]]
/// }"#).unwrap();
///
/// assert_eq!(raw.pid, Some(4242));
/// assert_eq!(raw.refs.unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPaper {
    #[serde(default, deserialize_with = "flexible_pid")]
    pub pid: Option<u64>,
    pub doi: Option<String>,
    pub sha: Option<String>,
    pub venue: Option<String>,
    pub year: Option<RawYear>,
    pub fos: Option<Vec<FosEntry>>,
    pub title: Option<String>,
    pub refs: Option<Vec<IdTriple>>,
    pub cits: Option<Vec<IdTriple>>,
}

/// A corpus id as found in raw records.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PidValue {
    Number(u64),
    Text(String),
}

impl PidValue {
    /// Zero, empty and non-numeric values count as absent.
    fn resolve(self) -> Option<u64> {
        match self {
            PidValue::Number(n) => Some(n),
            PidValue::Text(s) => s.trim().parse().ok(),
        }
        .filter(|&pid| pid != 0)
    }
}

fn flexible_pid<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PidValue>::deserialize(deserializer)?.and_then(PidValue::resolve))
}

/// Wire form of an [`IdTriple`]: a `[pid, doi, sha]` array.
#[derive(Debug, Deserialize)]
pub(super) struct RawIdTriple(
    Option<PidValue>,
    Option<String>,
    Option<String>,
);

impl From<RawIdTriple> for IdTriple {
    fn from(RawIdTriple(pid, doi, sha): RawIdTriple) -> Self {
        IdTriple::new(
            pid.and_then(PidValue::resolve),
            doi.as_deref(),
            sha.as_deref(),
        )
    }
}
