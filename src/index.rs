//! Multi-key paper index.
//!
//! [`PaperIndex`] is built once over the whole record collection and is read-only
//! afterwards. Every paper can be found by any of its identifiers, and the collection can
//! be filtered by venue, year and field of study.
//!
//! # Deduplication
//!
//! Papers are deduplicated with the any-identifier equality of [`Paper`], in insertion
//! order: the first paper seen is kept and later papers sharing one of its identifiers
//! are dropped. Identifiers only a dropped paper carries are kept as aliases of the
//! surviving paper, so lookups by them still resolve. Aliases do not take part in
//! deduplication: a later paper sharing only an alias is kept as its own record, and from
//! then on the alias resolves to that paper.
//!
//! # Example
//!
//! ```
//! use bibliodiv::index::PaperIndex;
//! use bibliodiv::paper::{Paper, RawPaper};
//! use bibliodiv::venue::VenueNormalizer;
//!
//! let normalizer = VenueNormalizer::new();
//! let index: PaperIndex = [
//!     RawPaper { pid: Some(1), venue: Some("CHI '19".into()), ..Default::default() },
//!     RawPaper { doi: Some("10.1145/ABC".into()), venue: Some("ASSETS".into()), ..Default::default() },
//! ]
//! .into_iter()
//! .map(|raw| Paper::from_raw(raw, &normalizer).unwrap())
//! .collect();
//!
//! assert!(index.by_doi("10.1145/abc").is_some());
//! assert_eq!(index.papers_in_venue("CHI").len(), 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::paper::{IdTriple, Paper};
use crate::utils::normalize_identifier;
use crate::venue::normalize_venue;

/// Papers of one venue grouped by year, plus the papers without a year.
pub type VenueYears<'a> = (BTreeMap<i32, Vec<&'a Paper>>, Vec<&'a Paper>);

/// In-memory index over a deduplicated paper collection.
///
/// Papers are shared: the index holds reference-counted handles and other holders, such
/// as dataset partitions, may hold the same records.
#[derive(Debug, Clone, Default)]
pub struct PaperIndex {
    papers: Vec<Arc<Paper>>,
    by_pid: HashMap<u64, usize>,
    by_doi: HashMap<String, usize>,
    by_sha: HashMap<String, usize>,
}

impl PaperIndex {
    /// Builds the index, deduplicating papers in iteration order.
    pub fn new<I: IntoIterator<Item = Arc<Paper>>>(papers: I) -> Self {
        let mut index = Self::default();
        let mut duplicates = 0usize;

        for paper in papers {
            match index.position_of(&paper) {
                Some(position) => {
                    index.register_aliases(&paper, position);
                    duplicates += 1;
                }
                None => {
                    let position = index.papers.len();
                    index.register_owner(&paper, position);
                    index.papers.push(paper);
                }
            }
        }

        tracing::info!(
            papers = index.papers.len(),
            duplicates,
            "built paper index"
        );
        index
    }

    /// Position of a kept paper equal to `paper`.
    ///
    /// Only kept papers count: a paper matching nothing but the alias of a dropped
    /// duplicate is not equal to the paper the alias points at.
    fn position_of(&self, paper: &Paper) -> Option<usize> {
        let candidates = [
            paper.pid().and_then(|pid| self.by_pid.get(&pid)),
            paper.doi().and_then(|doi| self.by_doi.get(doi)),
            paper.sha().and_then(|sha| self.by_sha.get(sha)),
        ];
        candidates
            .into_iter()
            .flatten()
            .copied()
            .find(|&position| *self.papers[position] == *paper)
    }

    /// Points every identifier of a kept paper at `position`.
    ///
    /// No other kept paper carries these identifiers, so any existing entry is an alias
    /// and is replaced.
    fn register_owner(&mut self, paper: &Paper, position: usize) {
        if let Some(pid) = paper.pid() {
            self.by_pid.insert(pid, position);
        }
        if let Some(doi) = paper.doi() {
            self.by_doi.insert(doi.to_string(), position);
        }
        if let Some(sha) = paper.sha() {
            self.by_sha.insert(sha.to_string(), position);
        }
    }

    /// Points identifiers of a dropped duplicate that are not indexed yet at `position`.
    fn register_aliases(&mut self, paper: &Paper, position: usize) {
        if let Some(pid) = paper.pid() {
            self.by_pid.entry(pid).or_insert(position);
        }
        if let Some(doi) = paper.doi() {
            self.by_doi.entry(doi.to_string()).or_insert(position);
        }
        if let Some(sha) = paper.sha() {
            self.by_sha.entry(sha.to_string()).or_insert(position);
        }
    }

    /// Number of unique papers.
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Unique papers in insertion order.
    pub fn papers(&self) -> &[Arc<Paper>] {
        &self.papers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Paper> {
        self.papers.iter().map(|paper| &**paper)
    }

    pub fn by_pid(&self, pid: u64) -> Option<&Paper> {
        self.by_pid.get(&pid).map(|&i| self.papers[i].as_ref())
    }

    /// Looks up a DOI, ignoring case.
    pub fn by_doi(&self, doi: &str) -> Option<&Paper> {
        let doi = normalize_identifier(doi)?;
        self.by_doi.get(&doi).map(|&i| self.papers[i].as_ref())
    }

    /// Looks up a content hash, ignoring case.
    pub fn by_sha(&self, sha: &str) -> Option<&Paper> {
        let sha = normalize_identifier(sha)?;
        self.by_sha.get(&sha).map(|&i| self.papers[i].as_ref())
    }

    /// Resolves a reference or citation triple.
    ///
    /// Tries the pid, then the DOI, then the sha and returns the first hit. The
    /// identifiers are not cross-checked against each other.
    pub fn by_triple(&self, ids: &IdTriple) -> Option<&Paper> {
        ids.pid
            .and_then(|pid| self.by_pid(pid))
            .or_else(|| ids.doi.as_deref().and_then(|doi| self.by_doi(doi)))
            .or_else(|| ids.sha.as_deref().and_then(|sha| self.by_sha(sha)))
    }

    /// Papers whose canonical venue matches the normalized form of `venue`.
    ///
    /// Returns nothing when `venue` normalizes to no venue id.
    pub fn papers_in_venue(&self, venue: &str) -> Vec<&Paper> {
        let (Some(venue), _) = normalize_venue(venue) else {
            return Vec::new();
        };
        self.iter()
            .filter(|paper| paper.venue() == Some(venue.as_str()))
            .collect()
    }

    /// Papers of a venue grouped by year. Papers without a year are returned separately,
    /// so every paper of the venue appears exactly once.
    pub fn papers_in_venue_by_year(&self, venue: &str) -> VenueYears<'_> {
        let mut by_year: BTreeMap<i32, Vec<&Paper>> = BTreeMap::new();
        let mut no_year = Vec::new();

        for paper in self.papers_in_venue(venue) {
            match paper.year() {
                Some(year) => by_year.entry(year).or_default().push(paper),
                None => no_year.push(paper),
            }
        }

        (by_year, no_year)
    }

    /// Papers with a FOS entry of exactly this name.
    pub fn papers_with_topic(&self, name: &str) -> Vec<&Paper> {
        self.iter().filter(|paper| paper.has_fos(name)).collect()
    }
}

impl FromIterator<Arc<Paper>> for PaperIndex {
    fn from_iter<I: IntoIterator<Item = Arc<Paper>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl FromIterator<Paper> for PaperIndex {
    fn from_iter<I: IntoIterator<Item = Paper>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Arc::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paper::{FosEntry, RawPaper};
    use crate::venue::{RawYear, VenueNormalizer};
    use pretty_assertions::assert_eq;

    fn build(raws: Vec<RawPaper>) -> PaperIndex {
        let normalizer = VenueNormalizer::new();
        raws.into_iter()
            .map(|raw| Paper::from_raw(raw, &normalizer).unwrap())
            .collect()
    }

    fn titles(papers: &[&Paper]) -> Vec<String> {
        papers
            .iter()
            .map(|p| p.title().unwrap_or_default().to_string())
            .collect()
    }

    fn raw(pid: Option<u64>, doi: Option<&str>, sha: Option<&str>, title: &str) -> RawPaper {
        RawPaper {
            pid,
            doi: doi.map(String::from),
            sha: sha.map(String::from),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_by_each_identifier() {
        let index = build(vec![
            raw(Some(1), None, None, "one"),
            raw(None, Some("10.1/TWO"), None, "two"),
            raw(None, None, Some("ABC3"), "three"),
        ]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.by_pid(1).unwrap().title(), Some("one"));
        assert_eq!(index.by_doi("10.1/two").unwrap().title(), Some("two"));
        assert_eq!(index.by_doi("10.1/TWO").unwrap().title(), Some("two"));
        assert_eq!(index.by_sha("abc3").unwrap().title(), Some("three"));
        assert_eq!(index.by_sha("ABC3").unwrap().title(), Some("three"));
        assert!(index.by_pid(2).is_none());
        assert!(index.by_doi("10.1/missing").is_none());
        assert!(index.by_sha("").is_none());
    }

    #[test]
    fn test_triple_priority() {
        let index = build(vec![
            raw(Some(1), None, None, "by pid"),
            raw(None, Some("10.1/x"), None, "by doi"),
            raw(None, None, Some("abc"), "by sha"),
        ]);
        let lookup = |pid, doi, sha| {
            index
                .by_triple(&IdTriple::new(pid, doi, sha))
                .and_then(Paper::title)
        };
        assert_eq!(lookup(Some(1), Some("10.1/x"), Some("abc")), Some("by pid"));
        assert_eq!(lookup(Some(99), Some("10.1/X"), Some("abc")), Some("by doi"));
        assert_eq!(lookup(None, Some("10.1/y"), Some("ABC")), Some("by sha"));
        assert_eq!(lookup(Some(99), Some("10.1/y"), Some("def")), None);
        assert_eq!(lookup(None, None, None), None);
    }

    #[test]
    fn test_deduplication_keeps_first_and_aliases() {
        let index = build(vec![
            raw(Some(1), Some("10.1/x"), None, "first"),
            raw(Some(2), Some("10.1/X"), Some("abc"), "second"),
            raw(Some(4), None, None, "fourth"),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.by_pid(2).unwrap().title(), Some("first"));
        assert_eq!(index.by_sha("abc").unwrap().title(), Some("first"));
        assert_eq!(index.by_pid(4).unwrap().title(), Some("fourth"));
    }

    #[test]
    fn test_deduplication_is_not_transitive() {
        let mut third = raw(Some(3), None, Some("abc"), "third");
        third.venue = Some("ASSETS".to_string());
        let index = build(vec![
            raw(Some(1), Some("10.1/x"), None, "first"),
            raw(Some(2), Some("10.1/x"), Some("abc"), "second"),
            third,
            raw(None, None, Some("ABC"), "fifth"),
        ]);

        // "third" only shares the alias "abc" of the dropped "second"
        assert_eq!(index.len(), 2);
        assert_eq!(index.by_pid(3).unwrap().title(), Some("third"));
        assert_eq!(index.by_sha("abc").unwrap().title(), Some("third"));
        assert_eq!(index.by_pid(2).unwrap().title(), Some("first"));
        assert_eq!(titles(&index.papers_in_venue("ASSETS")), vec!["third"]);
    }

    #[test]
    fn test_shared_papers() {
        let normalizer = VenueNormalizer::new();
        let paper = Arc::new(
            Paper::from_raw(raw(Some(1), None, None, "shared"), &normalizer).unwrap(),
        );
        let index = PaperIndex::new([Arc::clone(&paper)]);
        assert_eq!(Arc::strong_count(&paper), 2);
        assert!(Arc::ptr_eq(&index.papers()[0], &paper));
    }

    fn venue_paper(pid: u64, venue: &str, year: Option<i64>) -> RawPaper {
        RawPaper {
            pid: Some(pid),
            venue: Some(venue.to_string()),
            year: year.map(RawYear::Number),
            title: Some(format!("paper {pid}")),
            ..Default::default()
        }
    }

    #[test]
    fn test_papers_in_venue() {
        let index = build(vec![
            venue_paper(1, "CHI", Some(2018)),
            venue_paper(2, "CHI '19", None),
            venue_paper(3, "conf/chi", None),
            venue_paper(4, "ASSETS", Some(2019)),
            venue_paper(5, "Some Workshop", None),
        ]);
        assert_eq!(
            titles(&index.papers_in_venue("CHI")),
            vec!["paper 1", "paper 2", "paper 3"]
        );
        assert_eq!(titles(&index.papers_in_venue("conf/assets")), vec!["paper 4"]);
        assert_eq!(titles(&index.papers_in_venue("Some Workshop")), vec!["paper 5"]);
        assert!(index.papers_in_venue("conf/uist").is_empty());
        assert!(index.papers_in_venue("").is_empty());
    }

    #[test]
    fn test_papers_in_venue_by_year_partitions() {
        let index = build(vec![
            venue_paper(1, "CHI", Some(2018)),
            venue_paper(2, "CHI '19", None),
            venue_paper(3, "conf/chi", None),
            venue_paper(4, "CHI", Some(2018)),
            venue_paper(5, "ASSETS", Some(2018)),
        ]);
        let (by_year, no_year) = index.papers_in_venue_by_year("CHI");

        assert_eq!(by_year.keys().copied().collect::<Vec<_>>(), vec![2018, 2019]);
        assert_eq!(titles(&by_year[&2018]), vec!["paper 1", "paper 4"]);
        assert_eq!(titles(&by_year[&2019]), vec!["paper 2"]);
        assert_eq!(titles(&no_year), vec!["paper 3"]);

        let grouped: usize = by_year.values().map(Vec::len).sum();
        assert_eq!(grouped + no_year.len(), index.papers_in_venue("CHI").len());
    }

    #[test]
    fn test_papers_with_topic() {
        let mut a = raw(Some(1), None, None, "a");
        a.fos = Some(vec![FosEntry::new(10, 0.5, "accessibility", 2)]);
        let mut b = raw(Some(2), None, None, "b");
        b.fos = Some(vec![FosEntry::new(11, 0.5, "usability", 2)]);
        let c = raw(Some(3), None, None, "c");
        let index = build(vec![a, b, c]);

        assert_eq!(titles(&index.papers_with_topic("accessibility")), vec!["a"]);
        assert!(index.papers_with_topic("Accessibility").is_empty());
    }
}
