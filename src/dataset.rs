//! Dataset loading.
//!
//! Raw paper records arrive in named partitions, such as `core/conf/chi` for the papers
//! of a venue and `extended/conf/chi` for the papers around them. The [`Loader`] turns
//! every raw record into a [`Paper`], skipping the ones that cannot be decoded or carry no
//! identifier, and [`Loader::finish`] builds one [`PaperIndex`] over all partitions.
//!
//! Partitions keep the order in which they were first loaded. The index sees the papers
//! in that order, so when two partitions hold the same paper, the copy loaded first is
//! the one indexed.
//!
//! A partition spanning several venues can be split into one partition per venue with
//! [`Loader::split_partition_by_venue`].
//!
//! # Example
//!
//! ```
//! use bibliodiv::dataset::Loader;
//! use serde_json::json;
//!
//! let mut loader = Loader::new();
//! loader.load_partition("core/conf/assets", vec![
//!     json!({"pid": 1, "venue": "ASSETS '19"}),
//!     json!({"venue": "ASSETS"}),
//! ]);
//! loader.load_partition("extended/conf/assets", vec![json!({"pid": "1"})]);
//!
//! let dataset = loader.finish();
//! assert_eq!(dataset.skipped(), 1);
//! assert_eq!(dataset.index().len(), 1);
//! ```

use either::Either;
use itertools::Itertools;
use serde_json::Value;
use std::io::BufRead;
use std::sync::Arc;
use tracing::{info, warn};

use crate::Result;
use crate::index::PaperIndex;
use crate::paper::{Paper, RawPaper};
use crate::venue::{VenueId, VenueNormalizer, normalize_venue};

/// Builds papers from raw partitions.
#[derive(Debug, Default)]
pub struct Loader {
    normalizer: VenueNormalizer,
    partitions: Vec<(String, Vec<Arc<Paper>>)>,
    skipped: usize,
}

impl Loader {
    /// Creates a loader whose normalizer has an empty DOI catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `normalizer` to place every paper loaded afterwards.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: VenueNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn normalizer(&self) -> &VenueNormalizer {
        &self.normalizer
    }

    /// Builds papers from raw JSON values and adds them to the named partition.
    ///
    /// Values that do not decode into a raw paper, or that carry no identifier, are
    /// skipped with a warning. Returns the number of papers added.
    pub fn load_partition<I>(&mut self, name: &str, values: I) -> usize
    where
        I: IntoIterator<Item = Value>,
    {
        let (papers, failures): (Vec<_>, Vec<_>) = values
            .into_iter()
            .enumerate()
            .partition_map(|(entry, value)| match build_paper(value, &self.normalizer) {
                Ok(paper) => Either::Left(Arc::new(paper)),
                Err(err) => Either::Right((entry, err)),
            });

        for (entry, err) in &failures {
            warn!(partition = name, entry, error = %err, "skipping raw paper");
        }
        self.skipped += failures.len();

        let added = papers.len();
        info!(
            partition = name,
            added,
            skipped = failures.len(),
            "loaded partition"
        );
        self.partition_mut(name).extend(papers);
        added
    }

    /// Splits the papers of partition `name` by canonical venue.
    ///
    /// `targets` pairs a venue with the partition its papers go to; venues are normalized
    /// like index queries, so `"ASSETS"` and `"conf/assets"` are the same target. Papers of
    /// any other venue, or of none, are reported with a warning. The source partition is
    /// left as is. Returns the number of papers placed.
    pub fn split_partition_by_venue(&mut self, name: &str, targets: &[(&str, &str)]) -> usize {
        let Some(source) = self.partition(name).map(<[Arc<Paper>]>::to_vec) else {
            warn!(partition = name, "no such partition to split");
            return 0;
        };
        let targets: Vec<(VenueId, &str)> = targets
            .iter()
            .filter_map(|&(venue, target)| normalize_venue(venue).0.map(|venue| (venue, target)))
            .collect();

        let mut placed = 0;
        for paper in source {
            let target = targets
                .iter()
                .find(|(venue, _)| paper.venue() == Some(venue.as_str()))
                .map(|&(_, target)| target);
            match target {
                Some(target) => {
                    self.partition_mut(target).push(paper);
                    placed += 1;
                }
                None => warn!(
                    partition = name,
                    venue = paper.venue().unwrap_or_default(),
                    paper = %paper,
                    "unknown venue"
                ),
            }
        }

        info!(partition = name, placed, "split partition by venue");
        placed
    }

    fn partition(&self, name: &str) -> Option<&[Arc<Paper>]> {
        find_partition(&self.partitions, name)
    }

    fn partition_mut(&mut self, name: &str) -> &mut Vec<Arc<Paper>> {
        let position = match self.partitions.iter().position(|(n, _)| n == name) {
            Some(position) => position,
            None => {
                self.partitions.push((name.to_string(), Vec::new()));
                self.partitions.len() - 1
            }
        };
        &mut self.partitions[position].1
    }

    /// Loads a partition stored as JSON lines, one raw paper per line.
    ///
    /// Blank lines are ignored and lines that are not JSON are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`BiblioError::Io`](crate::BiblioError::Io) if reading fails.
    pub fn load_json_lines<R: BufRead>(&mut self, name: &str, reader: R) -> Result<usize> {
        let mut values: Vec<Value> = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(value) => values.push(value),
                Err(err) => {
                    warn!(partition = name, line = number + 1, error = %err, "skipping unreadable line");
                    self.skipped += 1;
                }
            }
        }
        Ok(self.load_partition(name, values))
    }

    /// Builds the index over every loaded partition.
    pub fn finish(self) -> Dataset {
        let index = PaperIndex::new(
            self.partitions
                .iter()
                .flat_map(|(_, papers)| papers)
                .cloned(),
        );
        info!(
            partitions = self.partitions.len(),
            papers = index.len(),
            skipped = self.skipped,
            "dataset ready"
        );
        Dataset {
            partitions: self.partitions,
            index,
            skipped: self.skipped,
        }
    }
}

fn find_partition<'a>(
    partitions: &'a [(String, Vec<Arc<Paper>>)],
    name: &str,
) -> Option<&'a [Arc<Paper>]> {
    partitions
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, papers)| papers.as_slice())
}

fn build_paper(value: Value, normalizer: &VenueNormalizer) -> Result<Paper> {
    let raw: RawPaper = serde_json::from_value(value)?;
    Paper::from_raw(raw, normalizer)
}

/// Loaded partitions and the index built over them.
#[derive(Debug, Clone)]
pub struct Dataset {
    partitions: Vec<(String, Vec<Arc<Paper>>)>,
    index: PaperIndex,
    skipped: usize,
}

impl Dataset {
    /// Papers of one partition, in load order and not deduplicated.
    pub fn partition(&self, name: &str) -> Option<&[Arc<Paper>]> {
        find_partition(&self.partitions, name)
    }

    /// Partition names in load order.
    pub fn partition_names(&self) -> impl Iterator<Item = &str> {
        self.partitions.iter().map(|(name, _)| name.as_str())
    }

    pub fn index(&self) -> &PaperIndex {
        &self.index
    }

    /// Number of raw entries that were skipped during loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_index(self) -> PaperIndex {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diversity::{DiversityEngine, Neighborhood};
    use crate::hierarchy::FosHierarchy;
    use crate::venue::DoiCatalog;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, HashSet};
    use serde_json::json;

    #[test]
    fn test_malformed_entries_are_skipped() {
        let mut loader = Loader::new();
        let added = loader.load_partition(
            "core/conf/chi",
            vec![
                json!({"pid": 1, "venue": "CHI '19", "fos": [[10, 0.8, "human computer interaction", 1]]}),
                json!({"pid": 2, "fos": [[10, "heavy"]]}),
                json!({"title": "No identifiers"}),
                json!("not an object"),
                json!({"doi": "10.1145/ABC", "year": "2018"}),
            ],
        );
        assert_eq!(added, 2);

        let dataset = loader.finish();
        assert_eq!(dataset.skipped(), 3);
        assert_eq!(dataset.partition("core/conf/chi").unwrap().len(), 2);
        assert_eq!(dataset.index().by_pid(1).unwrap().venue(), Some("conf/chi"));
        assert_eq!(dataset.index().by_doi("10.1145/abc").unwrap().year(), Some(2018));
    }

    #[test]
    fn test_index_spans_partitions() {
        let mut loader = Loader::new();
        loader.load_partition(
            "core/conf/assets",
            vec![json!({"pid": 1, "doi": "10.1/a"}), json!({"pid": 2})],
        );
        loader.load_partition(
            "extended/conf/assets",
            vec![json!({"doi": "10.1/A", "sha": "f00d"}), json!({"pid": 3})],
        );

        let dataset = loader.finish();
        assert_eq!(
            dataset.partition_names().collect::<Vec<_>>(),
            vec!["core/conf/assets", "extended/conf/assets"]
        );
        assert_eq!(dataset.partition("extended/conf/assets").unwrap().len(), 2);
        assert_eq!(dataset.partition("core/conf/uist"), None);

        let index = dataset.into_index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.by_sha("F00D").unwrap().pid(), Some(1));
    }

    #[test]
    fn test_partition_loads_accumulate() {
        let mut loader = Loader::new();
        loader.load_partition("core/conf/chi", vec![json!({"pid": 1})]);
        loader.load_partition("core/conf/chi", vec![json!({"pid": 2})]);
        assert_eq!(loader.finish().partition("core/conf/chi").unwrap().len(), 2);
    }

    #[test]
    fn test_catalog_places_loaded_papers() {
        let mut catalog = DoiCatalog::new();
        catalog.insert("10.1145/3308561.3353773", "conf/assets", Some(2019));

        let mut loader = Loader::new().with_normalizer(VenueNormalizer::new().with_catalog(catalog));
        loader.load_partition(
            "core/conf/assets",
            vec![json!({"doi": "10.1145/3308561.3353773", "venue": "CHI", "year": 2000})],
        );

        let dataset = loader.finish();
        let paper = dataset.index().by_doi("10.1145/3308561.3353773").unwrap();
        assert_eq!(paper.venue(), Some("conf/assets"));
        assert_eq!(paper.year(), Some(2019));
    }

    #[test]
    fn test_json_lines() {
        let input = "{\"pid\": 1, \"venue\": \"UIST\"}\n\n{broken\n{\"pid\": 2, \"refs\": [[1, null, null]]}\n";
        let mut loader = Loader::new();
        let added = loader
            .load_json_lines("core/conf/uist", input.as_bytes())
            .unwrap();
        assert_eq!(added, 2);

        let dataset = loader.finish();
        assert_eq!(dataset.skipped(), 1);
        let citing = dataset.index().by_pid(2).unwrap();
        assert_eq!(
            dataset.index().by_triple(&citing.refs()[0]).unwrap().venue(),
            Some("conf/uist")
        );
    }

    #[test]
    fn test_first_loaded_partition_wins() {
        let mut loader = Loader::new();
        loader.load_partition("z/first", vec![json!({"pid": 1, "title": "loaded first"})]);
        loader.load_partition("a/second", vec![json!({"pid": 1, "title": "loaded second"})]);

        let dataset = loader.finish();
        assert_eq!(
            dataset.partition_names().collect::<Vec<_>>(),
            vec!["z/first", "a/second"]
        );
        assert_eq!(dataset.index().len(), 1);
        assert_eq!(dataset.index().by_pid(1).unwrap().title(), Some("loaded first"));
    }

    #[test]
    fn test_split_partition_by_venue() {
        let mut loader = Loader::new();
        loader.load_partition(
            "core/a11y",
            vec![
                json!({"pid": 1, "venue": "ASSETS '19", "fos": [[10, 0.9, "accessibility", 1]]}),
                json!({"pid": 2, "venue": "CHI"}),
                json!({"pid": 3, "venue": "conf/assets"}),
                json!({"pid": 4, "venue": "UIST"}),
                json!({"pid": 5}),
            ],
        );
        let placed = loader.split_partition_by_venue(
            "core/a11y",
            &[("conf/assets", "a11y_assets"), ("CHI", "a11y_chi")],
        );
        assert_eq!(placed, 3);
        assert_eq!(
            loader.split_partition_by_venue("core/missing", &[("conf/chi", "a11y_chi")]),
            0
        );

        let dataset = loader.finish();
        let pids = |name: &str| {
            dataset
                .partition(name)
                .unwrap()
                .iter()
                .filter_map(|paper| paper.pid())
                .collect::<Vec<_>>()
        };
        assert_eq!(pids("a11y_assets"), vec![1, 3]);
        assert_eq!(pids("a11y_chi"), vec![2]);
        assert_eq!(pids("core/a11y"), vec![1, 2, 3, 4, 5]);
        assert_eq!(dataset.index().len(), 5);

        let hierarchy = FosHierarchy::new();
        let engine = DiversityEngine::new(dataset.index(), &hierarchy);
        let scores = engine.score_papers(
            dataset.partition("a11y_assets").unwrap(),
            Neighborhood::References,
            &HashSet::from([10]),
        );
        assert_eq!(scores, BTreeMap::from([(1, 1.0)]));
    }
}
