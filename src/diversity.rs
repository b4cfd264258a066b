//! Field-of-study diversity of a paper's neighborhood.
//!
//! Implements a generalized Leinster–Cobbold diversity index at level-1 field-of-study
//! granularity. A paper's own topics and the topics of its references (or of the papers
//! citing it) are pooled into a proportion mapping `p`, each paper contributing a total
//! weight of 1 spread evenly across its distinct topics. With `S` the topics of the paper
//! itself and `sim` the hierarchy similarity:
//!
//! ```text
//! D = 1 / Σ_{j ∈ S} (1/|S|) Σ_i sim(i, j) · (p_i / Σp) · (p_j / Σp)
//! ```
//!
//! `D` is 1 when the whole neighborhood sits on the paper's single topic and grows as the
//! neighborhood spreads over dissimilar topics.
//!
//! # Example
//!
//! ```
//! use bibliodiv::diversity::{DiversityEngine, Neighborhood};
//! use bibliodiv::hierarchy::FosHierarchy;
//! use bibliodiv::index::PaperIndex;
//! use bibliodiv::paper::{FosEntry, IdTriple, Paper, RawPaper};
//! use bibliodiv::venue::VenueNormalizer;
//! use std::collections::HashSet;
//!
//! let normalizer = VenueNormalizer::new();
//! let cited = RawPaper {
//!     pid: Some(1),
//!     fos: Some(vec![FosEntry::new(20, 0.7, "world wide web", 1)]),
//!     ..Default::default()
//! };
//! let citing = RawPaper {
//!     pid: Some(2),
//!     fos: Some(vec![FosEntry::new(10, 0.9, "human computer interaction", 1)]),
//!     refs: Some(vec![IdTriple::new(Some(1), None, None)]),
//!     ..Default::default()
//! };
//! let index: PaperIndex = [cited, citing]
//!     .into_iter()
//!     .map(|raw| Paper::from_raw(raw, &normalizer).unwrap())
//!     .collect();
//!
//! let hierarchy = FosHierarchy::new();
//! let engine = DiversityEngine::new(&index, &hierarchy);
//! let universe = HashSet::from([10, 20]);
//!
//! let score = engine
//!     .score(index.by_pid(2).unwrap(), Neighborhood::References, &universe)
//!     .unwrap();
//! assert!(score > 1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};

use crate::hierarchy::{FosHierarchy, TopicId};
use crate::index::PaperIndex;
use crate::paper::{IdTriple, Paper};

/// Hierarchy level at which topics are compared.
pub const DIVERSITY_LEVEL: u8 = 1;

/// Topic id to accumulated weight.
pub type Proportions = BTreeMap<TopicId, f64>;

/// The neighbors a diversity score is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// Papers the target references
    References,
    /// Papers citing the target
    Citations,
}

impl Neighborhood {
    fn triples(self, paper: &Paper) -> &[IdTriple] {
        match self {
            Neighborhood::References => paper.refs(),
            Neighborhood::Citations => paper.cits(),
        }
    }
}

/// Configuration for batch scoring.
#[derive(Debug, Default, Clone)]
pub struct DiversityConfig {
    /// Score papers on the rayon thread pool. Ignored without the `parallel` feature.
    pub run_in_parallel: bool,
}

/// Computes diversity scores against a shared index and hierarchy.
///
/// Both are only read, so one engine can score any number of papers, from any number
/// of threads.
#[derive(Debug, Clone)]
pub struct DiversityEngine<'a> {
    index: &'a PaperIndex,
    hierarchy: &'a FosHierarchy,
    config: DiversityConfig,
}

impl<'a> DiversityEngine<'a> {
    #[must_use]
    pub fn new(index: &'a PaperIndex, hierarchy: &'a FosHierarchy) -> Self {
        Self {
            index,
            hierarchy,
            config: DiversityConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DiversityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DiversityConfig {
        &self.config
    }

    /// Topic proportions of a paper and its neighborhood, along with the paper's own
    /// distinct topics.
    ///
    /// Every topic in `universe` starts at zero. Neighbors that do not resolve through
    /// the index, or that have no level-1 topics, add nothing. Topics outside `universe`
    /// are added on first use. Returns `None` when the paper has no level-1 topics.
    pub fn proportions(
        &self,
        paper: &Paper,
        neighborhood: Neighborhood,
        universe: &HashSet<TopicId>,
    ) -> Option<(Proportions, Vec<TopicId>)> {
        let own_topics = paper.topic_ids_at_level(DIVERSITY_LEVEL);
        if own_topics.is_empty() {
            return None;
        }

        let mut proportions: Proportions = universe.iter().map(|&topic| (topic, 0.0)).collect();
        spread_unit_weight(&mut proportions, &own_topics);

        for neighbor in neighborhood
            .triples(paper)
            .iter()
            .filter_map(|ids| self.index.by_triple(ids))
        {
            spread_unit_weight(
                &mut proportions,
                &neighbor.topic_ids_at_level(DIVERSITY_LEVEL),
            );
        }

        Some((proportions, own_topics))
    }

    /// Diversity score of one paper, `None` when the paper has no level-1 topics.
    pub fn score(
        &self,
        paper: &Paper,
        neighborhood: Neighborhood,
        universe: &HashSet<TopicId>,
    ) -> Option<f64> {
        let (proportions, own_topics) = self.proportions(paper, neighborhood, universe)?;
        leinster_cobbold(&proportions, &own_topics, self.hierarchy)
    }

    /// Scores a batch of papers, keyed by pid.
    ///
    /// Takes borrowed papers, as returned by index queries, or the shared papers of a
    /// dataset partition. Papers without a pid or without a defined score are left out.
    pub fn score_papers<P>(
        &self,
        papers: &[P],
        neighborhood: Neighborhood,
        universe: &HashSet<TopicId>,
    ) -> BTreeMap<u64, f64>
    where
        P: Borrow<Paper> + Sync,
    {
        let score_one = |paper: &P| {
            let paper: &Paper = paper.borrow();
            let Some(pid) = paper.pid() else {
                tracing::debug!(paper = %paper, "skipping paper without pid");
                return None;
            };
            self.score(paper, neighborhood, universe)
                .map(|score| (pid, score))
        };

        #[cfg(feature = "parallel")]
        if self.config.run_in_parallel {
            use rayon::prelude::*;
            return papers.par_iter().filter_map(score_one).collect();
        }

        papers.iter().filter_map(score_one).collect()
    }

    /// Scores every paper of a venue, keyed by pid.
    pub fn score_venue(
        &self,
        venue: &str,
        neighborhood: Neighborhood,
        universe: &HashSet<TopicId>,
    ) -> BTreeMap<u64, f64> {
        let papers = self.index.papers_in_venue(venue);
        let scores = self.score_papers(&papers, neighborhood, universe);
        tracing::info!(
            venue,
            ?neighborhood,
            papers = papers.len(),
            scored = scores.len(),
            "scored venue"
        );
        scores
    }

    /// Level-1 topics found on the papers of the given venues and on their resolved
    /// references and citations.
    pub fn topics_of_interest(&self, venues: &[&str]) -> HashSet<TopicId> {
        let mut topics = HashSet::new();
        for venue in venues {
            for paper in self.index.papers_in_venue(venue) {
                topics.extend(paper.topic_ids_at_level(DIVERSITY_LEVEL));
                let neighbors = paper
                    .refs()
                    .iter()
                    .chain(paper.cits())
                    .filter_map(|ids| self.index.by_triple(ids));
                for neighbor in neighbors {
                    topics.extend(neighbor.topic_ids_at_level(DIVERSITY_LEVEL));
                }
            }
        }
        topics
    }
}

/// Adds a total weight of 1, split evenly over `topics`.
fn spread_unit_weight(proportions: &mut Proportions, topics: &[TopicId]) {
    if topics.is_empty() {
        return;
    }
    let share = 1.0 / topics.len() as f64;
    for &topic in topics {
        *proportions.entry(topic).or_insert(0.0) += share;
    }
}

/// Leinster–Cobbold diversity of `proportions` as seen from `own_topics`.
///
/// Returns `None` when `own_topics` is empty or carries no weight.
pub fn leinster_cobbold(
    proportions: &Proportions,
    own_topics: &[TopicId],
    hierarchy: &FosHierarchy,
) -> Option<f64> {
    if own_topics.is_empty() {
        return None;
    }
    let total: f64 = proportions.values().sum();
    if total <= 0.0 {
        return None;
    }

    let own_share = 1.0 / own_topics.len() as f64;
    let denominator: f64 = own_topics
        .iter()
        .map(|&j| {
            let p_j = proportions.get(&j).copied().unwrap_or(0.0) / total;
            let inner: f64 = proportions
                .iter()
                .map(|(&i, &p_i)| hierarchy.similarity(i, j) * (p_i / total) * p_j)
                .sum();
            own_share * inner
        })
        .sum();

    if denominator > 0.0 {
        Some(1.0 / denominator)
    } else {
        None
    }
}
