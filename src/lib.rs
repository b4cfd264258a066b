//! Field-of-study diversity of scholarly venues.
//!
//! `bibliodiv` loads paper metadata from bibliographic dumps, places every paper in a
//! canonical venue, and measures how widely a paper's references (or the papers citing it)
//! spread across the field-of-study hierarchy.
//!
//! # Key Features
//!
//! - **Venue normalization**: free-text venue strings such as `"ASSETS '19"` become DBLP-style
//!   keys (`conf/assets`) plus a publication year. An authoritative DOI catalog takes
//!   precedence over the string.
//! - **Multi-key index**: papers are found by corpus id, DOI or sha, and filtered by venue,
//!   year or field of study. Papers sharing any identifier are merged.
//! - **Diversity index**: a Leinster–Cobbold index over level-1 fields of study, with a
//!   similarity kernel derived from the topic hierarchy.
//! - **Parallel scoring**: per-venue scoring can run on rayon with the `parallel` feature.
//!
//! # Basic Usage
//!
//! ```rust
//! use bibliodiv::dataset::Loader;
//! use bibliodiv::diversity::{DiversityEngine, Neighborhood};
//! use bibliodiv::hierarchy::{FosHierarchy, TopicNode};
//! use serde_json::json;
//!
//! let hierarchy: FosHierarchy = vec![
//!     TopicNode::new(1, "computer science", 0),
//!     TopicNode::new(10, "human computer interaction", 1).with_level0_parents(vec![1]),
//!     TopicNode::new(11, "world wide web", 1).with_level0_parents(vec![1]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let mut loader = Loader::new();
//! loader.load_partition("core/conf/assets", vec![json!({
//!     "pid": 1,
//!     "venue": "ASSETS '19",
//!     "fos": [[10, 0.9, "human computer interaction", 1]],
//!     "refs": [[2, null, null]],
//! })]);
//! loader.load_partition("extended/conf/assets", vec![json!({
//!     "pid": 2,
//!     "fos": [[11, 0.6, "world wide web", 1]],
//! })]);
//! let dataset = loader.finish();
//!
//! let engine = DiversityEngine::new(dataset.index(), &hierarchy);
//! let universe = engine.topics_of_interest(&["conf/assets"]);
//! let scores = engine.score_venue("conf/assets", Neighborhood::References, &universe);
//! assert!(scores[&1] > 1.0);
//! ```
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type that wraps [`BiblioError`]. Only decoding
//! sources and building papers fail; lookups and scores that do not apply are `None`.
//!
//! ```rust
//! use bibliodiv::BiblioError;
//! use bibliodiv::paper::{Paper, RawPaper};
//! use bibliodiv::venue::VenueNormalizer;
//!
//! let raw = RawPaper { title: Some("Anonymous".into()), ..Default::default() };
//! match Paper::from_raw(raw, &VenueNormalizer::new()) {
//!     Ok(paper) => println!("{paper}"),
//!     Err(BiblioError::MissingIdentifier) => eprintln!("paper has no identifier"),
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! ```
//!
//! # Logging
//!
//! Progress and skipped records are reported through `tracing`. The library never
//! installs a subscriber.
//!
//! # Thread Safety
//!
//! The index and hierarchy are read-only once built and can be shared between threads.
//! The diversity engine supports parallel scoring through the `run_in_parallel` option.

use thiserror::Error;

pub mod dataset;
pub mod diversity;
pub mod hierarchy;
pub mod index;
pub mod paper;
mod regex;
mod utils;
pub mod venue;

// Reexports
pub use dataset::{Dataset, Loader};
pub use diversity::{DiversityConfig, DiversityEngine, Neighborhood};
pub use hierarchy::{FosHierarchy, TopicId, TopicNode};
pub use index::PaperIndex;
pub use paper::{FosEntry, IdTriple, Paper, RawPaper};
pub use utils::normalize_identifier;
pub use venue::{DoiCatalog, VenueNormalizer};

/// A specialized Result type for bibliographic operations.
pub type Result<T> = std::result::Result<T, BiblioError>;

/// Represents errors that can occur while loading bibliographic data.
#[derive(Error, Debug)]
pub enum BiblioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("Paper has none of pid, DOI and sha")]
    MissingIdentifier,

    #[error("Invalid field value: {field} - {message}")]
    InvalidFieldValue { field: String, message: String },

    #[error("Malformed input: {message} at line {line}")]
    MalformedInput { message: String, line: usize },
}

impl From<serde_json::Error> for BiblioError {
    fn from(err: serde_json::Error) -> Self {
        BiblioError::InvalidFormat(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for BiblioError {
    fn from(err: csv::Error) -> Self {
        BiblioError::InvalidFormat(err.to_string())
    }
}
