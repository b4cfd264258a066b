//! Venue and year normalization.
//!
//! Recovers a canonical venue id and a publication year from the free-text venue strings
//! found across catalogs. Sources are consulted in order of reliability:
//!
//! 1. the authoritative [`DoiCatalog`], keyed by lower-cased DOI
//! 2. the static venue name table
//! 3. year-token heuristics over the raw venue string
//!
//! # Example
//!
//! ```
//! use bibliodiv::venue::{normalize_venue, normalize_year};
//!
//! assert_eq!(normalize_year("05"), Some(2005));
//!
//! let (venue, year) = normalize_venue("CHI '19");
//! assert_eq!(venue.as_deref(), Some("conf/chi"));
//! assert_eq!(year, Some(2019));
//! ```

mod table;

pub use table::COMPARATIVE_VENUES;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use crate::regex::Regex;
use crate::utils::{char_len, expand_two_digit_year, normalize_identifier};
use crate::Result;

/// Canonical venue identifier, e.g. `conf/chi`.
pub type VenueId = CompactString;

/// Prefixes of strings that already are DBLP venue keys.
const CATALOG_PREFIXES: [&str; 2] = ["conf/", "journal/"];

static TWO_DIGIT_YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'[0-9]{2}").unwrap());

static FOUR_DIGIT_YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}").unwrap());

/// Normalizes a year string.
///
/// Two-digit years use a sliding century window (`< 30` is 20xx, otherwise 19xx),
/// four-digit years pass through. Anything else, including non-digit input, is `None`.
pub fn normalize_year(raw: &str) -> Option<i32> {
    let digits = !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit());
    let year = match raw.len() {
        2 if digits => raw.parse().ok().map(expand_two_digit_year),
        4 if digits => raw.parse().ok(),
        _ => None,
    };
    if year.is_none() {
        tracing::debug!(year = raw, "not a year");
    }
    year
}

/// Normalizes a raw venue string into a canonical venue id and, when one is embedded
/// in the string, a year.
///
/// Strings that already are venue keys or that appear in the venue name table map
/// directly. Otherwise a single year token (`'19` style first, then `2019` style) splits
/// the string; the strictly longer side is the venue name (the side after the year
/// wins a tie), mapped through the table or lower-cased. With no token, or several, the
/// string is returned unchanged.
///
/// An empty result is reported as `None`.
pub fn normalize_venue(raw: &str) -> (Option<VenueId>, Option<i32>) {
    if CATALOG_PREFIXES.iter().any(|prefix| raw.starts_with(prefix)) {
        return (Some(raw.into()), None);
    }
    if let Some(id) = table::lookup(raw) {
        return (Some(id.into()), None);
    }

    let mut tokens = year_token_spans(&TWO_DIGIT_YEAR_REGEX, raw);
    if tokens.is_empty() {
        tokens = year_token_spans(&FOUR_DIGIT_YEAR_REGEX, raw);
    }

    let [(start, end)] = tokens[..] else {
        return (non_empty_venue(raw), None);
    };

    let before = raw[..start].trim();
    let after = raw[end..].trim();
    let year = normalize_year(raw[start..end].trim_matches('\''));

    let fragment = if char_len(before) > char_len(after) {
        before
    } else {
        after
    };
    let venue = match table::lookup(fragment) {
        Some(id) => Some(id.into()),
        None => non_empty_venue(&fragment.to_lowercase()),
    };
    (venue, year)
}

fn year_token_spans(regex: &Regex, raw: &str) -> Vec<(usize, usize)> {
    regex
        .find_iter(raw)
        .map(|m| (m.start(), m.end()))
        .collect()
}

fn non_empty_venue(s: &str) -> Option<VenueId> {
    if s.is_empty() { None } else { Some(s.into()) }
}

/// A year as found in raw records: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawYear {
    Number(i64),
    Text(String),
}

impl RawYear {
    /// Resolves to a year. Zero and empty values count as absent; strings go through
    /// [`normalize_year`].
    pub fn resolve(&self) -> Option<i32> {
        match self {
            RawYear::Number(0) => None,
            RawYear::Number(n) => i32::try_from(*n).ok(),
            RawYear::Text(s) => {
                let s = s.trim();
                if s.is_empty() { None } else { normalize_year(s) }
            }
        }
    }
}

/// Venue and year recorded for a DOI in the authoritative catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub venue: VenueId,
    pub year: Option<i32>,
}

/// Authoritative mapping from lower-cased DOI to venue and year.
///
/// Built once, before any records are constructed, and handed to the
/// [`VenueNormalizer`].
#[derive(Debug, Clone, Default)]
pub struct DoiCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl DoiCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the venue and year of a DOI. Later inserts for the same DOI win.
    pub fn insert(&mut self, doi: &str, venue: &str, year: Option<i32>) {
        if let Some(doi) = normalize_identifier(doi) {
            self.entries.insert(
                doi,
                CatalogEntry {
                    venue: venue.into(),
                    year,
                },
            );
        }
    }

    /// Looks up a DOI, ignoring case.
    pub fn get(&self, doi: &str) -> Option<&CatalogEntry> {
        normalize_identifier(doi).and_then(|doi| self.entries.get(&doi))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads a catalog from a JSON object listing papers per venue key:
    ///
    /// ```json
    /// {"conf/chi": [{"doi": "10.1145/3290605.3300234", "year": 2019}]}
    /// ```
    ///
    /// Papers without a DOI are ignored, as are any other fields. Venue keys are visited
    /// in sorted order, so a DOI listed under several venues ends up with the last one.
    ///
    /// # Errors
    ///
    /// Returns [`BiblioError::InvalidFormat`](crate::BiblioError::InvalidFormat) if the
    /// input is not such an object.
    pub fn from_venue_listing<R: std::io::Read>(reader: R) -> Result<Self> {
        #[derive(Deserialize)]
        struct ListedPaper {
            doi: Option<String>,
            year: Option<RawYear>,
        }

        let listing: BTreeMap<String, Vec<ListedPaper>> = serde_json::from_reader(reader)?;
        let mut catalog = Self::new();
        for (venue, papers) in &listing {
            for paper in papers {
                if let Some(doi) = paper.doi.as_deref() {
                    catalog.insert(doi, venue, paper.year.as_ref().and_then(RawYear::resolve));
                }
            }
        }

        tracing::info!(
            venues = listing.len(),
            dois = catalog.len(),
            "loaded authoritative DOI catalog"
        );
        Ok(catalog)
    }
}

/// Venue and year assigned to a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    pub venue: Option<VenueId>,
    pub year: Option<i32>,
}

/// Assigns venues and years to records, consulting the DOI catalog before the raw
/// venue string.
///
/// # Examples
///
/// ```
/// use bibliodiv::venue::{DoiCatalog, VenueNormalizer};
///
/// let mut catalog = DoiCatalog::new();
/// catalog.insert("10.1145/3308561.3353773", "conf/assets", Some(2019));
///
/// let normalizer = VenueNormalizer::new().with_catalog(catalog);
/// let placement = normalizer.place(Some("10.1145/3308561.3353773"), Some("ASSETS '18"), None);
/// assert_eq!(placement.venue.as_deref(), Some("conf/assets"));
/// assert_eq!(placement.year, Some(2019));
/// ```
#[derive(Debug, Clone, Default)]
pub struct VenueNormalizer {
    catalog: DoiCatalog,
}

impl VenueNormalizer {
    /// Creates a normalizer with an empty DOI catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: DoiCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &DoiCatalog {
        &self.catalog
    }

    /// Places a record.
    ///
    /// A DOI found in the catalog decides both venue and year and nothing else is
    /// consulted. Otherwise the venue string is normalized, and an explicitly supplied
    /// year replaces whatever year the string yielded.
    pub fn place(&self, doi: Option<&str>, venue: Option<&str>, year: Option<i32>) -> Placement {
        if let Some(entry) = doi.and_then(|doi| self.catalog.get(doi)) {
            return Placement {
                venue: Some(entry.venue.clone()),
                year: entry.year,
            };
        }

        let (venue, venue_year) = venue.map_or((None, None), normalize_venue);
        Placement {
            venue,
            year: year.or(venue_year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("99", Some(1999))]
    #[case("05", Some(2005))]
    #[case("29", Some(2029))]
    #[case("30", Some(1930))]
    #[case("2017", Some(2017))]
    #[case("0999", Some(999))]
    #[case("abc", None)]
    #[case("", None)]
    #[case("7", None)]
    #[case("201", None)]
    #[case("20171", None)]
    #[case("'19", None)]
    #[case("-19", None)]
    fn test_normalize_year(#[case] input: &str, #[case] expected: Option<i32>) {
        assert_eq!(normalize_year(input), expected);
    }

    #[rstest]
    #[case("CHI", Some("conf/chi"), None)]
    #[case("conf/assets", Some("conf/assets"), None)]
    #[case("journals/taccess", Some("journals/taccess"), None)]
    #[case("journals/taccess 2019", Some("journals/taccess"), Some(2019))]
    #[case("conf/chi 2019", Some("conf/chi 2019"), None)]
    #[case("MM 2003", Some("MM"), None)]
    #[case("CHI '19", Some("conf/chi"), Some(2019))]
    #[case("'19 CHI", Some("conf/chi"), Some(2019))]
    #[case("ASSETS 2017", Some("conf/assets"), Some(2017))]
    #[case("IEEE VR '05", Some("ieee vr"), Some(2005))]
    #[case("AB '98 CD", Some("cd"), Some(1998))]
    #[case(
        "Proceedings of the 2016 CHI Conference on Human Factors in Computing Systems",
        Some("chi conference on human factors in computing systems"),
        Some(2016)
    )]
    #[case("CHI '19 Extended Abstracts 2019", Some("extended abstracts 2019"), Some(2019))]
    #[case("Universal Access in the Information Society", Some("journals/uais"), None)]
    #[case("Some Journal", Some("Some Journal"), None)]
    #[case("ICCHP 2018 2019", Some("ICCHP 2018 2019"), None)]
    #[case("CHI '18 '19", Some("CHI '18 '19"), None)]
    #[case("'19", None, Some(2019))]
    #[case("", None, None)]
    fn test_normalize_venue(
        #[case] input: &str,
        #[case] venue: Option<&str>,
        #[case] year: Option<i32>,
    ) {
        let (actual_venue, actual_year) = normalize_venue(input);
        assert_eq!((actual_venue.as_deref(), actual_year), (venue, year));
    }

    #[rstest]
    #[case(RawYear::Number(2019), Some(2019))]
    #[case(RawYear::Number(0), None)]
    #[case(RawYear::Text("2019".to_string()), Some(2019))]
    #[case(RawYear::Text("19".to_string()), Some(2019))]
    #[case(RawYear::Text(" ".to_string()), None)]
    #[case(RawYear::Text("n.d.".to_string()), None)]
    fn test_raw_year_resolve(#[case] raw: RawYear, #[case] expected: Option<i32>) {
        assert_eq!(raw.resolve(), expected);
    }

    #[test]
    fn test_raw_year_deserialize() {
        let years: Vec<RawYear> = serde_json::from_str(r#"[2019, "2019"]"#).unwrap();
        assert_eq!(
            years,
            vec![RawYear::Number(2019), RawYear::Text("2019".to_string())]
        );
    }

    #[fixture]
    fn normalizer() -> VenueNormalizer {
        let mut catalog = DoiCatalog::new();
        catalog.insert("10.1145/ABC", "conf/assets", Some(2018));
        catalog.insert("10.1145/noyear", "conf/chi", None);
        VenueNormalizer::new().with_catalog(catalog)
    }

    #[rstest]
    fn test_catalog_takes_precedence(normalizer: VenueNormalizer) {
        let placement = normalizer.place(Some("10.1145/abc"), Some("CHI '19"), Some(2020));
        assert_eq!(
            placement,
            Placement {
                venue: Some("conf/assets".into()),
                year: Some(2018),
            }
        );
    }

    #[rstest]
    fn test_catalog_year_is_not_overridden(normalizer: VenueNormalizer) {
        let placement = normalizer.place(Some("10.1145/NOYEAR"), None, Some(2020));
        assert_eq!(placement.venue.as_deref(), Some("conf/chi"));
        assert_eq!(placement.year, None);
    }

    #[rstest]
    fn test_supplied_year_overrides_venue_year(normalizer: VenueNormalizer) {
        let placement = normalizer.place(Some("10.1000/unknown"), Some("CHI '19"), Some(2020));
        assert_eq!(placement.venue.as_deref(), Some("conf/chi"));
        assert_eq!(placement.year, Some(2020));

        let placement = normalizer.place(None, Some("CHI '19"), None);
        assert_eq!(placement.year, Some(2019));
    }

    #[rstest]
    fn test_no_sources(normalizer: VenueNormalizer) {
        assert_eq!(normalizer.place(None, None, None), Placement::default());
        assert_eq!(
            normalizer.place(None, None, Some(2001)),
            Placement {
                venue: None,
                year: Some(2001),
            }
        );
    }

    #[test]
    fn test_catalog_from_venue_listing() {
        let input = r#"{
            "conf/chi": [
                {"doi": "10.1145/3290605.3300234", "year": 2019, "title": "A"},
                {"doi": null, "year": 2019},
                {"doi": "10.1145/DUP", "year": "2018"}
            ],
            "conf/assets": [
                {"doi": "10.1145/3308561.3353773", "year": 2019},
                {"doi": "10.1145/dup", "year": 2017}
            ]
        }"#;
        let catalog = DoiCatalog::from_venue_listing(input.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.get("10.1145/3290605.3300234"),
            Some(&CatalogEntry {
                venue: "conf/chi".into(),
                year: Some(2019),
            })
        );
        assert_eq!(catalog.get("10.1145/dup").unwrap().venue, "conf/chi");
        assert_eq!(catalog.get("10.1145/dup").unwrap().year, Some(2018));
    }

    #[test]
    fn test_catalog_from_bad_listing() {
        assert!(DoiCatalog::from_venue_listing("[1, 2]".as_bytes()).is_err());
    }
}
