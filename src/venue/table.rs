//! Static venue name tables.
//!
//! Maps the free-text venue names found in Semantic Scholar records onto DBLP venue keys.
//! Names missing from the table fall through to the year-token heuristics in
//! [`normalize_venue`](super::normalize_venue).

use std::collections::HashMap;
use std::sync::LazyLock;

/// Free-text venue name to canonical venue id.
const VENUE_NAME_TABLE: [(&str, &str); 62] = [
    ("HCI", "conf/hci"),
    ("Graphics Interface", "conf/graphicsinterface"),
    ("ASSETS", "conf/assets"),
    ("UIST", "conf/uist"),
    ("UbiCOMP", "conf/huc"),
    ("UbiComp", "conf/huc"),
    ("CSCW", "conf/cscw"),
    ("IUI", "conf/iui"),
    ("DIS", "conf/ACMdis"),
    ("OzCHI", "conf/ozchi"),
    ("TEI", "conf/tei"),
    ("IDC", "conf/acmidc"),
    ("NordiCHI", "conf/nordichi"),
    ("Lecture Notes in Computer Science", "series/lncs"),
    ("BCS HCI", "conf/bcshci"),
    ("INTERSPEECH", "conf/interspeech"),
    ("CUU", "CUU"),
    (
        "IEEE transactions on rehabilitation engineering : a publication of the IEEE Engineering in Medicine and Biology Society",
        "IEEE Transactions on Rehabilitation Engineering",
    ),
    ("ACM Trans. Access. Comput.", "journals/taccess"),
    ("LREC", "conf/lrec"),
    (
        "Optometry and vision science : official publication of the American Academy of Optometry",
        "Optometry and vision science",
    ),
    ("Universal Access in the Information Society", "journals/uais"),
    ("IHC", "conf/ihc"),
    ("AMCIS", "conf/amcis"),
    ("PervasiveHealth", "conf/ph"),
    ("SOUPS", "conf/soups"),
    ("ICWSM", "conf/icwsm"),
    ("Studies in health technology and informatics", "series/shti"),
    ("MIS Q.", "journals/misq"),
    ("HCOMP", "conf/hcomp"),
    ("IxD&A", "journals/ixda"),
    ("ICCHP", "conf/icchp"),
    ("NIME", "conf/nime"),
    ("Human–Computer Interaction Series", "series/hci"),
    // mis-decoded form of the entry above, as it appears in the S2 dump
    ("Humanâ€“Computer Interaction Series", "series/hci"),
    ("MM 2003", "MM"),
    ("HICSS", "conf/hicss"),
    ("ICMC", "conf/icmc"),
    ("EMNLP", "conf/emnlp"),
    ("International Conference on Internet Computing", "conf/ic"),
    ("IEEE Transactions on Biomedical Engineering", "journals/tbe"),
    ("SOUPS @ USENIX Security Symposium", "conf/soups"),
    ("SLPAT@NAACL", "conf/slpat"),
    ("RoCHI", "conf/rochi"),
    ("ICEIS", "conf/iceis"),
    ("CHI PLAY", "conf/chiplay"),
    ("WEBIST", "conf/webist"),
    (
        "Presence: Teleoperators & Virtual Environments",
        "journals/presence",
    ),
    ("USENIX Security Symposium", "conf/uss"),
    ("AAAI", "conf/aaai"),
    ("SLPAT@HLT-NAACL", "conf/slpat"),
    ("ACL", "conf/acl"),
    ("AUIC", "conf/auic"),
    ("ICAD", "conf/icad"),
    (
        "The American journal of occupational therapy : official publication of the American Occupational Therapy Association",
        "The American journal of occupational therapy",
    ),
    ("PETRA", "conf/petra"),
    ("ECIS", "conf/ecis"),
    ("First Monday", "journals/firstmonday"),
    ("TacTT@ITS", "TacTT"),
    ("HLT-NAACL", "conf/naacl"),
    ("Inf. Res.", "journals/ires"),
    ("CHI", "conf/chi"),
];

/// DBLP keys of the venues compared against each other in the diversity analysis.
pub const COMPARATIVE_VENUES: [&str; 13] = [
    "conf/assets",
    "conf/chi",
    "conf/hci",
    "conf/huc",
    "conf/cscw",
    "conf/iui",
    "conf/uist",
    "conf/icchp",
    "conf/ACMdis",
    "conf/ozchi",
    "conf/tei",
    "conf/acmidc",
    "conf/nordichi",
];

static VENUE_NAMES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| VENUE_NAME_TABLE.into_iter().collect());

/// Looks up the canonical id for an exact venue name.
pub(crate) fn lookup(name: &str) -> Option<&'static str> {
    VENUE_NAMES.get(name).copied()
}
