//! Post-OCR drug-name correction.
//!
//! Opt-in pass run on OCR output before parsing. Repairs misspellings of
//! known diabetes-care medications by edit distance. Only corrects when the
//! word is at least 5 characters long, the distance is at most 2 and exactly
//! one dictionary term is closest.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Drug names for correction. Sorted for binary search, lowercase.
const DRUG_TERMS: &[&str] = &[
    "acarbose", "amlodipine", "aspirin", "atorvastatin", "canagliflozin",
    "dapagliflozin", "empagliflozin", "enalapril", "glargine", "glibenclamide",
    "gliclazide", "glimepiride", "glipizide", "humalog", "insulin",
    "lantus", "linagliptin", "lisinopril", "lispro", "losartan",
    "metformin", "pioglitazone", "rosuvastatin", "saxagliptin", "semaglutide",
    "sitagliptin", "telmisartan", "vildagliptin",
];

const MAX_DISTANCE: u32 = 2;

/// Candidate words: runs of five or more letters. Words touching a digit
/// ("B12", "D3") are not candidates.
static RE_CANDIDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\p{L}{5,}\b").expect("valid regex"));

/// Correct OCR misspellings of known drug names in `text`.
/// Everything that is not a correctable word passes through unchanged.
pub fn correct_ocr_terms(text: &str) -> String {
    RE_CANDIDATE
        .replace_all(text, |caps: &Captures| {
            let word = &caps[0];
            match closest_term(&word.to_lowercase()) {
                Some(term) => {
                    tracing::debug!(from = word, to = term, "OCR drug name corrected");
                    Case::of(word).apply(term)
                }
                None => word.to_string(),
            }
        })
        .into_owned()
}

/// The single dictionary term within `MAX_DISTANCE` of `lower`. None for
/// exact matches, for no match, and for ties between terms.
fn closest_term(lower: &str) -> Option<&'static str> {
    if DRUG_TERMS.binary_search(&lower).is_ok() {
        return None;
    }
    let len = lower.chars().count();
    let scored: Vec<(u32, &'static str)> = DRUG_TERMS
        .iter()
        .filter(|term| len.abs_diff(term.len()) <= MAX_DISTANCE as usize)
        .map(|&term| (edit_distance(lower, term), term))
        .filter(|&(dist, _)| dist <= MAX_DISTANCE)
        .collect();

    let best = scored.iter().map(|&(dist, _)| dist).min()?;
    let mut at_best = scored.iter().filter(|&&(dist, _)| dist == best);
    match (at_best.next(), at_best.next()) {
        (Some(&(_, term)), None) => Some(term),
        _ => None,
    }
}

/// Capitalization of a scanned word, reapplied to its correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Upper,
    Title,
    Lower,
}

impl Case {
    fn of(word: &str) -> Self {
        if !word.chars().any(char::is_lowercase) {
            Self::Upper
        } else if word.chars().next().is_some_and(char::is_uppercase) {
            Self::Title
        } else {
            Self::Lower
        }
    }

    fn apply(self, term: &str) -> String {
        match self {
            Self::Upper => term.to_uppercase(),
            Self::Lower => term.to_string(),
            Self::Title => {
                let mut chars = term.chars();
                chars
                    .next()
                    .map(|first| first.to_uppercase().chain(chars).collect())
                    .unwrap_or_default()
            }
        }
    }
}

/// Levenshtein distance over chars, one row plus the diagonal.
fn edit_distance(a: &str, b: &str) -> u32 {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<u32> = (0..=b.len() as u32).collect();

    for (i, a_ch) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i as u32 + 1;
        for (j, &b_ch) in b.iter().enumerate() {
            let substitution = diagonal + u32::from(a_ch != b_ch);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}
