//! Fixed vocabularies the prescription parser recognizes: dosage-form
//! tokens, strength units and frequency phrases.
//!
//! All matching is case-insensitive. Inputs are expected to be lowercase
//! already (the tokenizer lowercases once per token).

use crate::models::{DosageForm, Frequency};

// ---------------------------------------------------------------------------
// Dosage forms
// ---------------------------------------------------------------------------

/// Form tokens as they appear on printed prescriptions.
/// "mj." is a frequent OCR misread of "Inj.".
const FORM_TOKENS: &[(&str, DosageForm)] = &[
    ("tab.", DosageForm::Tablet),
    ("tabs.", DosageForm::Tablet),
    ("tablet", DosageForm::Tablet),
    ("tablets", DosageForm::Tablet),
    ("cap.", DosageForm::Capsule),
    ("caps.", DosageForm::Capsule),
    ("capsule", DosageForm::Capsule),
    ("capsules", DosageForm::Capsule),
    ("inj.", DosageForm::Injection),
    ("mj.", DosageForm::Injection),
    ("injection", DosageForm::Injection),
    ("syrup", DosageForm::Syrup),
    ("syp.", DosageForm::Syrup),
    ("drops", DosageForm::Drops),
];

/// Dotted abbreviations that may be glued to the following word ("Tab.Metformin").
pub const GLUED_FORM_PREFIXES: &[&str] = &["tabs.", "tab.", "caps.", "cap.", "inj.", "mj.", "syp."];

pub fn match_form(lower: &str) -> Option<DosageForm> {
    FORM_TOKENS
        .iter()
        .find(|(token, _)| *token == lower)
        .map(|(_, form)| *form)
}

// ---------------------------------------------------------------------------
// Strength units
// ---------------------------------------------------------------------------

/// Recognized strength units and their canonical spelling.
const UNIT_TOKENS: &[(&str, &str)] = &[
    ("mg", "mg"),
    ("ng", "ng"),
    ("iu/ml", "IU/ml"),
    ("unit", "unit"),
    ("units", "units"),
    ("ml", "ml"),
];

pub fn match_unit(lower: &str) -> Option<&'static str> {
    UNIT_TOKENS
        .iter()
        .find(|(token, _)| *token == lower)
        .map(|(_, canonical)| *canonical)
}

// ---------------------------------------------------------------------------
// Frequency phrases
// ---------------------------------------------------------------------------

/// Whether a phrase states a dosing cadence or only meal timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseKind {
    Cadence,
    Timing,
}

#[derive(Debug)]
pub struct FrequencyPhrase {
    pub words: &'static [&'static str],
    pub kind: PhraseKind,
}

impl FrequencyPhrase {
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

const fn cadence(words: &'static [&'static str]) -> FrequencyPhrase {
    FrequencyPhrase {
        words,
        kind: PhraseKind::Cadence,
    }
}

const fn timing(words: &'static [&'static str]) -> FrequencyPhrase {
    FrequencyPhrase {
        words,
        kind: PhraseKind::Timing,
    }
}

/// Phrase vocabulary in match priority order. Longer phrases precede
/// phrases they contain so the longest reading wins at a given position.
pub const FREQUENCY_PHRASES: &[FrequencyPhrase] = &[
    cadence(&["once", "daily"]),
    cadence(&["once", "a", "day"]),
    cadence(&["twice", "daily"]),
    cadence(&["twice", "a", "day"]),
    cadence(&["thrice", "daily"]),
    cadence(&["three", "times", "daily"]),
    cadence(&["three", "times", "a", "day"]),
    cadence(&["every", "night", "at", "bedtime"]),
    cadence(&["at", "bedtime"]),
    timing(&["after", "meals"]),
    timing(&["after", "breakfast"]),
    timing(&["before", "meals"]),
    timing(&["before", "breakfast"]),
    timing(&["after", "lunch"]),
    timing(&["before", "lunch"]),
    timing(&["after", "dinner"]),
    timing(&["before", "dinner"]),
];

/// Canonical phrases per bucket, checked by containment in this order.
const CANONICAL_PHRASES: &[(&str, Frequency)] = &[
    ("once daily", Frequency::OnceDaily),
    ("once a day", Frequency::OnceDaily),
    ("twice daily", Frequency::TwiceDaily),
    ("twice a day", Frequency::TwiceDaily),
    ("thrice daily", Frequency::ThriceDaily),
    ("three times", Frequency::ThriceDaily),
    ("every night at bedtime", Frequency::EveryNightAtBedtime),
    ("at bedtime", Frequency::EveryNightAtBedtime),
];

/// Map a matched phrase onto its frequency bucket. Phrases that name no
/// cadence (meal timing only) fall back to once daily.
pub fn normalize_frequency(phrase: &str) -> Frequency {
    let lower = phrase.to_lowercase();
    CANONICAL_PHRASES
        .iter()
        .find(|(canonical, _)| lower.contains(canonical))
        .map(|(_, freq)| *freq)
        .unwrap_or(Frequency::OnceDaily)
}

/// The first phrase (in priority order) whose words start at `words[at]`.
pub fn phrase_at(words: &[&str], at: usize) -> Option<&'static FrequencyPhrase> {
    FREQUENCY_PHRASES.iter().find(|phrase| {
        phrase.words.len() <= words.len().saturating_sub(at)
            && phrase
                .words
                .iter()
                .zip(&words[at..])
                .all(|(expected, actual)| expected == actual)
    })
}
