use crate::models::MedicationEntry;

use super::tokenizer::{tokenize_line, Token, TokenKind};
use super::vocabulary::{match_form, match_unit, normalize_frequency, phrase_at, PhraseKind};

/// Parse free-form prescription text into medication entries.
///
/// One entry per line that names a dosage form, a medication and a
/// frequency phrase. Lines that don't are skipped; an empty result is a
/// normal outcome ("nothing recognized"), not an error.
pub fn parse_prescription_text(text: &str) -> Vec<MedicationEntry> {
    let entries: Vec<MedicationEntry> = text.lines().filter_map(parse_line).collect();
    tracing::debug!(
        lines = text.lines().count(),
        parsed = entries.len(),
        "Prescription text parsed"
    );
    entries
}

/// Parser states, in the order a line is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekForm,
    Name,
    Strength,
    SeekFrequency,
}

/// Parse a single line. Returns None when the line does not describe a medication.
pub fn parse_line(line: &str) -> Option<MedicationEntry> {
    let tokens = tokenize_line(line);
    if tokens.is_empty() {
        return None;
    }
    let keys: Vec<&str> = tokens.iter().map(Token::phrase_key).collect();

    let mut state = State::SeekForm;
    let mut at = 0usize;
    let mut form = None;
    let mut name_words: Vec<&str> = Vec::new();
    let mut strength = String::new();

    while state != State::SeekFrequency {
        match state {
            State::SeekForm => {
                let (idx, found) = tokens
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.is_word())
                    .find_map(|(i, t)| match_form(&t.lower).map(|f| (i, f)))?;
                form = Some(found);
                at = idx + 1;
                state = State::Name;
            }
            State::Name => {
                let Some(token) = tokens.get(at) else {
                    state = State::SeekFrequency;
                    continue;
                };
                if token.kind == TokenKind::Aside {
                    // Brand names and other asides end the name and are dropped.
                    at = skip_asides(&tokens, at);
                    state = State::Strength;
                } else if strength_at(&tokens, at).is_some() {
                    state = State::Strength;
                } else if phrase_at(&keys, at).is_some() {
                    state = State::SeekFrequency;
                } else if token.is_alphanumeric_word() {
                    name_words.push(&token.text);
                    at += 1;
                } else if let Some(prefix) = token.alphanumeric_prefix() {
                    // "Glycomet-GP": the leading run ends the name, the rest is filler.
                    name_words.push(prefix);
                    at += 1;
                    state = State::Strength;
                } else {
                    state = State::SeekFrequency;
                }
            }
            State::Strength => {
                if let Some((text, consumed)) = strength_at(&tokens, at) {
                    strength = text;
                    at += consumed;
                }
                state = State::SeekFrequency;
            }
            State::SeekFrequency => break,
        }
    }

    if name_words.is_empty() {
        tracing::trace!(line, "Form token without a medication name");
        return None;
    }

    let Some(phrase) = find_frequency_phrase(&keys, at) else {
        tracing::trace!(line, "No frequency phrase found");
        return None;
    };

    Some(MedicationEntry::new(
        form?,
        name_words.join(" "),
        strength,
        normalize_frequency(&phrase),
    ))
}

fn skip_asides(tokens: &[Token], mut at: usize) -> usize {
    while tokens.get(at).is_some_and(|t| t.kind == TokenKind::Aside) {
        at += 1;
    }
    at
}

/// A strength ("500 mg") starting at `at`, with the number of tokens it spans.
fn strength_at(tokens: &[Token], at: usize) -> Option<(String, usize)> {
    let number = tokens.get(at).filter(|t| t.is_number())?;
    let unit = tokens
        .get(at + 1)
        .filter(|t| t.is_word())
        .and_then(|t| match_unit(t.phrase_key()))?;
    Some((format!("{} {}", number.text, unit), 2))
}

/// Scan the rest of the line for a frequency phrase. A cadence phrase
/// anywhere wins over an earlier meal-timing phrase, since the timing
/// phrase alone cannot name the bucket.
fn find_frequency_phrase(keys: &[&str], from: usize) -> Option<String> {
    let mut first_timing = None;
    for at in from..keys.len() {
        if let Some(phrase) = phrase_at(keys, at) {
            match phrase.kind {
                PhraseKind::Cadence => return Some(phrase.text()),
                PhraseKind::Timing => {
                    first_timing.get_or_insert_with(|| phrase.text());
                }
            }
        }
    }
    first_timing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DosageForm, Frequency};

    const SAMPLE: &str = "
Inj. Insulin Glargine (Lantus) 100 IU/ml 20 unit Subcutaneous After meals Every night at bedtime 50 days --- 1000
Inj. Insulin Lispro (Humalog) 100 IU/ml 60 unit Subcutaneous Before meals Thrice daily 18 days --- 1000
Tab. Metformin 500 mg 1 unit Oral After meals Twice daily 30 days --- 60
Tab. Telmisartan 40 mg 1 unit Oral Before meals Once a day 30 days --- 30
";

    #[test]
    fn metformin_line_parses_to_twice_daily() {
        let entry = parse_line(
            "Tab. Metformin 500 mg 1 unit Oral After meals Twice daily 30 days --- 60",
        )
        .unwrap();
        assert_eq!(entry.form, DosageForm::Tablet);
        assert_eq!(entry.name, "Metformin");
        assert_eq!(entry.strength, "500 mg");
        assert_eq!(entry.frequency, Frequency::TwiceDaily);
        assert_eq!(entry.times_csv(), "08:00,20:00");
    }

    #[test]
    fn full_sample_parses_every_line() {
        let entries = parse_prescription_text(SAMPLE);
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0].form, DosageForm::Injection);
        assert_eq!(entries[0].name, "Insulin Glargine");
        assert_eq!(entries[0].strength, "100 IU/ml");
        assert_eq!(entries[0].frequency, Frequency::EveryNightAtBedtime);

        assert_eq!(entries[1].name, "Insulin Lispro");
        assert_eq!(entries[1].frequency, Frequency::ThriceDaily);
        assert_eq!(entries[1].times_csv(), "08:00,14:00,20:00");

        assert_eq!(entries[3].name, "Telmisartan");
        assert_eq!(entries[3].strength, "40 mg");
        assert_eq!(entries[3].frequency, Frequency::OnceDaily);
    }

    #[test]
    fn parenthetical_is_stripped_from_name() {
        let entry = parse_line("Inj. Insulin Glargine (Lantus) 100 IU/ml At bedtime").unwrap();
        assert_eq!(entry.name, "Insulin Glargine");
        assert!(!entry.name.contains("Lantus"));
    }

    #[test]
    fn unit_with_sentence_period_is_still_a_strength() {
        let entry = parse_line("Tab. Metformin 500 mg. twice daily").unwrap();
        assert_eq!(entry.name, "Metformin");
        assert_eq!(entry.strength, "500 mg");
        assert_eq!(entry.frequency, Frequency::TwiceDaily);

        let entry = parse_line("Tab. Metformin 500mg. twice daily").unwrap();
        assert_eq!(entry.name, "Metformin");
        assert_eq!(entry.strength, "500 mg");
    }

    #[test]
    fn hyphenated_brand_keeps_leading_name() {
        let entry = parse_line("Tab. Glycomet-GP 1 twice daily").unwrap();
        assert_eq!(entry.name, "Glycomet");
        assert_eq!(entry.strength, "");
        assert_eq!(entry.frequency, Frequency::TwiceDaily);

        let entry = parse_line("Tab. Glycomet-GP 500 mg once daily").unwrap();
        assert_eq!(entry.name, "Glycomet");
        assert_eq!(entry.strength, "500 mg");
    }

    #[test]
    fn numbered_line_with_glued_form() {
        let entry = parse_line("1.Tab.Metformin 500 mg twice daily").unwrap();
        assert_eq!(entry.form, DosageForm::Tablet);
        assert_eq!(entry.name, "Metformin");
        assert_eq!(entry.strength, "500 mg");
    }

    #[test]
    fn missing_strength_does_not_shift_fields() {
        let entry = parse_line("Tab. Glimepiride Oral Before breakfast Once daily").unwrap();
        assert_eq!(entry.name, "Glimepiride Oral");
        assert_eq!(entry.strength, "");
        assert_eq!(entry.frequency, Frequency::OnceDaily);

        let entry = parse_line("Tab. Glimepiride twice daily").unwrap();
        assert_eq!(entry.name, "Glimepiride");
        assert_eq!(entry.strength, "");
        assert_eq!(entry.frequency, Frequency::TwiceDaily);
    }

    #[test]
    fn name_does_not_swallow_frequency() {
        let entry = parse_line("Caps. Vitamin D3 once daily after breakfast").unwrap();
        assert_eq!(entry.form, DosageForm::Capsule);
        assert_eq!(entry.name, "Vitamin D3");
        assert_eq!(entry.frequency, Frequency::OnceDaily);
    }

    #[test]
    fn bare_number_without_unit_stays_in_name() {
        let entry = parse_line("Tab. Aspirin 75 after dinner").unwrap();
        assert_eq!(entry.name, "Aspirin 75");
        assert_eq!(entry.strength, "");
    }

    #[test]
    fn glued_tokens_are_recognized() {
        let entry = parse_line("tab.metformin 500MG TWICE DAILY").unwrap();
        assert_eq!(entry.form, DosageForm::Tablet);
        assert_eq!(entry.name, "metformin");
        assert_eq!(entry.strength, "500 mg");
        assert_eq!(entry.frequency, Frequency::TwiceDaily);
    }

    #[test]
    fn timing_only_phrase_defaults_to_once_daily() {
        let entry = parse_line("Syrup Lactulose 15 ml after dinner").unwrap();
        assert_eq!(entry.form, DosageForm::Syrup);
        assert_eq!(entry.strength, "15 ml");
        assert_eq!(entry.frequency, Frequency::OnceDaily);
        assert_eq!(entry.times_csv(), "08:00");
    }

    #[test]
    fn ocr_misread_injection_token() {
        let entry = parse_line("mj. Insulin Aspart 10 units thrice daily").unwrap();
        assert_eq!(entry.form, DosageForm::Injection);
        assert_eq!(entry.strength, "10 units");
    }

    #[test]
    fn lines_without_form_token_produce_nothing() {
        assert!(parse_line("Metformin 500 mg twice daily").is_none());
        assert!(parse_prescription_text("Dr. Rao, Diabetes Clinic\nDate: 02/09/2025").is_empty());
    }

    #[test]
    fn lines_without_frequency_produce_nothing() {
        assert!(parse_line("Tab. Metformin 500 mg 30 days").is_none());
    }

    #[test]
    fn form_without_name_produces_nothing() {
        assert!(parse_line("Tab. 500 mg twice daily").is_none());
        assert!(parse_line("Tab. (Glycomet) twice daily").is_none());
    }

    #[test]
    fn empty_input_is_empty_result() {
        assert!(parse_prescription_text("").is_empty());
        assert!(parse_prescription_text("   \n\t\n").is_empty());
    }

    #[test]
    fn duplicate_lines_are_not_deduplicated() {
        let text = "Tab. Metformin 500 mg twice daily\nTab. Metformin 500 mg twice daily";
        assert_eq!(parse_prescription_text(text).len(), 2);
    }

    #[test]
    fn multi_line_entries_are_not_joined() {
        let text = "Tab. Metformin 500 mg\nTwice daily";
        assert!(parse_prescription_text(text).is_empty());
    }

    #[test]
    fn parsing_is_deterministic() {
        let first = serde_json::to_string(&parse_prescription_text(SAMPLE)).unwrap();
        for _ in 0..5 {
            let again = serde_json::to_string(&parse_prescription_text(SAMPLE)).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn reminder_times_always_match_frequency() {
        for entry in parse_prescription_text(SAMPLE) {
            assert_eq!(entry.reminder_times(), entry.frequency.reminder_times());
        }
    }
}
