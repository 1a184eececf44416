//! Prescription text → structured medication entries.
//!
//! A line-oriented tokenizer feeds a small state machine
//! (form → name → strength → frequency) over fixed vocabularies.
//! Nothing here fails: unrecognized lines are skipped.

pub mod correction;
pub mod parser;
pub mod tokenizer;
pub mod vocabulary;

pub use correction::correct_ocr_terms;
pub use parser::{parse_line, parse_prescription_text};
