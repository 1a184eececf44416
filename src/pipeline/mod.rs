pub mod prescription; // OCR / manual prescription text parsing

pub use prescription::{correct_ocr_terms, parse_prescription_text};
