//! Forecast horizon extraction.

use std::sync::LazyLock;

use regex::Regex;

/// Default horizon in months when the question names none.
pub const DEFAULT_HORIZON_MONTHS: u32 = 6;

static MONTHS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s+month").unwrap());
static YEARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s+year").unwrap());
static QUARTERS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s+quarter").unwrap());
static NEXT_N_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"next\s+(\d+)\b").unwrap());

/// Extract a forecast horizon in months from a question.
///
/// Checks, in order: "<N> month(s)", "<N> year(s)" (×12),
/// "<N> quarter(s)" (×3), bare "next <N>" (months). Only the first
/// matching pattern applies; defaults to 6.
pub fn extract_horizon(question: &str) -> u32 {
    let lower = question.to_lowercase();

    let first_capture = |re: &Regex| {
        re.captures(&lower)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    };

    if let Some(n) = first_capture(&MONTHS_RE) {
        return n;
    }
    if let Some(n) = first_capture(&YEARS_RE) {
        return n * 12;
    }
    if let Some(n) = first_capture(&QUARTERS_RE) {
        return n * 3;
    }
    if let Some(n) = first_capture(&NEXT_N_RE) {
        return n;
    }

    DEFAULT_HORIZON_MONTHS
}
