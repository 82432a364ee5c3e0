//! Value normalisation shared by every filter step.
//!
//! ERP exports are inconsistent about case, padding and number formatting: the
//! same plant can arrive as the number `6100`, the text `"6100 "` or the text
//! `"06100"`. Every comparison made by the cleaning pipeline goes through
//! [`normalize`] so all steps agree on what "equal" means.

use crate::zerf::tools::model::CellValue;

/// Normalises a cell for comparison.
pub fn normalize(value: &CellValue) -> String {
    normalize_text(&value.to_text())
}

/// Normalises raw text: trims, canonicalises numeric strings and case-folds.
pub fn normalize_text(raw: &str) -> String {
    let trimmed = raw.trim();
    match canonical_number(trimmed) {
        Some(number) => number,
        None => trimmed.to_lowercase(),
    }
}

/// Rewrites plain decimal strings without leading zeros or a trailing zero
/// fraction. Returns `None` for anything that is not `[+-]?digits[.digits]`.
fn canonical_number(text: &str) -> Option<String> {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };

    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (unsigned, ""),
    };

    let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if integer.is_empty() || !all_digits(integer) || !all_digits(fraction) {
        return None;
    }

    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };
    let fraction = fraction.trim_end_matches('0');

    let is_zero = integer == "0" && fraction.is_empty();
    let sign = if is_zero { "" } else { sign };

    if fraction.is_empty() {
        Some(format!("{sign}{integer}"))
    } else {
        Some(format!("{sign}{integer}.{fraction}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_trims() {
        assert_eq!(normalize_text("  DRAFT "), "draft");
        assert_eq!(normalize_text("Presubmit"), "presubmit");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn canonicalises_numeric_strings() {
        assert_eq!(normalize_text("06100"), "6100");
        assert_eq!(normalize_text("6100.0"), "6100");
        assert_eq!(normalize_text(" 6100 "), "6100");
        assert_eq!(normalize_text("000"), "0");
        assert_eq!(normalize_text("-0.00"), "0");
        assert_eq!(normalize_text("12.50"), "12.5");
        assert_eq!(normalize(&CellValue::Number(6100.0)), "6100");
    }

    #[test]
    fn leaves_codes_with_letters_alone() {
        assert_eq!(normalize_text("W91"), "w91");
        assert_eq!(normalize_text("0Z05"), "0z05");
        assert_eq!(normalize_text("1e3"), "1e3");
        assert_eq!(normalize_text("."), ".");
    }
}
