//! # Label Normalization
//!
//! Turns raw form fields into the [`LabelRecord`] the composer prints, and
//! reports missing fields back to the form as a field → message map.
//!
//! Numbers are read the way a browser's `parseFloat` reads them: the longest
//! numeric prefix wins and trailing garbage is ignored, so `"50 см"` is 50.
//! When a dimension has no numeric prefix at all, the raw text is printed
//! as typed instead of failing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{FormData, LabelRecord};
use crate::settings::Language;

/// Characters stripped from both ends of a title, besides whitespace.
const QUOTE_CHARS: &[char] = &[
    '"', '\'', '`', '«', '»', '„', '“', '”', '‘', '’', '‚', '‹', '›', '＂',
];

fn is_js_whitespace(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{FEFF}'
}

fn js_trim(s: &str) -> &str {
    s.trim_matches(is_js_whitespace)
}

/// Strip quote marks and whitespace from both ends of `s`.
///
/// Interior quotes are left alone: `«Слово» и «ещё»` becomes `Слово» и «ещё`.
pub fn strip_quotes(s: &str) -> String {
    s.trim_matches(|c: char| is_js_whitespace(c) || QUOTE_CHARS.contains(&c))
        .to_string()
}

/// Parse the leading decimal number of `s`, ignoring anything after it.
///
/// Returns `None` when `s` (after leading whitespace) does not start with a
/// number.
pub fn parse_leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start_matches(is_js_whitespace);
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // A lone "." after digits is still a valid prefix ("5." is 5)
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Format one dimension: integral values without a decimal point, anything
/// else with exactly one decimal digit (half-way cases round away from zero).
/// Magnitudes from 1e21 up use exponent notation, as JavaScript prints them.
pub fn format_dimension(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.fract() == 0.0 {
        if value == 0.0 {
            return "0".to_string();
        }
        if value.abs() >= 1e21 {
            return format!("{:e}", value).replace('e', "e+");
        }
        return format!("{}", value);
    }
    to_fixed_one(value)
}

/// One-decimal rounding on the exact binary value, ties away from zero.
fn to_fixed_one(value: f64) -> String {
    let exact = format!("{:.60}", value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), "0"));
    let mut frac = frac_part.bytes();
    let tenths = frac.next().map(|b| b - b'0').unwrap_or(0);
    let next = frac.next().map(|b| b - b'0').unwrap_or(0);

    let mut whole: u128 = int_part.parse().unwrap_or(0);
    let mut tenths = tenths as u128;
    if next >= 5 {
        tenths += 1;
        if tenths == 10 {
            tenths = 0;
            whole += 1;
        }
    }

    // Negatives keep their sign even when they round to zero
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, whole, tenths)
}

/// Format the size line: `"{height} × {width} см"`.
///
/// If either value is not a number both raw strings are substituted as
/// typed.
pub fn format_size(width: &str, height: &str) -> String {
    match (parse_leading_number(width), parse_leading_number(height)) {
        (Some(w), Some(h)) => format!("{} × {} см", format_dimension(h), format_dimension(w)),
        _ => format!("{} × {} см", height, width),
    }
}

/// The required fields of the catalog form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Width,
    Height,
    Technique,
    Material,
}

impl Field {
    pub const REQUIRED: [Field; 5] = [
        Field::Title,
        Field::Width,
        Field::Height,
        Field::Technique,
        Field::Material,
    ];

    fn value<'a>(&self, form: &'a FormData) -> &'a str {
        match self {
            Field::Title => &form.title,
            Field::Width => &form.width,
            Field::Height => &form.height,
            Field::Technique => &form.technique,
            Field::Material => &form.material,
        }
    }

    fn is_blank(&self, form: &FormData) -> bool {
        match self {
            Field::Title => strip_quotes(&form.title).is_empty(),
            _ => js_trim(self.value(form)).is_empty(),
        }
    }
}

/// Per-field validation messages. Empty means the form is valid.
pub type ValidationErrors = BTreeMap<Field, String>;

/// True when every required field is filled in.
pub fn is_label_ready(form: &FormData) -> bool {
    Field::REQUIRED.iter().all(|field| !field.is_blank(form))
}

/// Build the label record, or `None` if any required field is missing.
pub fn build_label_record(form: &FormData) -> Option<LabelRecord> {
    if !is_label_ready(form) {
        return None;
    }

    let technique = js_trim(&form.technique);
    let material = js_trim(&form.material);

    Some(LabelRecord {
        title: strip_quotes(&form.title),
        author: js_trim(&form.author).to_string(),
        size: format_size(js_trim(&form.width), js_trim(&form.height)),
        technique_and_material: format!("{} / {}", technique, material),
        year: js_trim(&form.year).to_string(),
    })
}

/// Validate the form, returning one message per offending field.
pub fn validate(form: &FormData, language: Language) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for field in Field::REQUIRED {
        if field.is_blank(form) {
            errors.insert(field, required_message(field, language).to_string());
            continue;
        }
        if matches!(field, Field::Width | Field::Height) {
            let positive = parse_leading_number(field.value(form))
                .map(|v| v.is_finite() && v > 0.0)
                .unwrap_or(false);
            if !positive {
                errors.insert(field, positive_number_message(language).to_string());
            }
        }
    }

    errors
}

fn required_message(field: Field, language: Language) -> &'static str {
    match (language, field) {
        (Language::Ru, Field::Title) => "Укажите название",
        (Language::Ru, Field::Width) => "Укажите ширину",
        (Language::Ru, Field::Height) => "Укажите высоту",
        (Language::Ru, Field::Technique) => "Выберите технику",
        (Language::Ru, Field::Material) => "Выберите материал",
        (Language::En, Field::Title) => "Title is required",
        (Language::En, Field::Width) => "Width is required",
        (Language::En, Field::Height) => "Height is required",
        (Language::En, Field::Technique) => "Technique is required",
        (Language::En, Field::Material) => "Material is required",
    }
}

fn positive_number_message(language: Language) -> &'static str {
    match language {
        Language::Ru => "Введите положительное число",
        Language::En => "Enter a positive number",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sunset_form() -> FormData {
        FormData {
            title: "  Закат  ".to_string(),
            author: " Иван Петров ".to_string(),
            width: "50".to_string(),
            height: "70".to_string(),
            technique: "Масло".to_string(),
            material: "холст".to_string(),
            year: "2024".to_string(),
        }
    }

    #[test]
    fn format_size_integral() {
        assert_eq!(format_size("50", "70"), "70 × 50 см");
    }

    #[test]
    fn format_size_fractional() {
        assert_eq!(format_size("50.5", "70.3"), "70.3 × 50.5 см");
        assert_eq!(format_size("50.25", "70.04"), "70.0 × 50.3 см");
    }

    #[test]
    fn format_size_non_numeric_uses_raw_strings() {
        assert_eq!(format_size("abc", "70"), "70 × abc см");
        assert_eq!(format_size("50", "?"), "? × 50 см");
    }

    #[test]
    fn format_size_ignores_trailing_text() {
        assert_eq!(format_size("50 см", "70,5"), "70 × 50 см");
    }

    #[test]
    fn parse_leading_number_prefixes() {
        assert_eq!(parse_leading_number("  42.5abc"), Some(42.5));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("5."), Some(5.0));
        assert_eq!(parse_leading_number("1e3"), Some(1000.0));
        assert_eq!(parse_leading_number("1e"), Some(1.0));
        assert_eq!(parse_leading_number("-3"), Some(-3.0));
        assert_eq!(parse_leading_number("."), None);
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn format_dimension_rounding() {
        assert_eq!(format_dimension(70.0), "70");
        assert_eq!(format_dimension(0.25), "0.3");
        assert_eq!(format_dimension(2.96), "3.0");
        assert_eq!(format_dimension(-1.25), "-1.3");
        assert_eq!(format_dimension(-0.0), "0");
        assert_eq!(format_dimension(-0.04), "-0.0");
        assert_eq!(format_dimension(-0.05), "-0.1");
    }

    #[test]
    fn format_dimension_huge_values_use_exponent() {
        assert_eq!(format_dimension(1e20), "100000000000000000000");
        assert_eq!(format_dimension(1e21), "1e+21");
        assert_eq!(format_dimension(1.5e22), "1.5e+22");
        assert_eq!(format_dimension(-2e25), "-2e+25");
        assert_eq!(format_size("1e21", "3"), "3 × 1e+21 см");
    }

    #[test]
    fn strip_quotes_examples() {
        assert_eq!(strip_quotes("  «Название»  "), "Название");
        assert_eq!(strip_quotes("«»"), "");
        assert_eq!(strip_quotes("«Слово» и «ещё»"), "Слово» и «ещё");
        assert_eq!(strip_quotes("\"Sunset\""), "Sunset");
        assert_eq!(strip_quotes("“It’s”"), "It’s");
    }

    #[test]
    fn strip_quotes_is_idempotent() {
        let samples = [
            "",
            "   ",
            "«»",
            " „Ночь“ ",
            "'a' b 'c'",
            "«Слово» и «ещё»",
            "plain",
            "\"«'nested'»\"",
        ];
        for s in samples {
            let once = strip_quotes(s);
            assert_eq!(strip_quotes(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn build_label_record_sunset() {
        let label = build_label_record(&sunset_form()).unwrap();
        assert_eq!(
            label,
            LabelRecord {
                title: "Закат".to_string(),
                author: "Иван Петров".to_string(),
                size: "70 × 50 см".to_string(),
                technique_and_material: "Масло / холст".to_string(),
                year: "2024".to_string(),
            }
        );
    }

    #[test]
    fn build_label_record_strips_title_quotes() {
        let mut form = sunset_form();
        form.title = " «Закат» ".to_string();
        assert_eq!(build_label_record(&form).unwrap().title, "Закат");
    }

    #[test]
    fn build_label_record_requires_every_field() {
        let blankers: [fn(&mut FormData); 6] = [
            |f| f.title = "   ".to_string(),
            |f| f.title = "«»".to_string(),
            |f| f.width = String::new(),
            |f| f.height = "\t".to_string(),
            |f| f.technique = String::new(),
            |f| f.material = " ".to_string(),
        ];
        for blank in blankers {
            let mut form = sunset_form();
            blank(&mut form);
            assert!(build_label_record(&form).is_none(), "{:?}", form);
            assert!(!is_label_ready(&form));
        }
    }

    #[test]
    fn optional_fields_may_be_empty() {
        let mut form = sunset_form();
        form.author = "  ".to_string();
        form.year = String::new();
        let label = build_label_record(&form).unwrap();
        assert!(label.author.is_empty());
        assert!(label.year.is_empty());
    }

    #[test]
    fn validate_reports_missing_and_invalid_fields() {
        let form = FormData {
            title: "A".to_string(),
            width: "abc".to_string(),
            height: "-5".to_string(),
            ..Default::default()
        };
        let errors = validate(&form, Language::En);
        assert_eq!(errors.get(&Field::Width).unwrap(), "Enter a positive number");
        assert_eq!(errors.get(&Field::Height).unwrap(), "Enter a positive number");
        assert_eq!(errors.get(&Field::Technique).unwrap(), "Technique is required");
        assert!(errors.contains_key(&Field::Material));
        assert!(!errors.contains_key(&Field::Title));
    }

    #[test]
    fn validate_accepts_complete_form() {
        assert!(validate(&sunset_form(), Language::Ru).is_empty());
    }
}
