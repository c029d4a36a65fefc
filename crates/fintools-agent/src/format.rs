//! Text helpers shared by the tool formatters.

use serde_json::Value;

use fintools_core::fields::{read_display, read_f64, FieldSource};

/// Placeholder for values the upstream did not send.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fixed decimals with thousands separators: `1234567.891` → `1,234,567.89`.
pub fn grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let digits = integer.as_bytes();
    let mut out = String::with_capacity(formatted.len() + digits.len() / 3);
    out.push_str(sign);
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(char::from(*digit));
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Dollar amount with two decimals, e.g. `$64,000.50`.
pub fn usd(value: f64) -> String {
    format!("${}", grouped(value, 2))
}

/// Title line followed by a rule of `width` copies of `ch`.
pub fn header(title: impl Into<String>, ch: char, width: usize) -> Vec<String> {
    vec![title.into(), ch.to_string().repeat(width)]
}

/// First scalar among `names`, rendered, or `N/A`.
pub fn text_or_na<S: FieldSource + ?Sized>(source: &S, names: &[&str]) -> String {
    read_display(source, names).unwrap_or_else(|| String::from(NOT_AVAILABLE))
}

/// First non-zero number among `names`, or zero.
pub fn number_or_zero<S: FieldSource + ?Sized>(source: &S, names: &[&str]) -> f64 {
    read_f64(source, names).unwrap_or_default()
}

/// Truncates to `max` characters, appending `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Upper-cases the first character.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Appends the `... (+N more records)` trailer when `total` exceeds `shown`.
pub fn push_overflow(lines: &mut Vec<String>, total: usize, shown: usize) {
    if total > shown {
        lines.push(format!("... (+{} more records)", total - shown));
    }
}

/// Number rendered the way the upstream sent it, or `N/A`.
pub fn raw_or_na(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::from(NOT_AVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_inserts_separators() {
        assert_eq!(grouped(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(grouped(999.0, 2), "999.00");
        assert_eq!(grouped(-1234.5, 1), "-1,234.5");
        assert_eq!(grouped(1000.0, 0), "1,000");
    }

    #[test]
    fn usd_prefixes_dollar_sign() {
        assert_eq!(usd(64000.5), "$64,000.50");
    }

    #[test]
    fn truncate_appends_ellipsis_only_when_cut() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("gainers"), "Gainers");
        assert_eq!(capitalize(""), "");
    }
}
