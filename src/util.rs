// Parsing and number-formatting helpers.
//
// Workbook cells arrive in a mix of shapes (numbers, numeric text with
// separators, blanks); everything numeric funnels through here so the loader
// can work with plain `f64`s.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues common in hand-edited spreadsheets.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // "-0" after rounding is just 0
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Whole-unit volume, e.g. `1,234,568`.
pub fn format_volume(gj: f64) -> String {
    format_number(gj, 0)
}

/// Million-USD figure as currency, e.g. `$1,234.57M`.
pub fn format_musd(v: f64) -> String {
    let body = format_number(v, 2);
    match body.strip_prefix('-') {
        Some(abs) => format!("-${}M", abs),
        None => format!("${}M", body),
    }
}

pub fn format_percent(v: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, v)
}

/// Escape text for HTML and inline SVG.
pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_safe_accepts_separators() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(0.0, 0), "0");
    }

    #[test]
    fn currency_and_percent() {
        assert_eq!(format_musd(1234.567), "$1,234.57M");
        assert_eq!(format_musd(-12.5), "-$12.50M");
        assert_eq!(format_percent(12.346, 2), "12.35%");
        assert_eq!(format_percent(80.0, 1), "80.0%");
        assert_eq!(format_volume(999_999.6), "1,000,000");
    }

    #[test]
    fn markup_escaping() {
        assert_eq!(escape_markup("<a & 'b'>"), "&lt;a &amp; &#x27;b&#x27;&gt;");
        assert_eq!(escape_markup("E-Diesel"), "E-Diesel");
    }
}
