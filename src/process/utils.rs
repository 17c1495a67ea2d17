/// 1) Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// 2) Parse a rating cell. Blank, non-numeric and non-finite text is missing.
pub fn parse_rating(raw: &str) -> Option<f64> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 3) Round to two decimals for display only, ties to even.
/// Values too large to scale by 100 are already whole and come back as-is.
pub fn round2(v: f64) -> f64 {
    let scaled = v * 100.0;
    if !scaled.is_finite() {
        return v;
    }
    let r = scaled.round_ties_even() / 100.0;
    // avoid rendering "-0.0"
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Magnitude from which numbers are written in exponent form.
const EXPONENT_FROM: f64 = 1e16;

/// 4) Render a numeric cell for write-back: two decimals, whole numbers keep
/// one trailing zero ("4.0"), missing values are the empty string. Very
/// large magnitudes use exponent form ("1e307").
pub fn format_number(v: Option<f64>) -> String {
    match v {
        Some(x) => {
            let r = round2(x);
            if r.abs() >= EXPONENT_FROM {
                format!("{:e}", r)
            } else if r.fract() == 0.0 {
                format!("{:.1}", r)
            } else {
                format!("{}", r)
            }
        }
        None => String::new(),
    }
}

/// Cell `idx` of a possibly short row; absent trailing cells read as "".
pub fn cell_at(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rating_handles_noise() {
        assert_eq!(parse_rating("4"), Some(4.0));
        assert_eq!(parse_rating(" 3.5 "), Some(3.5));
        assert_eq!(parse_rating("\"2\""), Some(2.0));
        assert_eq!(parse_rating(""), None);
        assert_eq!(parse_rating("   "), None);
        assert_eq!(parse_rating("n/a"), None);
        assert_eq!(parse_rating("NaN"), None);
        assert_eq!(parse_rating("inf"), None);
    }

    #[test]
    fn format_number_rounds_and_blanks() {
        assert_eq!(format_number(Some(4.0)), "4.0");
        assert_eq!(format_number(Some(3.756)), "3.76");
        assert_eq!(format_number(Some(10.0 / 3.0)), "3.33");
        assert_eq!(format_number(Some(-0.001)), "0.0");
        assert_eq!(format_number(Some(-1.25)), "-1.25");
        assert_eq!(format_number(None), "");
    }

    #[test]
    fn huge_values_stay_numeric() {
        assert_eq!(round2(1e307), 1e307);
        let rendered = format_number(parse_rating("1e307"));
        assert_eq!(rendered, "1e307");
        assert_eq!(parse_rating(&rendered), Some(1e307));
    }

    #[test]
    fn halves_round_to_even() {
        assert_eq!(format_number(Some(4.125)), "4.12");
        assert_eq!(format_number(Some(0.125)), "0.12");
        assert_eq!(format_number(Some(0.375)), "0.38");
        assert_eq!(format_number(Some(-1.125)), "-1.12");
    }

    #[test]
    fn cell_at_pads_short_rows() {
        let row = vec!["a".to_string()];
        assert_eq!(cell_at(&row, 0), "a");
        assert_eq!(cell_at(&row, 5), "");
    }
}
