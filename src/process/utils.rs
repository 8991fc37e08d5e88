/// Trim whitespace + strip one pair of outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Longest leading numeric prefix of `s` (sign, digits, fraction, exponent).
/// `"42 hrs"` → `Some(42.0)`, `"abc"` → `None`.
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
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
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    // exponent only counts when at least one digit follows it
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

/// Parse a spreadsheet cell as a number, stripping thousands separators.
/// Returns `None` when the cell has no numeric prefix at all.
pub fn parse_number(raw: &str) -> Option<f64> {
    let stripped = raw.replace(',', "");
    leading_number(stripped.trim()).filter(|n| n.is_finite())
}

/// Lossy numeric coercion: blank, placeholder text or overflow all become `0.0`.
pub fn coerce_number(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

/// Whole days from a cell, truncated toward zero.
pub fn parse_days(raw: &str) -> i64 {
    coerce_number(raw).trunc() as i64
}

/// Lower-case, trim, and keep only the text before the first `:`.
/// `"LTIFR: 5"` → `"ltifr"`. Idempotent.
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    match lowered.split_once(':') {
        Some((head, _)) => head.trim().to_string(),
        None => lowered.trim().to_string(),
    }
}
