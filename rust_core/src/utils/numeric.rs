//! Lenient numeric parsing for operator- and OCR-supplied market fields.
//!
//! Every parser is total: anything that cannot be read as a finite number
//! comes back as `None` and the rules depending on it simply stay silent.

/// Parse a display number such as "67%", "+2.5", "−3" or " -108 ".
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }

    // OCR often yields the Unicode minus sign
    let normalized = trimmed.replace('\u{2212}', "-");
    let unsigned = normalized.strip_prefix('+').unwrap_or(&normalized);

    unsigned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a point spread; pick'em spellings read as zero.
pub fn parse_spread(raw: &str) -> Option<f64> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pk" | "pick" | "pick'em" | "pickem" | "even" | "ev" => Some(0.0),
        other => parse_number(other),
    }
}

/// Parse a share percentage; values outside [0, 100] are unusable.
pub fn parse_share_pct(raw: &str) -> Option<f64> {
    parse_number(raw).filter(|pct| (0.0..=100.0).contains(pct))
}

/// Render a spread the way sportsbooks print it: "+9", "-2.5", "PK".
pub fn format_spread(spread: f64) -> String {
    if spread == 0.0 {
        return "PK".to_string();
    }
    let body = if spread.fract() == 0.0 {
        format!("{}", spread.abs() as i64)
    } else {
        format!("{}", spread.abs())
    };
    if spread > 0.0 {
        format!("+{}", body)
    } else {
        format!("-{}", body)
    }
}

/// Render a percentage without a trailing ".0".
pub fn format_pct(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{}%", pct as i64)
    } else {
        format!("{:.1}%", pct)
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
