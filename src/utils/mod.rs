/// Convert an American-odds quote ("+150", "-110", "150") to implied probability.
///
/// Unparseable input yields `0.0`, which callers must read as "unknown" rather
/// than a zero-probability outcome.
pub fn american_to_implied_probability(odds: &str) -> f64 {
    let trimmed = odds.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let value: i64 = match digits.parse() {
        Ok(v) => v,
        Err(_) => return 0.0,
    };

    if value > 0 {
        100.0 / (value as f64 + 100.0)
    } else {
        let abs = value.unsigned_abs() as f64;
        abs / (abs + 100.0)
    }
}

/// True when an odds string carries no usable quote ("N/A", "", "-", junk).
pub fn is_placeholder_odds(odds: &str) -> bool {
    let trimmed = odds.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return true;
    }
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits.parse::<i64>().is_err()
}

/// Format an American price from the odds feed ("-110", "+150").
pub fn format_american(price: f64) -> String {
    let rounded = price.round() as i64;
    if rounded > 0 {
        format!("+{}", rounded)
    } else {
        rounded.to_string()
    }
}
