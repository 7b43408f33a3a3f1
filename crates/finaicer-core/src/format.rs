//! Amount formatting for alert messages and reports

/// Render an amount with comma thousands separators and at most two decimals
///
/// Trailing zeros in the fraction are dropped: `300000.0` → `300,000`,
/// `1234.5` → `1,234.5`.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let rendered = format!("{:.2}", amount.abs());
    let (digits, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let decimals = fraction.trim_end_matches('0');
    let mut out = String::new();
    if amount < 0.0 && (digits != "0" || !decimals.is_empty()) {
        out.push('-');
    }
    out.push_str(&grouped);
    if !decimals.is_empty() {
        out.push('.');
        out.push_str(decimals);
    }
    out
}
