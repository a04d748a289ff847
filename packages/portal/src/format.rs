//! Display formatting shared by cards and exports.

/// Group the integer part of `amount` with dots and prefix it:
/// `currency(1_250_000.0, "Rp")` is `"Rp 1.250.000"`.
pub fn currency(amount: f64, prefix: &str) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if prefix.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{prefix} {grouped}")
    }
}

/// "+12%" / "-8%" / "0%"
pub fn percent_change(percent: i64) -> String {
    if percent > 0 {
        format!("+{percent}%")
    } else {
        format!("{percent}%")
    }
}

/// Compact count for badges: anything above 99 becomes "99+".
pub fn badge_count(count: usize) -> String {
    if count > 99 {
        "99+".to_string()
    } else {
        count.to_string()
    }
}
