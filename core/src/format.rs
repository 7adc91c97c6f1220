//! Text formatting for notable-event messages.

/// Whole-unit currency with thousands separators, e.g. `$1,234,567`.
pub fn format_money(value: f64) -> String {
    let units = value.abs().round() as i64;

    let digits = units.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if value < 0.0 && units != 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Signed percentage with two decimals, e.g. `+3.12%`.
pub fn format_percent(value: f64) -> String {
    let sign = if value > 0.0 { "+" } else { "" };
    format!("{sign}{:.2}%", value * 100.0)
}
