// Display formatting for dashboard numbers

/// Shown wherever a derived value is mathematically undefined.
pub const NOT_AVAILABLE: &str = "N/A";

/// Integer with thousands separators; fractional part is truncated.
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    group_thousands(&format!("{}", value.trunc() as i64))
}

/// Thousands separators with a fixed number of decimals.
pub fn format_decimal(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    group_thousands(&format!("{:.*}", decimals, value))
}

pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format_decimal(v, decimals),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Insert `,` between groups of three digits in the integer part of `number`.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(idx) => unsigned.split_at(idx),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(number.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // zero is never signed
    if grouped == "0" && frac_part.trim_start_matches('.').chars().all(|c| c == '0') {
        return format!("{}{}", grouped, frac_part);
    }
    format!("{}{}{}", sign, grouped, frac_part)
}
