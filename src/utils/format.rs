/// Converts a euro salary with the given EUR→GBP rate, rounded half-up to
/// two decimals.
pub fn convert_salary_to_pounds(salary: i64, gbp_rate: f64) -> f64 {
    (salary as f64 * gbp_rate * 100.0).round() / 100.0
}

/// `£1,335.00` style rendering of a pound amount.
pub fn format_pounds(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}£{grouped}.{cents}")
}
