use chrono::NaiveDate;

/// Format a monetary value with a dollar sign, thousands separators
/// and exactly two decimal places: `1080.0` becomes `"$1,080.00"`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as u64;
    let dollars = cents / 100;
    let cents_part = cents % 100;

    let digits = dollars.to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).expect("ascii digits"))
        .collect::<Vec<_>>()
        .join(",");

    format!("${}.{:02}", grouped, cents_part)
}

/// Format a date in long English form, independent of locale:
/// 2024-07-24 becomes `"July 24, 2024"`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_has_two_decimals_and_separators() {
        assert_eq!(format_currency(1080.0), "$1,080.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(700.0), "$700.00");
        assert_eq!(format_currency(2_500.5), "$2,500.50");
        assert_eq!(format_currency(1_234_567.89), "$1,234,567.89");
    }

    #[test]
    fn currency_rounds_to_cents() {
        assert_eq!(format_currency(0.005), "$0.01");
        assert_eq!(format_currency(99.999), "$100.00");
    }

    #[test]
    fn dates_use_long_english_form() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 24).unwrap();
        assert_eq!(format_date(date), "July 24, 2024");
        let first = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(format_date(first), "January 1, 2025");
    }
}
