//! Currency formatting for tool output

use rust_decimal::Decimal;

/// `$1234.50`: two decimals, no grouping
pub fn usd(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// `$65,000.50`: two decimals with thousands separators
pub fn usd_grouped(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{frac_part}")
}
