// SPDX-License-Identifier: Apache-2.0

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;
const THOUSAND: f64 = 1_000.0;

/// `₹1.23Cr`, `₹4.50L`, `₹7.00K`, `₹12.00`.
#[must_use]
pub fn format_rupees(value: f64) -> String {
    if value >= CRORE {
        format!("₹{:.2}Cr", value / CRORE)
    } else if value >= LAKH {
        format!("₹{:.2}L", value / LAKH)
    } else if value >= THOUSAND {
        format!("₹{:.2}K", value / THOUSAND)
    } else {
        format!("₹{value:.2}")
    }
}

/// Whole number with comma thousands separators.
#[must_use]
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupee_thresholds() {
        assert_eq!(format_rupees(12_345_678.0), "₹1.23Cr");
        assert_eq!(format_rupees(10_000_000.0), "₹1.00Cr");
        assert_eq!(format_rupees(9_999_999.0), "₹100.00L");
        assert_eq!(format_rupees(450_000.0), "₹4.50L");
        assert_eq!(format_rupees(7_000.0), "₹7.00K");
        assert_eq!(format_rupees(999.5), "₹999.50");
        assert_eq!(format_rupees(0.0), "₹0.00");
    }

    #[test]
    fn counts_get_separators() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1_000.0), "1,000");
        assert_eq!(format_count(1_234_567.4), "1,234,567");
        assert_eq!(format_count(-12_000.0), "-12,000");
    }
}
