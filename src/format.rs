//! Display helpers for addresses and base-unit amounts.

/// Render a base-unit amount with `decimals` fractional digits.
///
/// `format_amount(1_234_500, 6)` is `"1.234500"`.
pub fn format_amount(amount: u64, decimals: usize) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let digits = format!("{:0>width$}", amount, width = decimals + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals);
    format!("{}.{}", whole, fraction)
}

/// Shorten an address to its first and last `width` characters.
pub fn ellipse_address(address: &str, width: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= width * 2 {
        return address.to_string();
    }
    let head: String = chars[..width].iter().collect();
    let tail: String = chars[chars.len() - width..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_234_500, 6), "1.234500");
        assert_eq!(format_amount(5, 6), "0.000005");
        assert_eq!(format_amount(0, 6), "0.000000");
        assert_eq!(format_amount(42, 0), "42");
        assert_eq!(format_amount(u64::MAX, 6), "18446744073709.551615");
    }

    #[test]
    fn test_ellipse_address() {
        let address = "7ZUECA7HFLZTXENRV24SHLU4AVPUTMTTDUFUBNBD64C73F3UHRTHAIOF6Q";
        assert_eq!(ellipse_address(address, 6), "7ZUECA...AIOF6Q");
        assert_eq!(ellipse_address("SHORT", 6), "SHORT");
        assert_eq!(ellipse_address("", 6), "");
    }
}
