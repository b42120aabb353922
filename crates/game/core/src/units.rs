//! Ether ⇄ wei conversion for stakes and payouts.
//!
//! The only user-supplied parameter is a decimal stake; it is converted to
//! the authority's native integer unit before submission.

/// Native integer unit of value (1 ether = 10^18 wei).
pub type Wei = u128;

pub const ETHER_DECIMALS: usize = 18;
pub const WEI_PER_ETHER: Wei = 1_000_000_000_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must not be negative")]
    Negative,

    #[error("invalid decimal amount: {0}")]
    Invalid(String),

    #[error("too many decimal places ({0}, max 18)")]
    TooPrecise(usize),

    #[error("amount does not fit in wei")]
    Overflow,
}

/// Parse a decimal ether amount such as `"0.05"` into wei.
pub fn parse_ether(input: &str) -> Result<Wei, UnitsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UnitsError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(UnitsError::Negative);
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(UnitsError::Invalid(trimmed.to_string()));
    }
    if fraction.len() > ETHER_DECIMALS {
        return Err(UnitsError::TooPrecise(fraction.len()));
    }

    let whole_wei = digits_to_u128(whole)?
        .checked_mul(WEI_PER_ETHER)
        .ok_or(UnitsError::Overflow)?;

    let mut padded = String::with_capacity(ETHER_DECIMALS);
    padded.push_str(fraction);
    while padded.len() < ETHER_DECIMALS {
        padded.push('0');
    }
    let fraction_wei = digits_to_u128(&padded)?;

    whole_wei
        .checked_add(fraction_wei)
        .ok_or(UnitsError::Overflow)
}

/// Format wei as a decimal ether string, keeping at least one fractional digit.
pub fn format_ether(wei: Wei) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fraction = wei % WEI_PER_ETHER;

    let mut digits = format!("{fraction:0width$}", width = ETHER_DECIMALS);
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    format!("{whole}.{digits}")
}

fn digits_to_u128(digits: &str) -> Result<u128, UnitsError> {
    digits.bytes().try_fold(0u128, |acc, b| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u128::from(b - b'0')))
            .ok_or(UnitsError::Overflow)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_stakes() {
        assert_eq!(parse_ether("0.05").unwrap(), 50_000_000_000_000_000);
        assert_eq!(parse_ether("1").unwrap(), WEI_PER_ETHER);
        assert_eq!(parse_ether(" 2.5 ").unwrap(), 2_500_000_000_000_000_000);
        assert_eq!(parse_ether(".5").unwrap(), WEI_PER_ETHER / 2);
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), 1);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_ether(""), Err(UnitsError::Empty));
        assert_eq!(parse_ether("-1"), Err(UnitsError::Negative));
        assert!(matches!(parse_ether("1.2.3"), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_ether("abc"), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_ether("."), Err(UnitsError::Invalid(_))));
        assert_eq!(
            parse_ether("0.0000000000000000001"),
            Err(UnitsError::TooPrecise(19))
        );
        assert_eq!(
            parse_ether("999999999999999999999999999999"),
            Err(UnitsError::Overflow)
        );
    }

    #[test]
    fn formats_with_trimmed_fraction() {
        assert_eq!(format_ether(50_000_000_000_000_000), "0.05");
        assert_eq!(format_ether(WEI_PER_ETHER), "1.0");
        assert_eq!(format_ether(0), "0.0");
        assert_eq!(format_ether(1), "0.000000000000000001");
        assert_eq!(format_ether(parse_ether("12.345").unwrap()), "12.345");
    }
}
