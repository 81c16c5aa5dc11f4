//! Sequential invoice-number suggestion.

/// Suggest the next invoice number from the most recently created one.
///
/// Strips everything but digits, parses the remainder (0 when absent or
/// unparseable), increments and left-pads to five digits. Best effort
/// only: uniqueness is not enforced, so two drafts opened concurrently can
/// be offered the same suggestion.
pub fn next_invoice_number(latest: Option<&str>) -> String {
    let base = latest
        .map(|n| n.chars().filter(|c| c.is_ascii_digit()).collect::<String>())
        .and_then(|digits| digits.parse::<u64>().ok())
        .unwrap_or(0);
    format!("{:05}", base.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_the_latest_number() {
        assert_eq!(next_invoice_number(Some("00042")), "00043");
    }

    #[test]
    fn first_number_when_no_prior_invoice() {
        assert_eq!(next_invoice_number(None), "00001");
    }

    #[test]
    fn non_numeric_prior_falls_back_to_base_zero() {
        assert_eq!(next_invoice_number(Some("BROUILLON")), "00001");
    }

    #[test]
    fn digits_are_extracted_from_mixed_numbers() {
        assert_eq!(next_invoice_number(Some("PRO-00007/B")), "00008");
    }

    #[test]
    fn padding_is_dropped_past_five_digits() {
        assert_eq!(next_invoice_number(Some("99999")), "100000");
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let max = u64::MAX.to_string();
        assert_eq!(next_invoice_number(Some(&max)), max);
    }
}
