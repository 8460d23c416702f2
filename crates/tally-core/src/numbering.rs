//! Invoice number generation.

/// Digits the sequence part is padded to.
const SEQUENCE_WIDTH: usize = 4;

/// Returns the number following the highest one in `existing`.
///
/// Only numbers starting with `prefix` and followed by digits count towards
/// the sequence; hand-typed numbers in other shapes are ignored.
pub fn next_invoice_number<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(prefix))
        .filter(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    format!("{prefix}{:0width$}", highest + 1, width = SEQUENCE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_number() {
        assert_eq!(next_invoice_number("INV-", []), "INV-0001");
    }

    #[test]
    fn test_follows_highest_suffix() {
        let existing = ["INV-0002", "INV-0010", "INV-0007", "CUSTOM-99", "INV-12a"];
        assert_eq!(next_invoice_number("INV-", existing), "INV-0011");
    }

    #[test]
    fn test_grows_past_padding() {
        assert_eq!(next_invoice_number("A", ["A9999"]), "A10000");
    }
}
