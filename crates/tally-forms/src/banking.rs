//! Checks for bank identifiers.

/// Removes spaces and dashes.
pub fn compact(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Returns whether `value` is made of `min..=max` ASCII digits.
pub fn is_digits(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

/// Validates an ISO 13616 IBAN with the mod-97 check.
///
/// Spaces are allowed; letters may be in either case.
pub fn is_valid_iban(value: &str) -> bool {
    let iban = compact(value).to_ascii_uppercase();
    if !(15..=34).contains(&iban.len()) || !iban.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return false;
    }
    let (head, tail) = iban.split_at(4);
    if !head[..2].bytes().all(|b| b.is_ascii_alphabetic())
        || !head[2..].bytes().all(|b| b.is_ascii_digit())
    {
        return false;
    }

    let mut remainder: u32 = 0;
    for byte in tail.bytes().chain(head.bytes()) {
        let value = match byte {
            b'0'..=b'9' => u32::from(byte - b'0'),
            _ => u32::from(byte - b'A') + 10,
        };
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }
    remainder == 1
}

/// Validates a nine-digit ABA routing number.
pub fn is_valid_routing_number(value: &str) -> bool {
    if !is_digits(value, 9, 9) {
        return false;
    }
    let weights = [3, 7, 1];
    let sum: u32 = value
        .bytes()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * weights[i % 3])
        .sum();
    sum % 10 == 0
}

/// Validates a UK sort code, `12-34-56` or `123456`.
pub fn is_valid_sort_code(value: &str) -> bool {
    let trimmed = value.trim();
    let dashed = trimmed.len() == 8
        && trimmed
            .bytes()
            .enumerate()
            .all(|(i, b)| if i % 3 == 2 { b == b'-' } else { b.is_ascii_digit() });
    dashed || is_digits(trimmed, 6, 6)
}

/// Validates a BIC/SWIFT code: bank, country, location and optional branch.
pub fn is_valid_bic(value: &str) -> bool {
    let bic = value.trim().to_ascii_uppercase();
    if bic.len() != 8 && bic.len() != 11 {
        return false;
    }
    let bytes = bic.as_bytes();
    bytes[..6].iter().all(u8::is_ascii_alphabetic)
        && bytes[6..].iter().all(u8::is_ascii_alphanumeric)
}
