use crate::error::SizeError;
use crate::units;

/// Parse a human-readable size into a whole number of bytes.
///
/// Supported examples:
/// - `1024` (plain byte count)
/// - `1.5GB`, `16GiB`, `10 KB`
/// - `128kb`, `25Mb` (bit-denominated, converted at `word_length` bits
///   per byte, rounded up to the next whole byte)
/// - `10m`, `2gi` (legacy aliases, binary multipliers)
pub fn parse(input: &str, word_length: u32) -> Result<u128, SizeError> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(SizeError::NegativeValue(trimmed.to_string()));
    }

    let (number_str, unit_str) = split_number(trimmed);
    if number_str.is_empty() {
        return Err(SizeError::InvalidNumber(trimmed.to_string()));
    }
    let unit_str = unit_str.trim_start();

    // One trailing base-unit character selects bits vs bytes.
    let (bit_mode, prefix) = match unit_str.as_bytes().last() {
        Some(b'b') => (true, &unit_str[..unit_str.len() - 1]),
        Some(b'B') => (false, &unit_str[..unit_str.len() - 1]),
        _ => (false, unit_str),
    };

    let multiplier = if prefix.is_empty() {
        1
    } else {
        units::multiplier_for(prefix).ok_or_else(|| SizeError::UnknownUnit {
            input: trimmed.to_string(),
            unit: unit_str.to_string(),
        })?
    };

    // A zero word length is meaningless; treat a byte as at least one bit.
    let word_length = u128::from(word_length.max(1));

    if number_str.contains('.') {
        let number: f64 = number_str
            .parse()
            .map_err(|_| SizeError::InvalidNumber(trimmed.to_string()))?;
        let scaled = if bit_mode {
            (number * multiplier as f64 / word_length as f64).ceil()
        } else {
            (number * multiplier as f64).ceil()
        };
        if !scaled.is_finite() || scaled > u128::MAX as f64 {
            return Err(SizeError::InvalidNumber(trimmed.to_string()));
        }
        Ok(scaled as u128)
    } else {
        let number: u128 = number_str
            .parse()
            .map_err(|_| SizeError::InvalidNumber(trimmed.to_string()))?;
        let total = number
            .checked_mul(multiplier)
            .ok_or_else(|| SizeError::InvalidNumber(trimmed.to_string()))?;
        if bit_mode {
            Ok(total.div_ceil(word_length))
        } else {
            Ok(total)
        }
    }
}

// Split into the longest leading run of digits with at most one decimal
// point, and the trailing unit suffix.
fn split_number(input: &str) -> (&str, &str) {
    let mut seen_dot = false;
    for (idx, ch) in input.char_indices() {
        match ch {
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => return input.split_at(idx),
        }
    }
    (input, "")
}
