//! Row label sequencing for plate headers.
//!
//! Rows are labeled with a bijective base-26 numbering where the letters
//! `A..=Z` stand for the digits 1..=26. There is no zero digit, so `Z` is
//! followed by `AA` and `ZZ` by `AAA`.

use thiserror::Error;

/// Reasons a string cannot be advanced by [`next_label`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("row label is empty")]
    Empty,

    #[error("row label contains {ch:?} at index {index}, expected A-Z")]
    InvalidChar { ch: char, index: usize },
}

/// Return the label that follows `label` in the sequence.
///
/// The input is never modified. The result is at most one character longer
/// than the input, and only when the input consisted entirely of `Z`.
pub fn next_label(label: &str) -> Result<String, LabelError> {
    if label.is_empty() {
        return Err(LabelError::Empty);
    }
    if let Some((index, ch)) = label.char_indices().find(|(_, c)| !c.is_ascii_uppercase()) {
        return Err(LabelError::InvalidChar { ch, index });
    }

    let mut digits = label.as_bytes().to_vec();
    for digit in digits.iter_mut().rev() {
        if *digit == b'Z' {
            // Wrap and carry into the next position to the left
            *digit = b'A';
        } else {
            *digit += 1;
            return Ok(into_label(digits));
        }
    }

    // Carry ran off the front: every digit was Z
    digits.insert(0, b'A');
    Ok(into_label(digits))
}

fn into_label(digits: Vec<u8>) -> String {
    // Only ASCII A-Z bytes ever reach here
    digits.into_iter().map(char::from).collect()
}

/// Infinite iterator over row labels: `A`, `B`, ..., `Z`, `AA`, ...
///
/// Each label is produced from the previous one with [`next_label`], so there
/// is no precomputed table and no upper bound on the number of rows.
#[derive(Debug, Clone)]
pub struct RowLabels {
    current: String,
}

impl RowLabels {
    pub fn new() -> Self {
        Self {
            current: "A".to_string(),
        }
    }
}

impl Default for RowLabels {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for RowLabels {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        // `current` is always a valid label, it started at "A" and only ever
        // holds our own output.
        let following = next_label(&self.current).ok()?;
        Some(std::mem::replace(&mut self.current, following))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bijective base-26 value of a label (A=1, Z=26, AA=27).
    fn label_value(label: &str) -> u64 {
        label
            .bytes()
            .fold(0, |acc, b| acc * 26 + u64::from(b - b'A' + 1))
    }

    #[test]
    fn test_next_label_examples() {
        assert_eq!(next_label("A").unwrap(), "B");
        assert_eq!(next_label("Z").unwrap(), "AA");
        assert_eq!(next_label("AA").unwrap(), "AB");
        assert_eq!(next_label("AZ").unwrap(), "BA");
        assert_eq!(next_label("ZZ").unwrap(), "AAA");
        assert_eq!(next_label("AY").unwrap(), "AZ");
    }

    #[test]
    fn test_next_label_does_not_touch_input() {
        let label = String::from("AZZ");
        let next = next_label(&label).unwrap();
        assert_eq!(label, "AZZ");
        assert_eq!(next, "BAA");
    }

    #[test]
    fn test_next_label_rejects_empty() {
        assert_eq!(next_label(""), Err(LabelError::Empty));
    }

    #[test]
    fn test_next_label_rejects_non_letters() {
        assert_eq!(
            next_label("A1"),
            Err(LabelError::InvalidChar { ch: '1', index: 1 })
        );
        assert_eq!(
            next_label("b"),
            Err(LabelError::InvalidChar { ch: 'b', index: 0 })
        );
        assert!(next_label("AÉ").is_err());
    }

    #[test]
    fn test_row_labels_spot_checks() {
        let labels: Vec<String> = RowLabels::new().take(703).collect();
        assert_eq!(labels[0], "A");
        assert_eq!(labels[25], "Z");
        assert_eq!(labels[26], "AA");
        assert_eq!(labels[51], "AZ");
        assert_eq!(labels[52], "BA");
        assert_eq!(labels[701], "ZZ");
        assert_eq!(labels[702], "AAA");
    }

    #[test]
    fn test_row_labels_match_bijective_value() {
        for (n, label) in RowLabels::new().take(100_000).enumerate() {
            assert_eq!(label_value(&label), n as u64 + 1, "label {label} at {n}");
        }
    }

    #[test]
    fn test_length_grows_only_after_all_z() {
        let mut previous = String::from("A");
        for _ in 0..20_000 {
            let next = next_label(&previous).unwrap();
            let all_z = previous.bytes().all(|b| b == b'Z');
            if all_z {
                assert_eq!(next.len(), previous.len() + 1);
                assert!(next.bytes().all(|b| b == b'A'));
            } else {
                assert_eq!(next.len(), previous.len());
            }
            previous = next;
        }
    }

    #[test]
    fn test_row_labels_reach_a_million() {
        let last = RowLabels::new().nth(999_999).unwrap();
        assert_eq!(label_value(&last), 1_000_000);
        assert_eq!(last, "BDWGN");
    }
}
