//! Text complexity triage and word-boundary slicing.

/// A half-open codepoint-index range identifying one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordSlice {
    /// Index of the first codepoint in the word.
    pub start: usize,
    /// Number of codepoints in the word.
    pub length: usize,
}

/// Returns `true` if any byte in `bytes` has its high bit set.
///
/// A set high bit means the text contains non-ASCII content, which the
/// orchestrator treats as "complex" and declines to shape in v1 (see
/// the shape-and-fill pipeline's complex-text short-circuit).
pub fn has_non_ascii(bytes: &[u8]) -> bool {
    const LANE: usize = 16;
    let mut chunks = bytes.chunks_exact(LANE);

    for chunk in &mut chunks {
        let mut acc = 0u8;
        for &b in chunk {
            acc |= b;
        }
        if acc & 0x80 != 0 {
            return true;
        }
    }

    chunks.remainder().iter().any(|&b| b & 0x80 != 0)
}

/// Splits `codepoints` into word slices, treating ASCII space and tab as
/// separators. Separator codepoints themselves are not part of any slice.
///
/// Writes into `out`, returning the number of slices written. `out.len()`
/// must be at least `codepoints.len()` (the caller over-allocates by
/// codepoint count, per the one-word-per-codepoint upper bound).
pub fn word_slices(codepoints: &[u32], out: &mut [WordSlice]) -> usize {
    let mut start: Option<usize> = None;
    let mut count = 0;

    for (i, &cp) in codepoints.iter().enumerate() {
        let is_separator = cp == ' ' as u32 || cp == '\t' as u32;
        match (is_separator, start) {
            (true, Some(s)) => {
                out[count] = WordSlice { start: s, length: i - s };
                count += 1;
                start = None;
            },
            (false, None) => start = Some(i),
            _ => {},
        }
    }

    if let Some(s) = start {
        out[count] = WordSlice { start: s, length: codepoints.len() - s };
        count += 1;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_only_is_not_complex() {
        assert!(!has_non_ascii(b"Hello, world!"));
    }

    #[test]
    fn any_high_bit_byte_is_complex() {
        assert!(has_non_ascii("héllo".as_bytes()));
    }

    #[test]
    fn complex_detection_handles_long_ascii_runs() {
        let s = "a".repeat(40);
        assert!(!has_non_ascii(s.as_bytes()));
    }

    #[test]
    fn complex_detection_finds_tail_byte_past_full_lanes() {
        let mut bytes = vec![b'a'; 20];
        bytes.push(0xC3);
        assert!(has_non_ascii(&bytes));
    }

    #[test]
    fn word_slices_split_on_space_and_tab() {
        let cps: Vec<u32> = "ab cd\tef".chars().map(|c| c as u32).collect();
        let mut slices = vec![WordSlice::default(); cps.len()];
        let n = word_slices(&cps, &mut slices);
        assert_eq!(
            &slices[..n],
            &[
                WordSlice { start: 0, length: 2 },
                WordSlice { start: 3, length: 2 },
                WordSlice { start: 6, length: 2 },
            ]
        );
    }

    #[test]
    fn word_slices_empty_input() {
        let mut slices: [WordSlice; 0] = [];
        let n = word_slices(&[], &mut slices);
        assert_eq!(n, 0);
    }
}
