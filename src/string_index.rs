//! A compressed suffix-array-style dictionary over a static, ordered list of
//! byte strings. Built once from a suffix array of the concatenated input,
//! it reconstructs the `k`-th string (in original input order) in time
//! proportional to the string's length, without ever storing the
//! concatenated text itself.
//!
//! The suffix array is built with [`libsais`], this crate's existing
//! suffix-array backend (see [`crate::poppy`] and friends for the rest of
//! the index layers it is built from); the Manber-Myers prefix-doubling
//! algorithm described in the original design is an equally valid substitute
//! since only the resulting array, not the algorithm, is observable.

use crate::bit_array::{check_bounds, BitArray, IndexedIntSequence, RawBitVec};
use crate::error::{Error, Result};
use crate::permutation::Permutation;
use crate::run_length_bit_array::RunLengthEncodedBitArray;

/// Byte value marking the end of the concatenated text. Input strings may
/// not contain this byte.
const SENTINEL: u8 = 0;

#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone)]
pub struct StringIndex {
    num_strings: usize,
    psi: Permutation,
    psi_starts: RunLengthEncodedBitArray,
    alphabet_starts: Vec<usize>,
    alphabet_chars: Vec<u8>,
}

fn build_suffix_array(text: &[u8]) -> Vec<i64> {
    let mut suffix_array = vec![0i64; text.len()];
    libsais::SuffixArrayConstruction::for_text(text)
        .in_borrowed_buffer(&mut suffix_array)
        .run()
        .expect("libsais suffix array construction");
    suffix_array
}

impl StringIndex {
    /// Builds a `StringIndex` over `strings`, preserving their input order
    /// and any duplicates. Fails if any string contains the reserved
    /// sentinel byte (`0x00`).
    pub fn new<T: AsRef<[u8]>>(strings: &[T]) -> Result<Self> {
        let num_strings = strings.len();
        if num_strings == 0 {
            return Ok(Self {
                num_strings: 0,
                psi: Permutation::new(&[]),
                psi_starts: RunLengthEncodedBitArray::new(&RawBitVec::new()),
                alphabet_starts: Vec::new(),
                alphabet_chars: Vec::new(),
            });
        }

        let mut text = Vec::new();
        let mut string_starts = Vec::with_capacity(num_strings);
        for s in strings {
            let bytes = s.as_ref();
            if bytes.contains(&SENTINEL) {
                return Err(Error::InvalidInput {
                    reason: "input string contains the reserved sentinel byte",
                });
            }
            if bytes.is_empty() {
                // The Ψ-starts bit vector is keyed by byte offset in the
                // concatenated text; an empty string has no byte of its
                // own and so cannot be told apart from a neighboring
                // string that happens to start at the same offset.
                return Err(Error::InvalidInput {
                    reason: "input strings must be non-empty",
                });
            }
            string_starts.push(text.len());
            text.extend_from_slice(bytes);
        }
        text.push(SENTINEL);
        let total_len = text.len();

        let suffix_array = build_suffix_array(&text);

        let mut sa_inverse = vec![0usize; total_len];
        for (j, &pos) in suffix_array.iter().enumerate() {
            sa_inverse[pos as usize] = j;
        }

        let psi_values: Vec<usize> = (0..total_len)
            .map(|j| {
                let pos = suffix_array[j] as usize;
                let successor = (pos + 1) % total_len;
                sa_inverse[successor]
            })
            .collect();
        let psi = Permutation::new(&psi_values);

        let mut is_string_start = vec![false; total_len];
        for &start in &string_starts {
            is_string_start[start] = true;
        }

        let mut psi_starts_bits = RawBitVec::with_bit_capacity(total_len);
        for j in 0..total_len {
            let pos = suffix_array[j] as usize;
            psi_starts_bits.push(is_string_start[pos]);
        }
        psi_starts_bits.pad_to_64_bits();
        let psi_starts = RunLengthEncodedBitArray::new(&psi_starts_bits);

        let mut alphabet_starts = Vec::new();
        let mut alphabet_chars = Vec::new();
        let mut previous_char: Option<u8> = None;
        for j in 0..total_len {
            let ch = text[suffix_array[j] as usize];
            if previous_char != Some(ch) {
                alphabet_starts.push(j);
                alphabet_chars.push(ch);
                previous_char = Some(ch);
            }
        }

        log::debug!(
            "string index: constructed over {num_strings} strings, {total_len} bytes of concatenated text"
        );

        Ok(Self {
            num_strings,
            psi,
            psi_starts,
            alphabet_starts,
            alphabet_chars,
        })
    }

    pub fn len(&self) -> usize {
        self.num_strings
    }

    pub fn is_empty(&self) -> bool {
        self.num_strings == 0
    }

    /// The first byte of the suffix at SA-order position `pos`, recovered
    /// by binary search over the sampled alphabet boundaries rather than by
    /// storing the concatenated text.
    fn get_char_at(&self, pos: usize) -> u8 {
        let idx = self.alphabet_starts.partition_point(|&start| start <= pos) - 1;
        self.alphabet_chars[idx]
    }

    /// The `k`-th string, in original input order.
    pub fn at(&self, k: usize) -> Result<String> {
        check_bounds(k, self.num_strings)?;

        let mut j = self
            .psi_starts
            .select(k)
            .expect("every input string has a psi-starts entry");

        let mut bytes = Vec::new();
        loop {
            let ch = self.get_char_at(j);
            if ch != SENTINEL {
                bytes.push(ch);
            }
            j = self.psi.at(j);
            if self.psi_starts.at(j).expect("j is within total_len bounds") {
                break;
            }
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Iterates over every string, in original input order.
    pub fn iter(&self) -> impl Iterator<Item = Result<String>> + '_ {
        (0..self.num_strings).map(move |k| self.at(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Scenario 5 from the testable-properties catalog.
    #[test]
    fn scenario_preserves_multiset_of_input_strings() {
        let strings = ["alpha", "beta", "alpha", "gamma"];
        let index = StringIndex::new(&strings).unwrap();

        assert_eq!(index.len(), strings.len());

        let mut recovered: Vec<String> = (0..index.len()).map(|k| index.at(k).unwrap()).collect();
        let mut expected: Vec<String> = strings.iter().map(|s| s.to_string()).collect();
        recovered.sort();
        expected.sort();
        assert_eq!(recovered, expected);
    }

    #[test]
    fn preserves_input_order() {
        let strings = ["zebra", "apple", "mango"];
        let index = StringIndex::new(&strings).unwrap();
        for (k, &s) in strings.iter().enumerate() {
            assert_eq!(index.at(k).unwrap(), s);
        }
    }

    #[test]
    fn single_string() {
        let strings = ["hello"];
        let index = StringIndex::new(&strings).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.at(0).unwrap(), "hello");
    }

    #[test]
    fn empty_index() {
        let strings: [&str; 0] = [];
        let index = StringIndex::new(&strings).unwrap();
        assert_eq!(index.len(), 0);
        assert!(index.at(0).is_err());
    }

    #[test]
    fn rejects_sentinel_byte() {
        let strings = [b"hello\0world".as_slice()];
        let err = StringIndex::new(&strings).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn out_of_bounds_index() {
        let strings = ["alpha", "beta"];
        let index = StringIndex::new(&strings).unwrap();
        assert!(matches!(index.at(2), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn shared_prefixes_and_repeated_characters() {
        let strings = ["banana", "band", "ban", "bandana", "a"];
        let index = StringIndex::new(&strings).unwrap();

        let mut recovered: Vec<String> = (0..index.len()).map(|k| index.at(k).unwrap()).collect();
        let mut expected: Vec<String> = strings.iter().map(|s| s.to_string()).collect();
        recovered.sort();
        expected.sort();
        assert_eq!(recovered, expected);

        for (k, &s) in strings.iter().enumerate() {
            assert_eq!(index.at(k).unwrap(), s);
        }
    }

    #[test]
    fn many_random_strings_round_trip() {
        use rand::prelude::*;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(31);

        let alphabet = b"abcdefg";
        let strings: Vec<String> = (0..60)
            .map(|_| {
                let len = rng.random_range(1..12);
                (0..len)
                    .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
                    .collect()
            })
            .collect();

        let index = StringIndex::new(&strings).unwrap();
        assert_eq!(index.len(), strings.len());
        for (k, s) in strings.iter().enumerate() {
            assert_eq!(&index.at(k).unwrap(), s);
        }
    }
}
