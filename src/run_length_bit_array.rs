//! A plain run-length encoded bit vector: a flat list of one-run
//! `(start, length)` pairs. Used only where the number of runs `R` is tiny
//! compared to the logical length (the Ψ-starts bit vector inside
//! [`StringIndex`](crate::string_index::StringIndex)), so rank/select binary
//! search the run table directly instead of paying for a full
//! [`Poppy`](crate::poppy::Poppy) index.

use crate::bit_array::{check_bounds, BitArray, RawBitVec};
use crate::error::Result;

#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone)]
pub struct RunLengthEncodedBitArray {
    len: usize,
    run_starts: Vec<usize>,
    run_lengths: Vec<usize>,
    /// `one_prefix[k]` = total one-bits in runs `0..k`. Length `R + 1`.
    one_prefix: Vec<usize>,
    /// Start of the zero-gap before run `k` (gap `R` is the trailing one,
    /// after the last run). Length `R + 1`.
    gap_starts: Vec<usize>,
    /// `zero_prefix[k]` = total zero-bits in gaps `0..k`. Length `R + 2`.
    zero_prefix: Vec<usize>,
}

/// Largest index `idx` with `arr[idx] <= target`, given `arr[0] == 0`.
/// Used to locate the run/gap containing cumulative count `target`.
fn last_le(arr: &[usize], target: usize) -> usize {
    let mut lo = 0usize;
    let mut hi = arr.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if arr[mid] <= target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo - 1
}

impl RunLengthEncodedBitArray {
    pub fn new(bits: &RawBitVec) -> Self {
        let len = bits.len();
        let mut run_starts = Vec::new();
        let mut run_lengths = Vec::new();

        let mut prev = false;
        for i in 0..len {
            let bit = bits.get(i);
            if bit != prev {
                if prev {
                    let start = *run_starts.last().expect("a run was open");
                    run_lengths.push(i - start);
                } else {
                    run_starts.push(i);
                }
            }
            prev = bit;
        }
        if run_lengths.len() < run_starts.len() {
            let start = *run_starts.last().expect("run_starts non-empty");
            run_lengths.push(len - start);
        }

        let mut one_prefix = Vec::with_capacity(run_starts.len() + 1);
        one_prefix.push(0);
        for &run_length in &run_lengths {
            one_prefix.push(one_prefix.last().unwrap() + run_length);
        }

        let mut gap_starts = Vec::with_capacity(run_starts.len() + 1);
        let mut gap_lengths = Vec::with_capacity(run_starts.len() + 1);
        let mut cursor = 0usize;
        for (&start, &length) in run_starts.iter().zip(&run_lengths) {
            gap_starts.push(cursor);
            gap_lengths.push(start - cursor);
            cursor = start + length;
        }
        gap_starts.push(cursor);
        gap_lengths.push(len - cursor);

        let mut zero_prefix = Vec::with_capacity(gap_lengths.len() + 1);
        zero_prefix.push(0);
        for &gap_length in &gap_lengths {
            zero_prefix.push(zero_prefix.last().unwrap() + gap_length);
        }

        log::debug!(
            "run-length bit array: constructed over {len} bits in {} runs",
            run_starts.len()
        );

        Self {
            len,
            run_starts,
            run_lengths,
            one_prefix,
            gap_starts,
            zero_prefix,
        }
    }

    fn run_containing(&self, i: usize) -> Option<usize> {
        if self.run_starts.is_empty() || self.run_starts[0] > i {
            return None;
        }
        let idx = last_le(&self.run_starts, i);
        (i - self.run_starts[idx] < self.run_lengths[idx]).then_some(idx)
    }

    fn rank_raw(&self, i: usize) -> usize {
        if self.run_starts.is_empty() || self.run_starts[0] > i {
            return 0;
        }
        let idx = last_le(&self.run_starts, i);
        let start = self.run_starts[idx];
        let length = self.run_lengths[idx];
        if i - start < length {
            self.one_prefix[idx] + (i - start + 1)
        } else {
            self.one_prefix[idx + 1]
        }
    }

    fn select_raw(&self, r: usize) -> usize {
        let idx = last_le(&self.one_prefix, r);
        self.run_starts[idx] + (r - self.one_prefix[idx])
    }

    fn select_zero_raw(&self, r: usize) -> usize {
        let idx = last_le(&self.zero_prefix, r);
        self.gap_starts[idx] + (r - self.zero_prefix[idx])
    }

    fn num_ones(&self) -> usize {
        *self.one_prefix.last().unwrap_or(&0)
    }

    fn num_zeros(&self) -> usize {
        *self.zero_prefix.last().unwrap_or(&0)
    }
}

impl BitArray for RunLengthEncodedBitArray {
    fn len(&self) -> usize {
        self.len
    }

    fn at(&self, i: usize) -> Result<bool> {
        check_bounds(i, self.len)?;
        Ok(self.run_containing(i).is_some())
    }

    fn rank(&self, i: usize) -> Result<usize> {
        check_bounds(i, self.len)?;
        Ok(self.rank_raw(i))
    }

    fn select(&self, r: usize) -> Option<usize> {
        (r < self.num_ones()).then(|| self.select_raw(r))
    }

    fn select_zero(&self, r: usize) -> Option<usize> {
        (r < self.num_zeros()).then(|| self.select_zero_raw(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_ranks(bits: &[bool]) -> Vec<usize> {
        let mut ranks = Vec::with_capacity(bits.len());
        let mut count = 0usize;
        for &b in bits {
            if b {
                count += 1;
            }
            ranks.push(count);
        }
        ranks
    }

    fn check_against_naive(bits: &[bool]) {
        let raw = RawBitVec::from_bits(bits.iter().copied());
        let array = RunLengthEncodedBitArray::new(&raw);
        assert_eq!(array.len(), bits.len());

        let ranks = naive_ranks(bits);
        for i in 0..bits.len() {
            assert_eq!(array.at(i).unwrap(), bits[i], "at({i})");
            assert_eq!(array.rank(i).unwrap(), ranks[i], "rank({i})");
        }

        let one_positions: Vec<usize> = bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect();
        for (r, &pos) in one_positions.iter().enumerate() {
            assert_eq!(array.select(r), Some(pos));
        }
        assert_eq!(array.select(one_positions.len()), None);

        let zero_positions: Vec<usize> = bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| (!b).then_some(i))
            .collect();
        for (r, &pos) in zero_positions.iter().enumerate() {
            assert_eq!(array.select_zero(r), Some(pos));
        }
        assert_eq!(array.select_zero(zero_positions.len()), None);
    }

    #[test]
    fn sparse_runs() {
        let bits = RawBitVec::from_str01("0000 0111 0000 0001 1000 0000")
            .iter()
            .collect::<Vec<_>>();
        check_against_naive(&bits);
    }

    #[test]
    fn empty_array() {
        let raw = RawBitVec::new();
        let array = RunLengthEncodedBitArray::new(&raw);
        assert_eq!(array.len(), 0);
        assert_eq!(array.select(0), None);
        assert_eq!(array.select_zero(0), None);
    }

    #[test]
    fn all_zero() {
        check_against_naive(&[false; 12]);
    }

    #[test]
    fn all_one() {
        check_against_naive(&[true; 12]);
    }

    #[test]
    fn starts_and_ends_with_one_run() {
        let bits = RawBitVec::from_str01("1110 0000 0011").iter().collect::<Vec<_>>();
        check_against_naive(&bits);
    }

    #[test]
    fn random_sparse_vectors_match_naive_reference() {
        use rand::prelude::*;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(17);

        for _ in 0..30 {
            let n = rng.random_range(0..500);
            let bits: Vec<bool> = (0..n).map(|_| rng.random_bool(0.05)).collect();
            check_against_naive(&bits);
        }
    }
}
