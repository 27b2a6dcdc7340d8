//! Poppy: a three-level (L0/L1/L2) rank/select index over an uncompressed
//! bit array, after Zhou, Andersen & Kaminsky, "Space-efficient,
//! high-performance rank and select structures on uncompressed bit
//! sequences".
//!
//! - L0 holds one cumulative popcount per `2^32`-bit *upper block*.
//! - L1/L2 are packed together, one pair per 2048-bit *lower block*: L1 is
//!   the cumulative popcount since the enclosing upper block started; L2
//!   packs three 10-bit relative popcounts for the lower block's first
//!   three 512-bit *basic blocks* (the fourth is implied by subtraction).
//! - A sampling table records the position of every 8192nd one-bit,
//!   relative to its enclosing upper block, to bound `select`'s search.

use crate::bit_array::{BitArray, RawBitVec, check_bounds};
use crate::bits::{bit_at, popcount, rank_in_byte, select_in_byte, select_in_bytes};
use crate::error::{Error, Result};

const UPPER_BLOCK_BITS: u64 = 1 << 32;
const LOWER_BLOCK_BITS: usize = 2048;
const BASIC_BLOCK_BITS: usize = 512;
const BASIC_BLOCKS_PER_LOWER: usize = LOWER_BLOCK_BITS / BASIC_BLOCK_BITS;
const LOWER_BLOCKS_PER_UPPER: usize = (UPPER_BLOCK_BITS as usize) / LOWER_BLOCK_BITS;
const SELECT_SAMPLING_STEP: usize = 8192;

#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone)]
pub struct Poppy {
    // Padded internally to a multiple of `LOWER_BLOCK_BITS`, so every
    // lower/basic block boundary can be read without special-casing a
    // partial tail block. This is purely an implementation detail; `len`
    // below is the only externally observable length.
    bytes: Vec<u8>,
    len: usize,
    level0: Vec<u64>,
    level1: Vec<u32>,
    level2: Vec<u32>,
    sampling: Vec<Vec<u32>>,
    num_ones: usize,
}

fn pack_triple(c0: u32, c1: u32, c2: u32) -> u32 {
    (c0 & 0x3ff) | ((c1 & 0x3ff) << 10) | ((c2 & 0x3ff) << 20)
}

fn get_relative_count(packed: u32, basic_block_index: usize) -> usize {
    ((packed >> (10 * basic_block_index)) & 0x3ff) as usize
}

impl Poppy {
    pub fn new(bits: RawBitVec) -> Self {
        let len = bits.len();

        let padded_bit_len = len.div_ceil(LOWER_BLOCK_BITS) * LOWER_BLOCK_BITS;
        let mut bytes = bits.as_bytes().to_vec();
        bytes.resize(padded_bit_len / 8, 0);

        let num_lower_blocks = padded_bit_len / LOWER_BLOCK_BITS;
        let num_upper_blocks = padded_bit_len.div_ceil(UPPER_BLOCK_BITS as usize).max(
            if len == 0 { 0 } else { 1 },
        );

        let mut level0 = vec![0u64; num_upper_blocks];
        let mut level1 = vec![0u32; num_lower_blocks];
        let mut level2 = vec![0u32; num_lower_blocks];

        let mut within_upper_running: u32 = 0;
        let mut upper_running: u64 = 0;

        for lb in 0..num_lower_blocks {
            if lb % LOWER_BLOCKS_PER_UPPER == 0 {
                let upper_idx = lb / LOWER_BLOCKS_PER_UPPER;
                if upper_idx > 0 {
                    level0[upper_idx] = level0[upper_idx - 1] + upper_running;
                }
                within_upper_running = 0;
                upper_running = 0;
            }

            level1[lb] = within_upper_running;

            let base_byte = lb * (LOWER_BLOCK_BITS / 8);
            let mut counts = [0u32; BASIC_BLOCKS_PER_LOWER];
            for (bb, count) in counts.iter_mut().enumerate() {
                let start = base_byte + bb * (BASIC_BLOCK_BITS / 8);
                *count = popcount(&bytes[start..start + BASIC_BLOCK_BITS / 8]) as u32;
            }
            level2[lb] = pack_triple(counts[0], counts[1], counts[2]);

            let lower_sum: u32 = counts.iter().sum();
            within_upper_running += lower_sum;
            upper_running += lower_sum as u64;
        }

        let num_ones = if num_upper_blocks > 0 {
            level0[num_upper_blocks - 1] as usize + upper_running as usize
        } else {
            0
        };

        log::debug!(
            "poppy: constructed over {len} bits ({num_upper_blocks} upper, {num_lower_blocks} lower blocks, {num_ones} one-bits)"
        );

        let mut poppy = Self {
            bytes,
            len,
            level0,
            level1,
            level2,
            sampling: Vec::new(),
            num_ones,
        };
        poppy.sampling = poppy.build_sampling_structure();
        poppy
    }

    fn build_sampling_structure(&self) -> Vec<Vec<u32>> {
        let mut sampling = Vec::with_capacity(self.level0.len());

        let padded_len = self.bytes.len() * 8;

        for upper_idx in 0..self.level0.len() {
            let upper_start_bit = upper_idx * UPPER_BLOCK_BITS as usize;
            let upper_end_bit_exclusive = (upper_start_bit + UPPER_BLOCK_BITS as usize).min(padded_len);

            let rank_start = self.level0[upper_idx] as usize;
            let last_real_bit = upper_end_bit_exclusive.min(self.len).saturating_sub(1);
            let rank_end = if self.len == 0 || last_real_bit < upper_start_bit {
                rank_start
            } else {
                self.rank_unchecked(last_real_bit)
            };
            let num_ones_in_upper_block = rank_end.saturating_sub(rank_start);
            let num_entries = num_ones_in_upper_block.div_ceil(SELECT_SAMPLING_STEP);

            let mut entries = vec![0u32; num_entries];
            let start_byte = upper_start_bit / 8;
            let end_byte = upper_end_bit_exclusive / 8;

            let mut popcount_sum = 0usize;
            let mut target = 0usize;
            let mut byte_offset = start_byte;
            while byte_offset < end_byte && target / SELECT_SAMPLING_STEP < num_entries {
                let word = &self.bytes[byte_offset..byte_offset + 8];
                let old_sum = popcount_sum;
                popcount_sum += popcount(word);
                if popcount_sum > target {
                    let local_r = target - old_sum;
                    let pos_in_word = select_in_bytes(word, local_r)
                        .expect("word must contain the target one-bit");
                    let relative_pos = 8 * (byte_offset - start_byte) + pos_in_word;
                    entries[target / SELECT_SAMPLING_STEP] = relative_pos as u32;
                    debug_assert!(
                        bit_at(&self.bytes, upper_start_bit + relative_pos),
                        "select sample must point at a one-bit"
                    );
                    target += SELECT_SAMPLING_STEP;
                }
                byte_offset += 8;
            }

            sampling.push(entries);
        }

        sampling
    }

    /// `rank` without the `i < len` bounds check, used internally during
    /// construction where `i` may legitimately address the padded tail.
    fn rank_unchecked(&self, i: usize) -> usize {
        let upper_idx = (i as u64 / UPPER_BLOCK_BITS) as usize;
        let mut sum = self.level0[upper_idx] as usize;

        // Global lower-block index: `level1`/`level2` are flat arrays over
        // the whole bit array, not per-upper-block.
        let lower_idx = i / LOWER_BLOCK_BITS;
        sum += self.level1[lower_idx] as usize;

        let basic_idx = (i % LOWER_BLOCK_BITS) / BASIC_BLOCK_BITS;
        let packed = self.level2[lower_idx];
        for b in 0..basic_idx {
            sum += get_relative_count(packed, b);
        }

        let basic_block_start_bit = lower_idx * LOWER_BLOCK_BITS + basic_idx * BASIC_BLOCK_BITS;
        sum + self.rank_in_range(basic_block_start_bit, i + 1)
    }

    fn rank_in_range(&self, start_bit: usize, end_bit_exclusive: usize) -> usize {
        let mut sum = 0;
        let mut bitpos = start_bit;
        while bitpos + 64 <= end_bit_exclusive {
            let byte_off = bitpos / 8;
            sum += popcount(&self.bytes[byte_off..byte_off + 8]);
            bitpos += 64;
        }
        while bitpos + 8 <= end_bit_exclusive {
            let byte_off = bitpos / 8;
            sum += rank_in_byte(self.bytes[byte_off], 7);
            bitpos += 8;
        }
        if bitpos < end_bit_exclusive {
            let slack = end_bit_exclusive - bitpos - 1;
            let byte_off = bitpos / 8;
            sum += rank_in_byte(self.bytes[byte_off], slack);
        }
        sum
    }

    /// Scans `[start_bit, end_bit_inclusive)` for the `relative_rank`-th
    /// (0-indexed) one-bit, then as a final step checks whether
    /// `end_bit_inclusive` itself is a match. Mirrors the source's
    /// word/byte/tail-bit cascade.
    fn select_in_range(
        &self,
        start_bit: usize,
        end_bit_inclusive: usize,
        mut relative_rank: usize,
    ) -> Option<usize> {
        let mut bitpos = start_bit;
        while bitpos + 64 <= end_bit_inclusive {
            let byte_off = bitpos / 8;
            let word = &self.bytes[byte_off..byte_off + 8];
            let word_rank = popcount(word);
            if relative_rank < word_rank {
                return select_in_bytes(word, relative_rank).map(|p| bitpos + p);
            }
            relative_rank -= word_rank;
            bitpos += 64;
        }
        while bitpos + 8 <= end_bit_inclusive {
            let byte_off = bitpos / 8;
            let byte = self.bytes[byte_off];
            let byte_rank = rank_in_byte(byte, 7);
            if relative_rank < byte_rank {
                return select_in_byte(byte, relative_rank).map(|p| bitpos + p);
            }
            relative_rank -= byte_rank;
            bitpos += 8;
        }
        if bitpos < end_bit_inclusive {
            let slack = end_bit_inclusive - bitpos - 1;
            let byte_off = bitpos / 8;
            let byte = self.bytes[byte_off];
            let byte_rank = rank_in_byte(byte, slack);
            if relative_rank < byte_rank {
                return select_in_byte(byte, relative_rank).map(|p| bitpos + p);
            }
            relative_rank -= byte_rank;
        }
        if relative_rank == 0 && end_bit_inclusive < self.len && bit_at(&self.bytes, end_bit_inclusive)
        {
            return Some(end_bit_inclusive);
        }
        None
    }

    pub fn num_ones(&self) -> usize {
        self.num_ones
    }
}

impl BitArray for Poppy {
    fn len(&self) -> usize {
        self.len
    }

    fn at(&self, i: usize) -> Result<bool> {
        check_bounds(i, self.len)?;
        Ok(bit_at(&self.bytes, i))
    }

    fn rank(&self, i: usize) -> Result<usize> {
        if self.len == 0 {
            return Err(Error::EmptyStructure);
        }
        check_bounds(i, self.len)?;
        Ok(self.rank_unchecked(i))
    }

    fn select(&self, r: usize) -> Option<usize> {
        if self.len == 0 || r >= self.num_ones {
            return None;
        }

        let upper_idx = self
            .level0
            .partition_point(|&v| (v as usize) <= r)
            .saturating_sub(1);
        let relative_rank = r - self.level0[upper_idx] as usize;

        let sampling_answers = &self.sampling[upper_idx];
        let x = relative_rank / SELECT_SAMPLING_STEP;
        if relative_rank % SELECT_SAMPLING_STEP == 0 {
            return sampling_answers
                .get(x)
                .map(|&pos| upper_idx * UPPER_BLOCK_BITS as usize + pos as usize);
        }

        let upper_block_start_bit = upper_idx * UPPER_BLOCK_BITS as usize;
        let upper_block_len = (self.len - upper_block_start_bit).min(UPPER_BLOCK_BITS as usize);

        let search_start_bit = sampling_answers[x] as usize;
        let search_end_bit = sampling_answers
            .get(x + 1)
            .map(|&p| p as usize)
            .unwrap_or(upper_block_len);

        let lower_base = upper_idx * LOWER_BLOCKS_PER_UPPER;
        let num_lower_in_upper = (self.level1.len() - lower_base).min(LOWER_BLOCKS_PER_UPPER);

        let lb_local_lo = search_start_bit / LOWER_BLOCK_BITS;
        let lb_local_hi =
            (search_end_bit.saturating_sub(1) / LOWER_BLOCK_BITS).min(num_lower_in_upper - 1);

        let candidates = &self.level1[lower_base + lb_local_lo..=lower_base + lb_local_hi];
        let local_idx = candidates
            .iter()
            .rposition(|&v| (v as usize) <= relative_rank)
            .unwrap_or(0);
        let lb_global = lower_base + lb_local_lo + local_idx;

        let mut remaining = relative_rank - self.level1[lb_global] as usize;
        let packed = self.level2[lb_global];

        let mut basic_idx = 0;
        for b in 0..BASIC_BLOCKS_PER_LOWER - 1 {
            let count = get_relative_count(packed, b);
            if remaining < count {
                basic_idx = b;
                break;
            }
            remaining -= count;
            basic_idx = b + 1;
        }

        let lower_block_start_bit = lb_global * LOWER_BLOCK_BITS;
        let basic_block_start_bit = lower_block_start_bit + basic_idx * BASIC_BLOCK_BITS;
        let end_bit_inclusive = (basic_block_start_bit + LOWER_BLOCK_BITS)
            .min(self.len.saturating_sub(1))
            .min(upper_block_start_bit + UPPER_BLOCK_BITS as usize - 1);

        self.select_in_range(basic_block_start_bit, end_bit_inclusive, remaining)
    }

    fn select_zero(&self, r: usize) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let num_zeros = self.len - self.num_ones;
        if r >= num_zeros {
            return None;
        }

        let mut low = 0usize;
        let mut high = self.len - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let rz = self.rank_zero(mid).expect("mid is in bounds");
            if !bit_at(&self.bytes, mid) && rz == r + 1 {
                return Some(mid);
            } else if rz <= r {
                low = mid + 1;
            } else {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poppy_from_str01(s: &str) -> Poppy {
        Poppy::new(RawBitVec::from_str01(s))
    }

    // Scenario 1 from the testable-properties catalog.
    #[test]
    fn scenario_rank_select_round_trip() {
        let poppy = poppy_from_str01("0000111111110010 1111");
        assert_eq!(poppy.rank(3).unwrap(), 0);
        assert_eq!(poppy.rank(4).unwrap(), 1);
        assert_eq!(poppy.rank(11).unwrap(), 8);
        assert_eq!(poppy.rank(13).unwrap(), 8);
        assert_eq!(poppy.rank(19).unwrap(), 13);

        assert_eq!(poppy.select(0), Some(4));
        assert_eq!(poppy.select(7), Some(11));
        assert_eq!(poppy.select(8), Some(14));
        assert_eq!(poppy.select(12), Some(19));
    }

    #[test]
    fn rank_zero_complements_rank() {
        let poppy = poppy_from_str01("0000111111110010 1111");
        for i in 0..poppy.len() {
            assert_eq!(
                poppy.rank(i).unwrap() + poppy.rank_zero(i).unwrap(),
                i + 1
            );
        }
    }

    #[test]
    fn empty_bit_array_errors() {
        let poppy = Poppy::new(RawBitVec::new());
        assert!(matches!(poppy.rank(0), Err(Error::EmptyStructure)));
        assert_eq!(poppy.select(0), None);
    }

    #[test]
    fn select_past_last_one_is_none() {
        let poppy = poppy_from_str01("1010");
        assert_eq!(poppy.select(2), None);
    }

    #[test]
    fn out_of_bounds_rank_errors() {
        let poppy = poppy_from_str01("1010");
        assert!(matches!(
            poppy.rank(4),
            Err(Error::OutOfBounds { index: 4, len: 4 })
        ));
    }

    #[test]
    fn naive_reference_agreement_on_random_bytes() {
        use rand::prelude::*;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);

        for trial in 0..20 {
            let num_bits = rng.random_range(1..4000);
            let bits: Vec<bool> = (0..num_bits).map(|_| rng.random_bool(0.4)).collect();
            let poppy = Poppy::new(RawBitVec::from_bits(bits.iter().copied()));

            let mut running_rank = 0usize;
            let mut ones = Vec::new();
            let mut zeros = Vec::new();
            for (i, &b) in bits.iter().enumerate() {
                if b {
                    running_rank += 1;
                    ones.push(i);
                } else {
                    zeros.push(i);
                }
                assert_eq!(poppy.rank(i).unwrap(), running_rank, "trial {trial} pos {i}");
                assert_eq!(poppy.at(i).unwrap(), b, "trial {trial} pos {i}");
            }

            for (r, &pos) in ones.iter().enumerate() {
                assert_eq!(poppy.select(r), Some(pos), "trial {trial} rank {r}");
            }
            assert_eq!(poppy.select(ones.len()), None);

            for (r, &pos) in zeros.iter().enumerate() {
                assert_eq!(poppy.select_zero(r), Some(pos), "trial {trial} rank {r}");
            }
            assert_eq!(poppy.select_zero(zeros.len()), None);
        }
    }

    #[test]
    fn large_bit_array_crosses_lower_block_boundaries() {
        // Exercise the L1/L2 packing logic across many lower blocks.
        let num_bits = 256 * 2048; // 256 lower blocks
        let bits: Vec<bool> = (0..num_bits).map(|i| i % 7 == 0).collect();
        let poppy = Poppy::new(RawBitVec::from_bits(bits.iter().copied()));

        let mut expected_rank = 0usize;
        for (i, &b) in bits.iter().enumerate() {
            if b {
                expected_rank += 1;
            }
            if i % 997 == 0 || i == bits.len() - 1 {
                assert_eq!(poppy.rank(i).unwrap(), expected_rank);
            }
        }
    }
}
