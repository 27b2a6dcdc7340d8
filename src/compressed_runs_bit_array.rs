//! A bit vector stored by its run structure: rather than one entry per bit,
//! two sparse [`EliasFanoBitArray`]s record where zero-runs and one-runs
//! start. Effective for long runs of identical bits.

use crate::bit_array::{check_bounds, BitArray, RawBitVec};
use crate::config::EliasFanoConfig;
use crate::elias_fano_bit_array::EliasFanoBitArray;
use crate::error::Result;

#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone)]
pub struct CompressedRunsBitArray {
    first_bit: Option<bool>,
    zeros: EliasFanoBitArray,
    ones: EliasFanoBitArray,
}

impl CompressedRunsBitArray {
    pub fn new(bits: &RawBitVec, config: EliasFanoConfig) -> Result<Self> {
        let n = bits.len();
        let first_bit = (n > 0).then(|| bits.get(0));

        let mut zeros_bits = RawBitVec::with_bit_capacity(n);
        let mut ones_bits = RawBitVec::with_bit_capacity(n);

        for i in 0..n {
            let bit = bits.get(i);
            let starts_run = i == 0 || bits.get(i - 1) != bit;
            if bit {
                ones_bits.push(starts_run);
            } else {
                zeros_bits.push(starts_run);
            }
        }
        zeros_bits.push(true);
        ones_bits.push(true);
        zeros_bits.pad_to_64_bits();
        ones_bits.pad_to_64_bits();

        let zeros = EliasFanoBitArray::new(&zeros_bits, config)?;
        let ones = EliasFanoBitArray::new(&ones_bits, config)?;

        let result = Self {
            first_bit,
            zeros,
            ones,
        };
        debug_assert_eq!(result.len(), n);

        log::debug!("compressed-runs bit array: constructed over {n} bits");
        Ok(result)
    }

    fn num_ones(&self) -> usize {
        self.ones.len() - 1
    }

    fn num_zeros(&self) -> usize {
        self.zeros.len() - 1
    }

    /// Position of the `r`-th (0-indexed) one-bit. Only valid for
    /// `r < num_ones`.
    fn select_raw(&self, r: usize) -> usize {
        let ones_rank = self.ones.rank(r).expect("r within ones-run index range");
        if self.first_bit == Some(true) {
            r + self
                .zeros
                .select(ones_rank - 1)
                .expect("every one-run has a matching zero-run boundary")
        } else {
            r + self
                .zeros
                .select(ones_rank)
                .expect("every one-run has a matching zero-run boundary")
        }
    }

    /// Position of the `r`-th (0-indexed) zero-bit. Only valid for
    /// `r < num_zeros`.
    fn select_zero_raw(&self, r: usize) -> usize {
        let zeros_rank = self.zeros.rank(r).expect("r within zeros-run index range");
        if self.first_bit == Some(true) {
            r + self
                .ones
                .select(zeros_rank)
                .expect("every zero-run has a matching one-run boundary")
        } else {
            r + self
                .ones
                .select(zeros_rank - 1)
                .expect("every zero-run has a matching one-run boundary")
        }
    }

    fn rank_raw(&self, i: usize) -> usize {
        let mut low = 0i64;
        let mut high = self.num_ones() as i64 - 1;
        while low <= high {
            let mid = (low + high) >> 1;
            let mid_val = self.select_raw(mid as usize) as i64 - 1;
            match mid_val.cmp(&(i as i64)) {
                std::cmp::Ordering::Less => low = mid + 1,
                std::cmp::Ordering::Greater => high = mid - 1,
                std::cmp::Ordering::Equal => return mid as usize,
            }
        }
        low as usize
    }

    fn rank_zero_raw(&self, i: usize) -> usize {
        let mut low = 0i64;
        let mut high = self.num_zeros() as i64 - 1;
        while low <= high {
            let mid = (low + high) >> 1;
            let mid_val = self.select_zero_raw(mid as usize) as i64 - 1;
            match mid_val.cmp(&(i as i64)) {
                std::cmp::Ordering::Less => low = mid + 1,
                std::cmp::Ordering::Greater => high = mid - 1,
                std::cmp::Ordering::Equal => return mid as usize,
            }
        }
        low as usize
    }
}

impl BitArray for CompressedRunsBitArray {
    fn len(&self) -> usize {
        match self.first_bit {
            None => 0,
            Some(_) => self.zeros.len() + self.ones.len() - 2,
        }
    }

    fn at(&self, i: usize) -> Result<bool> {
        check_bounds(i, self.len())?;
        let r = self.rank_raw(i).saturating_sub(1);
        Ok(self.select_raw(r) == i)
    }

    fn rank(&self, i: usize) -> Result<usize> {
        check_bounds(i, self.len())?;
        Ok(self.rank_raw(i))
    }

    fn rank_zero(&self, i: usize) -> Result<usize> {
        check_bounds(i, self.len())?;
        Ok(self.rank_zero_raw(i))
    }

    fn select(&self, r: usize) -> Option<usize> {
        if self.first_bit.is_none() || r >= self.num_ones() {
            return None;
        }
        Some(self.select_raw(r))
    }

    fn select_zero(&self, r: usize) -> Option<usize> {
        if self.first_bit.is_none() || r >= self.num_zeros() {
            return None;
        }
        Some(self.select_zero_raw(r))
    }
}
