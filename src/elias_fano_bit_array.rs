//! A sparse bit vector that stores only the positions of its one-bits, in an
//! [`EliasFano`] sequence.

use std::cmp::Ordering;

use crate::bit_array::{check_bounds, BitArray, RawBitVec};
use crate::config::EliasFanoConfig;
use crate::elias_fano::EliasFano;
use crate::error::Result;

#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone)]
pub struct EliasFanoBitArray {
    len: usize,
    one_bit_positions: Option<EliasFano>,
}

impl EliasFanoBitArray {
    pub fn new(bits: &RawBitVec, config: EliasFanoConfig) -> Result<Self> {
        let len = bits.len();
        let ones = (0..len).filter(|&i| bits.get(i));
        let num_one_bits = ones.clone().count();

        let one_bit_positions = if num_one_bits > 0 {
            let max_one_bit = (0..len).filter(|&i| bits.get(i)).last().expect("num_one_bits > 0");
            Some(EliasFano::new(ones, num_one_bits, max_one_bit, config)?)
        } else {
            None
        };

        Ok(Self {
            len,
            one_bit_positions,
        })
    }

    /// Locates bit position `i` within the sorted one-bit positions, Rust
    /// `binary_search`-style: `Ok(idx)` for an exact match, `Err(idx)` for
    /// the position at which `i` would be inserted to keep the order.
    fn locate(&self, i: usize) -> std::result::Result<usize, usize> {
        let Some(ef) = &self.one_bit_positions else {
            return Err(0);
        };

        let mut low = 0usize;
        let mut high = ef.len();
        while low < high {
            let mid = low + (high - low) / 2;
            match ef.at(mid).cmp(&i) {
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid,
                Ordering::Equal => return Ok(mid),
            }
        }
        Err(low)
    }
}

impl BitArray for EliasFanoBitArray {
    fn len(&self) -> usize {
        self.len
    }

    fn at(&self, i: usize) -> Result<bool> {
        check_bounds(i, self.len)?;
        Ok(self.locate(i).is_ok())
    }

    fn rank(&self, i: usize) -> Result<usize> {
        check_bounds(i, self.len)?;
        Ok(match self.locate(i) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        })
    }

    fn select(&self, r: usize) -> Option<usize> {
        let ef = self.one_bit_positions.as_ref()?;
        (r < ef.len()).then(|| ef.at(r))
    }

    fn select_zero(&self, rank_zero: usize) -> Option<usize> {
        if self.len == 0 {
            return None;
        }

        let mut low = 0i64;
        let mut high = self.len as i64 - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let mid_u = mid as usize;
            let rz = self.rank_zero(mid_u).expect("mid is within bounds");
            let is_zero = !self.at(mid_u).expect("mid is within bounds");

            if is_zero && rz == rank_zero + 1 {
                return Some(mid_u);
            } else if rz <= rank_zero {
                low = mid + 1;
            } else {
                high = mid - 1;
            }
        }
        None
    }
}
