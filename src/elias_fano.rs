//! Elias-Fano encoding of a monotone non-decreasing sequence of bounded
//! non-negative integers, giving O(1) indexed access in space close to the
//! information-theoretic minimum.

use crate::bit_array::{BitArray, IndexedIntSequence, RawBitVec};
use crate::config::EliasFanoConfig;
use crate::error::{Error, Result};
use crate::poppy::Poppy;

#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone)]
pub struct EliasFano {
    num_lower_bits: usize,
    lower_bits: RawBitVec,
    num_values: usize,
    upper: Poppy,
}

impl EliasFano {
    /// Builds an Elias-Fano sequence from `num_values` non-decreasing
    /// values, each in `0..=max_value`. Returns `Err(InvalidInput)` if a
    /// value is out of order, exceeds `max_value`, or the iterator yields
    /// more than `num_values` items.
    pub fn new(
        values: impl IntoIterator<Item = usize>,
        num_values: usize,
        max_value: usize,
        config: EliasFanoConfig,
    ) -> Result<Self> {
        let num_lower_bits = config
            .num_lower_bits
            .unwrap_or_else(|| if num_values == 0 { 0 } else { max_value / num_values });

        let mut lower_bits = RawBitVec::new();
        let mut upper_bits = RawBitVec::new();

        let mut previous_value = 0usize;
        let mut previous_high = 0usize;
        let mut count = 0usize;

        for value in values {
            if count >= num_values {
                return Err(Error::InvalidInput {
                    reason: "more values were supplied than num_values",
                });
            }
            if value > max_value {
                return Err(Error::InvalidInput {
                    reason: "value exceeds max_value",
                });
            }
            if count > 0 && value < previous_value {
                return Err(Error::InvalidInput {
                    reason: "values must be non-decreasing",
                });
            }

            if num_lower_bits > 0 {
                lower_bits.push_bits(value as u64, num_lower_bits);
            }

            let high = value >> num_lower_bits;
            for _ in 0..(high - previous_high) {
                upper_bits.push(false);
            }
            upper_bits.push(true);

            previous_high = high;
            previous_value = value;
            count += 1;
        }

        if count != num_values {
            return Err(Error::InvalidInput {
                reason: "fewer values were supplied than num_values",
            });
        }

        upper_bits.push(false);
        lower_bits.pad_to_64_bits();
        upper_bits.pad_to_64_bits();

        log::debug!(
            "elias-fano: constructed over {num_values} values (max {max_value}, {num_lower_bits} lower bits/value)"
        );

        Ok(Self {
            num_lower_bits,
            lower_bits,
            num_values,
            upper: Poppy::new(upper_bits),
        })
    }

    pub fn len(&self) -> usize {
        self.num_values
    }

    pub fn is_empty(&self) -> bool {
        self.num_values == 0
    }

    /// The `i`-th value of the encoded sequence.
    pub fn at(&self, i: usize) -> usize {
        assert!(i < self.num_values, "index {i} out of bounds for len {}", self.num_values);

        let lower = if self.num_lower_bits > 0 {
            self.lower_bits
                .get_bits(i * self.num_lower_bits, self.num_lower_bits) as usize
        } else {
            0
        };

        let select_pos = self
            .upper
            .select(i)
            .expect("upper bit vector has one entry per value");
        let high = select_pos - i;

        (high << self.num_lower_bits) | lower
    }
}

impl IndexedIntSequence for EliasFano {
    fn len(&self) -> usize {
        self.num_values
    }

    fn at(&self, i: usize) -> usize {
        EliasFano::at(self, i)
    }
}
