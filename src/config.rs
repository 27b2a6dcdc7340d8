//! Construction-time configuration.
//!
//! Mirrors this crate's builder-style configuration (the FM-Index lineage's
//! `FmIndexConfig`) rather than threading a bare `Option<usize>` through
//! every constructor.

/// Configuration accepted by [`EliasFano`](crate::elias_fano::EliasFano) and
/// the bit-vector wrappers that delegate to it
/// ([`EliasFanoBitArray`](crate::elias_fano_bit_array::EliasFanoBitArray),
/// [`CompressedRunsBitArray`](crate::compressed_runs_bit_array::CompressedRunsBitArray)).
///
/// `num_lower_bits`, when set, overrides the derived `ℓ = floor(max_value / num_values)`.
/// This exists for benchmarking space/time trade-offs; it never changes the
/// sequence of values observable through indexed access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
pub struct EliasFanoConfig {
    pub num_lower_bits: Option<usize>,
}

impl EliasFanoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the number of low bits per value stored in the lower bit
    /// vector, instead of the derived `floor(max_value / num_values)`.
    pub fn with_num_lower_bits(mut self, num_lower_bits: usize) -> Self {
        self.num_lower_bits = Some(num_lower_bits);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_override() {
        assert_eq!(EliasFanoConfig::new().num_lower_bits, None);
    }

    #[test]
    fn builder_sets_override() {
        let config = EliasFanoConfig::new().with_num_lower_bits(3);
        assert_eq!(config.num_lower_bits, Some(3));
    }
}
