//! Property-based tests comparing every `BitArray` flavor against a naive
//! linear-scan reference over randomized bit vectors (testable-properties
//! catalog, property-based-tests paragraph): random inputs, every position
//! checked against the naive reference.

use proptest::prelude::*;

use succinctly::bit_array::{BitArray, RawBitVec};
use succinctly::config::EliasFanoConfig;
use succinctly::{CompressedRunsBitArray, EliasFanoBitArray, Poppy, RunLengthEncodedBitArray};

fn check_all_flavors_against_naive(bits: &[bool]) {
    let raw = RawBitVec::from_bits(bits.iter().copied());

    let poppy = Poppy::new(raw.clone());
    let ef = EliasFanoBitArray::new(&raw, EliasFanoConfig::new()).unwrap();
    let runs = CompressedRunsBitArray::new(&raw, EliasFanoConfig::new()).unwrap();
    let rle = RunLengthEncodedBitArray::new(&raw);

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

        assert_eq!(poppy.rank(i).unwrap(), running_rank, "poppy rank({i})");
        assert_eq!(ef.rank(i).unwrap(), running_rank, "ef rank({i})");
        assert_eq!(runs.rank(i).unwrap(), running_rank, "runs rank({i})");
        assert_eq!(rle.rank(i).unwrap(), running_rank, "rle rank({i})");

        assert_eq!(poppy.at(i).unwrap(), b, "poppy at({i})");
        assert_eq!(ef.at(i).unwrap(), b, "ef at({i})");
        assert_eq!(runs.at(i).unwrap(), b, "runs at({i})");
        assert_eq!(rle.at(i).unwrap(), b, "rle at({i})");
    }

    for (r, &pos) in ones.iter().enumerate() {
        assert_eq!(poppy.select(r), Some(pos), "poppy select({r})");
        assert_eq!(ef.select(r), Some(pos), "ef select({r})");
        assert_eq!(runs.select(r), Some(pos), "runs select({r})");
        assert_eq!(rle.select(r), Some(pos), "rle select({r})");
    }
    assert_eq!(poppy.select(ones.len()), None);

    for (r, &pos) in zeros.iter().enumerate() {
        assert_eq!(poppy.select_zero(r), Some(pos), "poppy select_zero({r})");
        assert_eq!(ef.select_zero(r), Some(pos), "ef select_zero({r})");
        assert_eq!(runs.select_zero(r), Some(pos), "runs select_zero({r})");
        assert_eq!(rle.select_zero(r), Some(pos), "rle select_zero({r})");
    }
    assert_eq!(poppy.select_zero(zeros.len()), None);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn bit_array_flavors_agree_with_naive_reference(bits in prop::collection::vec(any::<bool>(), 0..10_000)) {
        check_all_flavors_against_naive(&bits);
    }

    #[test]
    fn bit_array_flavors_agree_on_sparse_inputs(bits in prop::collection::vec(prop::bool::weighted(0.02), 0..10_000)) {
        check_all_flavors_against_naive(&bits);
    }
}
