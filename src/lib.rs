/*! This library contains succinct and compressed data structures for very
 * large static sequences of bits, integers, and strings: each structure
 * occupies space close to the information-theoretic minimum of the data it
 * represents while supporting constant- or logarithmic-time positional
 * queries without decompression.
 *
 * Five layers build on each other, leaves first:
 *
 * 1. [`poppy::Poppy`] — a rank/select index over an arbitrary-length
 *    uncompressed bit array in near-constant time using roughly 4%
 *    auxiliary space.
 * 2. [`elias_fano::EliasFano`] — a monotone non-decreasing integer sequence
 *    with O(1) indexed access.
 * 3. [`louds::LoudsBinaryTree`] — a LOUDS-encoded ordinal binary tree with
 *    O(1) parent/child navigation in 2·n + o(n) bits.
 * 4. [`permutation::Permutation`] — a wavelet-tree-over-runs permutation
 *    (Barbay & Navarro) giving both `π(i)` and `π⁻¹(v)` in O(log n) while
 *    exploiting the permutation's natural runs for entropy compression.
 * 5. [`string_index::StringIndex`] — a compressed suffix-array-style string
 *    dictionary built atop the above, indexing a static ordered list of
 *    strings and returning the k-th string in time proportional to its
 *    length.
 *
 * [`elias_fano_bit_array::EliasFanoBitArray`],
 * [`compressed_runs_bit_array::CompressedRunsBitArray`] and
 * [`run_length_bit_array::RunLengthEncodedBitArray`] are three further bit
 * vector flavors built on top of Elias-Fano, for workloads where the bit
 * vector is sparse or run-structured rather than dense.
 *
 * ## Usage
 *
 * ```
 * use succinctly::bit_array::{BitArray, RawBitVec};
 * use succinctly::poppy::Poppy;
 *
 * let bits = RawBitVec::from_str01("0000 1111 1111 0010 1111");
 * let poppy = Poppy::new(bits);
 *
 * assert_eq!(poppy.rank(11).unwrap(), 8);
 * assert_eq!(poppy.select(7), Some(11));
 * ```
 *
 * ```
 * use succinctly::string_index::StringIndex;
 *
 * let index = StringIndex::new(&["alpha", "beta", "alpha", "gamma"]).unwrap();
 * assert_eq!(index.len(), 4);
 * assert_eq!(index.at(1).unwrap(), "beta");
 * ```
 *
 * ## Safety
 *
 * This library is entirely safe Rust; it relies on the bounds-checked
 * `Result`/`Option`-returning query methods described in each module rather
 * than `unsafe` hot paths.
 */

pub mod bit_array;
mod bits;

pub mod compressed_runs_bit_array;
pub mod config;
pub mod elias_fano;
pub mod elias_fano_bit_array;
pub mod error;
pub mod louds;
pub mod permutation;
pub mod poppy;
pub mod run_length_bit_array;
pub mod string_index;

#[doc(inline)]
pub use bit_array::{BitArray, IndexedIntSequence, RawBitVec};
#[doc(inline)]
pub use compressed_runs_bit_array::CompressedRunsBitArray;
#[doc(inline)]
pub use config::EliasFanoConfig;
#[doc(inline)]
pub use elias_fano::EliasFano;
#[doc(inline)]
pub use elias_fano_bit_array::EliasFanoBitArray;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use louds::LoudsBinaryTree;
#[doc(inline)]
pub use permutation::Permutation;
#[doc(inline)]
pub use poppy::Poppy;
#[doc(inline)]
pub use run_length_bit_array::RunLengthEncodedBitArray;
#[doc(inline)]
pub use string_index::StringIndex;
