//! Wavelet-tree-over-runs permutation (Barbay & Navarro), giving both
//! `π(i)` and `π⁻¹(v)` in O(log n) while exploiting whatever ascending runs
//! the permutation already has for entropy compression.
//!
//! Construction splits the input into its maximal ascending runs, shapes
//! them into an optimal (by run length) Huffman binary tree, and records
//! only the merge-bitmaps produced while building that tree bottom-up. The
//! Huffman topology itself is flattened into a [`LoudsBinaryTree`]; the
//! concatenated merge-bitmaps live in a single [`Poppy`]-indexed bit array
//! `M`. Neither the runs nor the tree's intermediate merged sequences
//! survive construction.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::bit_array::{BitArray, IndexedIntSequence, RawBitVec};
use crate::louds::LoudsBinaryTree;
use crate::poppy::Poppy;

#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone, Copy)]
enum NodeMeta {
    Leaf { from: usize },
    Inner { offset_into_m: usize },
}

#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone)]
struct Inner {
    run_starts: Poppy,
    louds: LoudsBinaryTree,
    node_meta: Vec<NodeMeta>,
    leaf_id_for_run: Vec<usize>,
    m: Poppy,
}

/// A permutation of `0..len`, encoded as a wavelet tree over its ascending
/// runs.
#[cfg_attr(feature = "savefile", derive(savefile_derive::Savefile))]
#[derive(Debug, Clone)]
pub struct Permutation {
    len: usize,
    inner: Option<Inner>,
}

/// Transient, arena-indexed Huffman-tree node kept only for the duration of
/// construction. `values` holds the node's sorted sequence of underlying
/// values so that it can be merged again one level up; discarded once the
/// final `M` / LOUDS / metadata arrays are materialized.
struct BuildNode {
    kind: BuildKind,
    values: Vec<usize>,
}

#[derive(Clone, Copy)]
enum BuildKind {
    Leaf { run_index: usize, from: usize },
    Inner { left: usize, right: usize, offset_into_m: usize },
}

/// Min-heap entry ordered by `(length, seq)`, reversed so a max-heap
/// ([`BinaryHeap`]) pops the smallest-length, earliest-inserted node first —
/// the standard Huffman tie-break.
struct HeapEntry {
    length: usize,
    seq: usize,
    arena_idx: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.seq == other.seq
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .length
            .cmp(&self.length)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Splits `values` into maximal ascending runs. Returns the run-boundary
/// bit vector (a one at every run start) and the `(from, until)` range of
/// each run.
fn extract_runs(values: &[usize]) -> (RawBitVec, Vec<(usize, usize)>) {
    let n = values.len();
    let mut run_bits = RawBitVec::with_bit_capacity(n);
    let mut runs = Vec::new();
    let mut start = 0usize;

    for i in 0..n {
        let is_run_start = i == 0 || values[i] < values[i - 1];
        run_bits.push(is_run_start);
        if is_run_start {
            if i > 0 {
                runs.push((start, i));
            }
            start = i;
        }
    }
    if n > 0 {
        runs.push((start, n));
    }
    run_bits.pad_to_64_bits();

    (run_bits, runs)
}

/// Stable two-way merge of two ascending sequences, appending the
/// merge-bitmap (`false` = taken from `left`, `true` = taken from `right`)
/// directly onto the end of the tree-wide bitmap `m_bits`.
fn stable_merge_into(left: &[usize], right: &[usize], m_bits: &mut RawBitVec) -> Vec<usize> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0usize, 0usize);

    while i < left.len() && j < right.len() {
        if left[i] <= right[j] {
            merged.push(left[i]);
            m_bits.push(false);
            i += 1;
        } else {
            merged.push(right[j]);
            m_bits.push(true);
            j += 1;
        }
    }
    for &v in &left[i..] {
        merged.push(v);
        m_bits.push(false);
    }
    for &v in &right[j..] {
        merged.push(v);
        m_bits.push(true);
    }

    merged
}

impl Permutation {
    /// Builds a wavelet-tree-over-runs encoding of `values`, a permutation
    /// of `0..values.len()`.
    pub fn new(values: &[usize]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self { len: 0, inner: None };
        }

        let (run_bits, runs) = extract_runs(values);
        let run_starts = Poppy::new(run_bits);
        let num_runs = runs.len();

        let mut arena: Vec<BuildNode> = Vec::with_capacity(2 * num_runs - 1);
        let mut heap = BinaryHeap::with_capacity(num_runs);
        let mut seq = 0usize;

        for (run_index, &(from, until)) in runs.iter().enumerate() {
            let values = values[from..until].to_vec();
            let length = values.len();
            arena.push(BuildNode {
                kind: BuildKind::Leaf { run_index, from },
                values,
            });
            heap.push(HeapEntry {
                length,
                seq,
                arena_idx: arena.len() - 1,
            });
            seq += 1;
        }

        let mut m_bits = RawBitVec::new();

        while heap.len() > 1 {
            let a = heap.pop().expect("heap has at least two entries");
            let b = heap.pop().expect("heap has at least two entries");

            let offset_into_m = m_bits.len();
            let merged = stable_merge_into(&arena[a.arena_idx].values, &arena[b.arena_idx].values, &mut m_bits);
            let length = merged.len();

            arena.push(BuildNode {
                kind: BuildKind::Inner {
                    left: a.arena_idx,
                    right: b.arena_idx,
                    offset_into_m,
                },
                values: merged,
            });
            heap.push(HeapEntry {
                length,
                seq,
                arena_idx: arena.len() - 1,
            });
            seq += 1;
        }

        let root_idx = heap.pop().expect("huffman tree has a root").arena_idx;
        m_bits.pad_to_64_bits();
        let m = Poppy::new(m_bits);

        log::debug!(
            "permutation: {n} values, {num_runs} ascending runs, huffman tree merge-bitmap is {} bits",
            m.len()
        );

        let (louds, bfs_order) = LoudsBinaryTree::from_tree_with_order(
            root_idx,
            |&idx| match arena[idx].kind {
                BuildKind::Inner { left, .. } => Some(left),
                BuildKind::Leaf { .. } => None,
            },
            |&idx| match arena[idx].kind {
                BuildKind::Inner { right, .. } => Some(right),
                BuildKind::Leaf { .. } => None,
            },
        );

        let mut node_meta = Vec::with_capacity(bfs_order.len());
        let mut leaf_id_for_run = vec![0usize; num_runs];
        for (dense_id, &arena_idx) in bfs_order.iter().enumerate() {
            match arena[arena_idx].kind {
                BuildKind::Leaf { run_index, from } => {
                    node_meta.push(NodeMeta::Leaf { from });
                    leaf_id_for_run[run_index] = dense_id;
                }
                BuildKind::Inner { offset_into_m, .. } => {
                    node_meta.push(NodeMeta::Inner { offset_into_m });
                }
            }
        }

        Self {
            len: n,
            inner: Some(Inner {
                run_starts,
                louds,
                node_meta,
                leaf_id_for_run,
                m,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The index of value `v` in the permutation, i.e. the `i` with
    /// `self.at(i) == v`.
    pub fn inverse(&self, v: usize) -> usize {
        assert!(v < self.len, "value {v} out of bounds for permutation of length {}", self.len);
        let inner = self.inner.as_ref().expect("non-empty permutation has an inner structure");

        let mut node = inner.louds.root();
        let mut v = v;

        loop {
            match inner.node_meta[node] {
                NodeMeta::Leaf { from } => return from + v,
                NodeMeta::Inner { offset_into_m } => {
                    let o = offset_into_m;
                    let bit = inner.m.at(o + v).expect("m offset within bounds");
                    if !bit {
                        let before = if o == 0 { 0 } else { inner.m.rank_zero(o - 1).expect("o-1 within bounds") };
                        v = inner.m.rank_zero(o + v).expect("o+v within bounds") - before - 1;
                        node = inner.louds.left_child(node).expect("inner node has a left child");
                    } else {
                        let before = if o == 0 { 0 } else { inner.m.rank(o - 1).expect("o-1 within bounds") };
                        v = inner.m.rank(o + v).expect("o+v within bounds") - before - 1;
                        node = inner.louds.right_child(node).expect("inner node has a right child");
                    }
                }
            }
        }
    }
}

impl IndexedIntSequence for Permutation {
    fn len(&self) -> usize {
        self.len
    }

    /// The `i`-th value of the permutation. Walks from the run containing
    /// `i` up to the root, iteratively (no recursion, bounded stack usage)
    /// as prescribed by the resource model.
    fn at(&self, i: usize) -> usize {
        assert!(i < self.len, "index {i} out of bounds for permutation of length {}", self.len);
        let inner = self.inner.as_ref().expect("non-empty permutation has an inner structure");

        let run_index = inner.run_starts.rank(i).expect("i within bounds") - 1;
        let from = inner
            .run_starts
            .select(run_index)
            .expect("every run has a start position");

        let mut node = inner.leaf_id_for_run[run_index];
        let mut k = i - from;

        while node != inner.louds.root() {
            let parent = inner.louds.parent(node).expect("non-root node has a parent");
            let offset_into_m = match inner.node_meta[parent] {
                NodeMeta::Inner { offset_into_m } => offset_into_m,
                NodeMeta::Leaf { .. } => unreachable!("a parent is always an inner node"),
            };
            let o = offset_into_m;

            let is_left_child = inner.louds.left_child(parent) == Some(node);
            if is_left_child {
                let before = if o == 0 { 0 } else { inner.m.rank_zero(o - 1).expect("o-1 within bounds") };
                k = inner.m.select_zero(k + before).expect("select_zero has a match") - o;
            } else {
                let before = if o == 0 { 0 } else { inner.m.rank(o - 1).expect("o-1 within bounds") };
                k = inner.m.select(k + before).expect("select has a match") - o;
            }
            node = parent;
        }

        k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_permutation(a: &[usize]) {
        let p = Permutation::new(a);
        assert_eq!(IndexedIntSequence::len(&p), a.len());
        for (i, &v) in a.iter().enumerate() {
            assert_eq!(p.at(i), v, "at({i})");
            assert_eq!(p.inverse(v), i, "inverse({v})");
        }
    }

    // Scenario 4 from the testable-properties catalog.
    #[test]
    fn scenario_permutation_round_trip() {
        let a = [2, 8, 1, 4, 5, 6, 9, 10, 12, 14, 13, 15, 11, 0, 3, 7];
        check_permutation(&a);
    }

    #[test]
    fn identity_permutation_is_a_single_run() {
        check_permutation(&(0..20).collect::<Vec<_>>());
    }

    #[test]
    fn reversed_permutation_is_all_singleton_runs() {
        check_permutation(&(0..16).rev().collect::<Vec<_>>());
    }

    #[test]
    fn single_element() {
        check_permutation(&[0]);
    }

    #[test]
    fn empty_permutation() {
        let p = Permutation::new(&[]);
        assert_eq!(IndexedIntSequence::len(&p), 0);
    }

    #[test]
    fn two_element_permutations() {
        check_permutation(&[0, 1]);
        check_permutation(&[1, 0]);
    }

    #[test]
    fn random_permutations_round_trip() {
        use rand::prelude::*;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(23);

        for _ in 0..40 {
            let n = rng.random_range(1..200);
            let mut a: Vec<usize> = (0..n).collect();
            a.shuffle(&mut rng);
            check_permutation(&a);
        }
    }

    #[test]
    fn random_permutations_with_few_long_runs_round_trip() {
        use rand::prelude::*;
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(29);

        for _ in 0..20 {
            let n = rng.random_range(1..200);
            let mut remaining: Vec<usize> = (0..n).collect();
            let mut a = Vec::with_capacity(n);
            while !remaining.is_empty() {
                let run_len = rng.random_range(1..=remaining.len());
                let take = remaining.len() - run_len;
                let mut run: Vec<usize> = remaining.split_off(take);
                run.sort_unstable();
                a.append(&mut run);
            }
            check_permutation(&a);
        }
    }
}
